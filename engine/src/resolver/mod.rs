//! Turns a user request into zero-or-more tracks.

mod remote;

pub use remote::RemoteResolver;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use playback_types::{ResolverError, Track, TrackRequest};

#[async_trait]
pub trait TrackResolver: Send + Sync {
    fn name(&self) -> &str;
    fn can_resolve(&self, request: &TrackRequest) -> bool;
    async fn resolve(&self, request: &TrackRequest, cancel: &CancellationToken) -> Result<Vec<Track>, ResolverError>;
}

/// Composes an ordered list of concrete resolvers and delegates to the
/// first whose `can_resolve` returns true.
pub struct RoutingResolver {
    resolvers: Vec<Box<dyn TrackResolver>>,
}

impl RoutingResolver {
    #[must_use]
    pub fn new(resolvers: Vec<Box<dyn TrackResolver>>) -> Self {
        Self { resolvers }
    }
}

#[async_trait]
impl TrackResolver for RoutingResolver {
    fn name(&self) -> &str {
        "routing"
    }

    fn can_resolve(&self, request: &TrackRequest) -> bool {
        self.resolvers.iter().any(|r| r.can_resolve(request))
    }

    async fn resolve(&self, request: &TrackRequest, cancel: &CancellationToken) -> Result<Vec<Track>, ResolverError> {
        match self.resolvers.iter().find(|r| r.can_resolve(request)) {
            Some(resolver) => resolver.resolve(request, cancel).await,
            None => {
                warn!("no resolver claims request {:?}", request.raw);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Claims(&'static str);

    #[async_trait]
    impl TrackResolver for Claims {
        fn name(&self) -> &str {
            self.0
        }

        fn can_resolve(&self, request: &TrackRequest) -> bool {
            request.raw.starts_with(self.0)
        }

        async fn resolve(&self, _request: &TrackRequest, _cancel: &CancellationToken) -> Result<Vec<Track>, ResolverError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn delegates_to_first_matching_resolver() {
        let routing = RoutingResolver::new(vec![Box::new(Claims("a:")), Box::new(Claims("b:"))]);
        assert!(routing.can_resolve(&TrackRequest::new("b:123")));
        assert!(!routing.can_resolve(&TrackRequest::new("c:123")));
    }

    #[tokio::test]
    async fn unclaimed_request_resolves_to_empty_list() {
        let routing = RoutingResolver::new(vec![Box::new(Claims("a:"))]);
        let cancel = CancellationToken::new();
        let result = routing.resolve(&TrackRequest::new("z:1"), &cancel).await.unwrap();
        assert!(result.is_empty());
    }
}
