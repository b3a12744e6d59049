//! Key→track-list cache. Only `MemoryCache` is constructible from this
//! crate; remote/SQLite backends are out of scope beyond the trait contract
//! they'd need to implement (`playback_types::CacheConfig`).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use playback_types::Track;

/// Advisory cache contract. Every implementation is expected to swallow its
/// own backend errors and log them — callers only ever see `None`/`Ok(())`.
#[async_trait]
pub trait RequestCache: Send + Sync {
    async fn try_get(&self, key: &str, cancel: &CancellationToken) -> Option<Vec<Track>>;
    async fn set(&self, key: &str, tracks: Vec<Track>, ttl: Duration, cancel: &CancellationToken);
}

struct Entry {
    tracks: Vec<Track>,
    expires_at: Instant,
}

/// In-process cache with lazy expiry: there's no background sweep, so an
/// expired entry only goes away once a lookup actually finds it stale and
/// evicts it on the spot.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestCache for MemoryCache {
    async fn try_get(&self, key: &str, cancel: &CancellationToken) -> Option<Vec<Track>> {
        if cancel.is_cancelled() {
            return None;
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.tracks.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, tracks: Vec<Track>, ttl: Duration, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                tracks,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use playback_types::InputKind;
    use pretty_assertions::assert_eq;

    use super::*;

    fn track(uri: &str) -> Track {
        Track::new(uri, uri, InputKind::Remote)
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = MemoryCache::new();
        let cancel = CancellationToken::new();
        assert!(cache.try_get("missing", &cancel).await.is_none());
    }

    #[tokio::test]
    async fn hit_returns_stored_tracks() {
        let cache = MemoryCache::new();
        let cancel = CancellationToken::new();
        cache
            .set("site:video:1", vec![track("a")], Duration::from_secs(60), &cancel)
            .await;
        let hit = cache.try_get("site:video:1", &cancel).await.unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].uri, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        let cancel = CancellationToken::new();
        cache
            .set("key", vec![track("a")], Duration::from_secs(1), &cancel)
            .await;
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.try_get("key", &cancel).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lookup_evicts_the_entry() {
        let cache = MemoryCache::new();
        let cancel = CancellationToken::new();
        cache
            .set("key", vec![track("a")], Duration::from_secs(1), &cancel)
            .await;
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.try_get("key", &cancel).await.is_none());
        assert!(cache.entries.read().await.is_empty(), "expired entry must be removed, not just reported as a miss");
    }

    #[tokio::test]
    async fn cancelled_lookup_is_a_miss() {
        let cache = MemoryCache::new();
        let cancel = CancellationToken::new();
        cache
            .set("key", vec![track("a")], Duration::from_secs(60), &cancel)
            .await;
        cancel.cancel();
        assert!(cache.try_get("key", &cancel).await.is_none());
    }
}
