use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use playback_types::{FetcherConfig, InputKind, ResolverError, Track, TrackRequest};

use crate::cache::RequestCache;
use crate::process_util::exit_code;

use super::TrackResolver;

lazy_static! {
    /// Accepted when `input_hint` already asserts this resolver's site and
    /// `id_pattern` didn't match — a raw request that is just the bare ID.
    static ref BARE_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();
}

enum RequestKind {
    Video(String),
    Playlist(String),
}

#[derive(Debug, Deserialize)]
struct FetchDump {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    entries: Option<Vec<FetchDump>>,
}

/// Site-agnostic remote resolver: parameterized over a `site` name and an
/// `id_pattern`, so it never hardcodes a real provider.
pub struct RemoteResolver {
    site: &'static str,
    id_pattern: Regex,
    fetcher: FetcherConfig,
    cache: Arc<dyn RequestCache>,
    cache_ttl: Duration,
    fetch_limiter: Arc<Semaphore>,
}

impl RemoteResolver {
    #[must_use]
    pub fn new(
        site: &'static str,
        id_pattern: Regex,
        fetcher: FetcherConfig,
        cache: Arc<dyn RequestCache>,
        cache_ttl: Duration,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            site,
            id_pattern,
            fetcher,
            cache,
            cache_ttl,
            fetch_limiter: Arc::new(Semaphore::new(max_concurrent_fetches.max(1))),
        }
    }

    fn parse(&self, request: &TrackRequest) -> Option<RequestKind> {
        if let Some(captures) = self.id_pattern.captures(&request.raw) {
            if let Some(id) = captures.name("playlist") {
                return Some(RequestKind::Playlist(id.as_str().to_string()));
            }
            if let Some(id) = captures.name("video") {
                return Some(RequestKind::Video(id.as_str().to_string()));
            }
        }
        if request.input_hint == Some(InputKind::Remote) && BARE_ID.is_match(&request.raw) {
            return Some(RequestKind::Video(request.raw.clone()));
        }
        None
    }

    fn cache_key(&self, kind: &RequestKind) -> String {
        match kind {
            RequestKind::Video(id) => format!("{}:video:{id}", self.site),
            RequestKind::Playlist(id) => format!("{}:playlist:{id}:raw", self.site),
        }
    }

    async fn fetch_dump(&self, raw: &str, cancel: &CancellationToken) -> Option<FetchDump> {
        let _permit = tokio::select! {
            () = cancel.cancelled() => return None,
            permit = self.fetch_limiter.acquire() => permit.ok()?,
        };

        let output = tokio::select! {
            () = cancel.cancelled() => return None,
            result = Command::new(&self.fetcher.path)
                .args(["-J", "--no-warnings", raw])
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output() => result,
        };

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                warn!("failed to spawn fetcher for {raw}: {err}");
                return None;
            }
        };

        let code = exit_code(output.status);
        if code != 0 {
            warn!("fetcher exited {code} for {raw}");
            return None;
        }

        match serde_json::from_slice(&output.stdout) {
            Ok(dump) => Some(dump),
            Err(err) => {
                warn!("failed to parse fetcher metadata for {raw}: {err}");
                None
            }
        }
    }

    fn dump_to_track(dump: &FetchDump, fallback_uri: &str) -> Track {
        let uri = dump.webpage_url.clone().unwrap_or_else(|| fallback_uri.to_string());
        let title = dump.title.clone().unwrap_or_else(|| uri.clone());
        let mut track = Track::new(uri, title, InputKind::Remote);
        if let Some(seconds) = dump.duration {
            track = track.with_duration_hint(Duration::from_secs_f64(seconds));
        }
        track
    }
}

#[async_trait]
impl TrackResolver for RemoteResolver {
    fn name(&self) -> &str {
        self.site
    }

    fn can_resolve(&self, request: &TrackRequest) -> bool {
        self.parse(request).is_some()
    }

    async fn resolve(&self, request: &TrackRequest, cancel: &CancellationToken) -> Result<Vec<Track>, ResolverError> {
        let Some(kind) = self.parse(request) else {
            return Ok(Vec::new());
        };
        let key = self.cache_key(&kind);

        if let Some(cached) = self.cache.try_get(&key, cancel).await {
            return Ok(cached);
        }

        let Some(dump) = self.fetch_dump(&request.raw, cancel).await else {
            return Ok(Vec::new());
        };

        let tracks = match &kind {
            RequestKind::Video(_) => vec![Self::dump_to_track(&dump, &request.raw)],
            RequestKind::Playlist(_) => dump
                .entries
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|entry| Self::dump_to_track(entry, &request.raw))
                .collect(),
        };

        self.cache.set(&key, tracks.clone(), self.cache_ttl, cancel).await;
        Ok(tracks)
    }
}
