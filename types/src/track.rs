use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a [`Track`]'s bytes are ultimately produced.
///
/// `LocalFile` tracks are opened straight off disk by a decoder child
/// process; `Remote` tracks go through the fetcher|decoder pipeline of
/// `playback_engine::source::remote`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    LocalFile,
    Remote,
}

/// An immutable, resolved track ready to be queued and played.
///
/// Identity for dedup purposes (`TrackQueue::remove_where_id`) is `uri`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    pub title: String,
    pub input_kind: InputKind,
    pub duration_hint: Option<Duration>,
}

impl Track {
    #[must_use]
    pub fn new(uri: impl Into<String>, title: impl Into<String>, input_kind: InputKind) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            input_kind,
            duration_hint: None,
        }
    }

    #[must_use]
    pub fn with_duration_hint(mut self, duration: Duration) -> Self {
        self.duration_hint = Some(duration);
        self
    }
}

/// An opaque user request plus an optional advisory routing hint.
///
/// `input_hint` only ever narrows `TrackResolver::can_resolve` decisions; a
/// resolver must still be able to reject a request whose hint doesn't match
/// what it actually parses out of `raw`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackRequest {
    pub raw: String,
    pub input_hint: Option<InputKind>,
}

impl TrackRequest {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            input_hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: InputKind) -> Self {
        self.input_hint = Some(hint);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn track_identity_is_uri() {
        let a = Track::new("file:///a.mp3", "A", InputKind::LocalFile);
        let b = Track::new("file:///a.mp3", "A renamed", InputKind::LocalFile);
        assert_eq!(a.uri, b.uri);
    }
}
