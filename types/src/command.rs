use serde::{Deserialize, Serialize};

use crate::track::Track;

/// Why a session's `PlaybackEndResult` carries the reason it does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEndReason {
    Completed,
    Cancelled,
    Failed,
}

/// The outcome of one track's run through the source -> sink pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEndResult {
    pub reason: PlaybackEndReason,
    pub details: Option<String>,
}

impl PlaybackEndResult {
    #[must_use]
    pub fn completed() -> Self {
        Self {
            reason: PlaybackEndReason::Completed,
            details: None,
        }
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            reason: PlaybackEndReason::Cancelled,
            details: None,
        }
    }

    #[must_use]
    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            reason: PlaybackEndReason::Failed,
            details: Some(details.into()),
        }
    }
}

/// Commands accepted by the playback loop's single-consumer channel.
///
/// The first six variants originate from the public `PlayerHandle` API; the
/// last, `SessionEnded`, is produced internally by the session supervisor
/// spawned from `try_start_next` and must never be sent by a caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlayerCommand {
    Enqueue(Vec<Track>),
    PlayNow(Track),
    Skip,
    Pause,
    Resume,
    Clear,
    Stop,
    SessionEnded(Track, PlaybackEndResult),
}
