use serde::{Deserialize, Serialize};

/// The playback loop's state machine. `Playing`/`Paused` only ever hold while
/// a session is active; the loop falls back to `Idle` the moment its active
/// session slot empties with nothing queued behind it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Playing,
    Paused,
    Stopped,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// How the loop re-enqueues a track whose session just ended.
///
/// `One` re-enqueues the just-ended track at the front of the queue; `All`
/// re-enqueues it at the back. Both only apply to `Completed` endings — a
/// skipped or stopped track is never brought back by repeat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    #[default]
    None,
    One,
    All,
}
