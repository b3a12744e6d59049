//! Fire-and-forget observer hooks, delivered synchronously from the loop
//! task. A configuration-time list of listeners lets multiple hosts observe
//! the same loop without subclassing anything.

use playback_types::{PlaybackEndResult, PlayerState, Track};

/// Events the loop emits. Delivery order matches the command table in
/// `supervisor.rs`: `OnSessionEnded` always fires before the loop decides
/// whether to restart.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    OnStateChanged(PlayerState),
    OnTrackChanged(Option<Track>),
    OnSessionEnded(Track, PlaybackEndResult),
}

/// A listener registered with the loop. All methods have a default no-op
/// body so a listener only needs to implement the callbacks it cares about.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &PlaybackEvent) {
        let _ = event;
    }
}
