//! Public player API. Hosting layers — a REPL, a chat bot —
//! talk to [`PlayerHandle`] only; every method returns as soon as the
//! command is enqueued, its effect observable only via state or events.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use playback_types::{PlayerCommand, PlayerState, RepeatMode, Track};

use crate::queue::TrackQueue;
use crate::supervisor::SharedState;

/// Read-only snapshot of the active session, if any. `state` is derived from
/// the live player state at read time, not cached — a session slot being
/// occupied doesn't by itself distinguish `Playing` from `Paused`.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentSessionInfo {
    pub track: Track,
    pub state: PlayerState,
    pub started_at: Instant,
}

/// Loop-internal record of which track is occupying the session slot and
/// when it started; `PlayerState` is tracked separately and combined with
/// this at read time to build a [`CurrentSessionInfo`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ActiveTrackInfo {
    pub(crate) track: Track,
    pub(crate) started_at: Instant,
}

/// Cheaply cloneable front end around the loop's command channel plus
/// read-only shared state. Never constructed directly — obtained from
/// [`crate::supervisor::PlaybackLoop::spawn`].
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::Sender<PlayerCommand>,
    queue: Arc<TrackQueue>,
    shared: Arc<SharedState>,
    loop_cancel: CancellationToken,
    loop_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PlayerHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<PlayerCommand>,
        queue: Arc<TrackQueue>,
        shared: Arc<SharedState>,
        loop_cancel: CancellationToken,
    ) -> Self {
        Self {
            tx,
            queue,
            shared,
            loop_cancel,
            loop_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Attaches the supervisor's `JoinHandle` so [`Self::dispose`] has
    /// something to await. Called once by `PlaybackLoop::spawn`.
    pub(crate) fn attach_task(&self, task: JoinHandle<()>) {
        // `try_lock` is safe here: this runs once, synchronously, right
        // after construction, before the handle is shared with anyone.
        if let Ok(mut slot) = self.loop_task.try_lock() {
            *slot = Some(task);
        }
    }

    async fn send(&self, command: PlayerCommand) {
        // The channel only closes once the loop has shut down; a send
        // failing past that point is not an error a caller needs to see.
        let _ = self.tx.send(command).await;
    }

    pub async fn enqueue_tracks(&self, tracks: Vec<Track>) {
        self.send(PlayerCommand::Enqueue(tracks)).await;
    }

    pub async fn play_now(&self, track: Track) {
        self.send(PlayerCommand::PlayNow(track)).await;
    }

    pub async fn pause(&self) {
        self.send(PlayerCommand::Pause).await;
    }

    pub async fn resume(&self) {
        self.send(PlayerCommand::Resume).await;
    }

    pub async fn skip(&self) {
        self.send(PlayerCommand::Skip).await;
    }

    pub async fn clear(&self) {
        self.send(PlayerCommand::Clear).await;
    }

    pub async fn stop(&self) {
        self.send(PlayerCommand::Stop).await;
    }

    /// Not a command: repeat mode and shuffle are loop-read, any-thread-set
    /// settings, not queue mutations, so they bypass the command channel.
    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        *self.shared.repeat_mode.write() = mode;
    }

    pub fn set_shuffle(&self, shuffle: bool) {
        self.shared.shuffle.store(shuffle, Ordering::Relaxed);
    }

    #[must_use]
    pub fn repeat_mode(&self) -> RepeatMode {
        *self.shared.repeat_mode.read()
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shared.shuffle.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn queue_snapshot(&self) -> Vec<Track> {
        self.queue.snapshot()
    }

    #[must_use]
    pub fn state(&self) -> PlayerState {
        *self.shared.state.read()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<CurrentSessionInfo> {
        let active = self.shared.current.read().clone()?;
        Some(CurrentSessionInfo {
            track: active.track,
            state: self.state(),
            started_at: active.started_at,
        })
    }

    /// Signals the loop to shut down and awaits its supervisor task. Safe
    /// to call more than once or from more than one clone: only the first
    /// caller to observe the task still present actually awaits it.
    pub async fn dispose(&self) {
        self.loop_cancel.cancel();
        let task = self.loop_task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}
