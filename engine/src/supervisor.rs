//! The single-consumer command loop: owns the queue, the current session
//! slot, and player state; the only task allowed to mutate any of them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use playback_types::{PlaybackEndReason, PlayerCommand, PlayerState, RepeatMode};

use crate::events::{Listener, PlaybackEvent};
use crate::handle::{ActiveTrackInfo, PlayerHandle};
use crate::queue::TrackQueue;
use crate::session::PlaybackSession;
use crate::sink::AudioSink;
use crate::source::AudioSource;

/// Shared, loop-written / any-thread-read state backing `PlayerHandle`'s
/// synchronous queries. Only `PlaybackLoop::run` ever writes through these.
pub(crate) struct SharedState {
    pub(crate) state: RwLock<PlayerState>,
    pub(crate) current: RwLock<Option<ActiveTrackInfo>>,
    pub(crate) repeat_mode: RwLock<RepeatMode>,
    pub(crate) shuffle: AtomicBool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            state: RwLock::new(PlayerState::Idle),
            current: RwLock::new(None),
            repeat_mode: RwLock::new(RepeatMode::None),
            shuffle: AtomicBool::new(false),
        }
    }
}

/// The supervisor task itself. Construct via [`PlaybackLoop::spawn`], which
/// returns the [`PlayerHandle`] front end; the run loop's own `JoinHandle`
/// is kept inside the handle, observable only through
/// [`PlayerHandle::dispose`].
pub struct PlaybackLoop {
    rx: mpsc::Receiver<PlayerCommand>,
    tx: mpsc::Sender<PlayerCommand>,
    queue: Arc<TrackQueue>,
    shared: Arc<SharedState>,
    loop_cancel: CancellationToken,
    source: Arc<dyn AudioSource>,
    sink: Arc<dyn AudioSink>,
    listeners: Vec<Arc<dyn Listener>>,
    active_session: Option<Arc<PlaybackSession>>,
    session_task: Option<JoinHandle<()>>,
}

impl PlaybackLoop {
    /// Wires up the channel, shared state, and queue, spawns the run loop,
    /// and returns the caller-facing [`PlayerHandle`]. The handle owns the
    /// run loop's `JoinHandle` internally; `PlayerHandle::dispose` is the
    /// only way to observe it finish.
    #[must_use]
    pub fn spawn(
        queue_capacity: usize,
        source: Arc<dyn AudioSource>,
        sink: Arc<dyn AudioSink>,
        listeners: Vec<Arc<dyn Listener>>,
    ) -> PlayerHandle {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let queue = Arc::new(TrackQueue::new());
        let shared = Arc::new(SharedState::default());
        let loop_cancel = CancellationToken::new();

        let playback_loop = Self {
            rx,
            tx: tx.clone(),
            queue: queue.clone(),
            shared: shared.clone(),
            loop_cancel: loop_cancel.clone(),
            source,
            sink,
            listeners,
            active_session: None,
            session_task: None,
        };

        let handle = PlayerHandle::new(tx, queue, shared, loop_cancel);
        let task = tokio::spawn(playback_loop.run());
        handle.attach_task(task);
        handle
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                () = self.loop_cancel.cancelled() => break,
                received = self.rx.recv() => {
                    match received {
                        Some(command) => self.handle_command(command),
                        None => break,
                    }
                }
            }
        }
        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        if let Some(session) = self.active_session.take() {
            session.cancel_token().cancel();
        }
        if let Some(task) = self.session_task.take() {
            let _ = task.await;
        }
        self.sink.close().await;
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Enqueue(tracks) => {
                self.queue.append_many(tracks);
                if matches!(self.current_state(), PlayerState::Idle | PlayerState::Stopped) {
                    self.try_start_next();
                }
            }
            PlayerCommand::PlayNow(track) => {
                self.queue.remove_where_id(&track.uri);
                self.queue.push_front(track);
                let should_start_directly =
                    self.active_session.is_none() || matches!(self.current_state(), PlayerState::Idle | PlayerState::Stopped);
                if should_start_directly {
                    self.try_start_next();
                } else if let Some(session) = &self.active_session {
                    // SessionEnded for the pre-empted session drives the next
                    // start, not this handler.
                    session.cancel_token().cancel();
                }
            }
            PlayerCommand::Skip => {
                if let Some(session) = &self.active_session {
                    session.cancel_token().cancel();
                }
            }
            PlayerCommand::Pause => {
                if self.current_state() == PlayerState::Playing {
                    if let Some(session) = &self.active_session {
                        session.pause_gate().pause();
                        self.set_state(PlayerState::Paused);
                    }
                }
            }
            PlayerCommand::Resume => {
                if self.current_state() == PlayerState::Paused {
                    if let Some(session) = &self.active_session {
                        session.pause_gate().resume();
                        self.set_state(PlayerState::Playing);
                    }
                }
            }
            PlayerCommand::Clear => {
                self.queue.clear();
            }
            PlayerCommand::Stop => {
                self.queue.clear();
                if let Some(session) = &self.active_session {
                    session.cancel_token().cancel();
                }
                self.set_state(PlayerState::Stopped);
            }
            PlayerCommand::SessionEnded(track, result) => {
                self.emit(PlaybackEvent::OnSessionEnded(track.clone(), result.clone()));
                self.active_session = None;
                self.session_task = None;
                *self.shared.current.write() = None;

                if result.reason != PlaybackEndReason::Cancelled {
                    match *self.shared.repeat_mode.read() {
                        RepeatMode::All => self.queue.append_many(vec![track]),
                        RepeatMode::One => self.queue.push_front(track),
                        RepeatMode::None => {}
                    }
                }

                if self.queue.count() > 0 {
                    self.try_start_next();
                } else {
                    self.set_state(PlayerState::Idle);
                }
            }
        }
    }

    /// If a session is already active, does nothing. Otherwise dequeues the
    /// next track (emitting `OnTrackChanged` regardless of outcome) and
    /// either goes idle or spawns the session task.
    fn try_start_next(&mut self) {
        if self.active_session.is_some() {
            return;
        }

        let shuffle = self.shared.shuffle.load(Ordering::Relaxed);
        let track = self.queue.dequeue_next(shuffle);
        self.emit(PlaybackEvent::OnTrackChanged(track.clone()));

        let Some(track) = track else {
            self.set_state(PlayerState::Idle);
            return;
        };

        self.set_state(PlayerState::Playing);
        let session_cancel = self.loop_cancel.child_token();
        let session = Arc::new(PlaybackSession::new(track.clone(), session_cancel));
        *self.shared.current.write() = Some(ActiveTrackInfo {
            track: track.clone(),
            started_at: session.started_at(),
        });
        self.active_session = Some(session.clone());

        let source = self.source.clone();
        let sink = self.sink.clone();
        let tx = self.tx.clone();
        self.session_task = Some(tokio::spawn(async move {
            let result = session.start(source.as_ref(), sink.as_ref()).await;
            let _ = tx.send(PlayerCommand::SessionEnded(track, result)).await;
        }));
    }

    fn current_state(&self) -> PlayerState {
        *self.shared.state.read()
    }

    fn set_state(&mut self, new_state: PlayerState) {
        if *self.shared.state.read() != new_state {
            *self.shared.state.write() = new_state;
            self.emit(PlaybackEvent::OnStateChanged(new_state));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }
}
