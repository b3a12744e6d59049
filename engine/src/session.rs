//! Drives one track end-to-end: source -> sink with a pause gate and
//! cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use playback_types::{PlaybackEndResult, Track};

use crate::sink::AudioSink;
use crate::source::AudioSource;

/// Typical PCM chunk size a session reads per iteration.
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// A resettable condition the write loop awaits before proceeding. Built on
/// two separate primitives: a flag for the current state, a
/// `Notify` to wake a waiter on `resume`. Keeping these distinct from
/// cancellation is the point — closing the gate must never look like a
/// cancel to a waiter.
#[derive(Default)]
pub struct PauseGate {
    paused: AtomicBool,
    notify: Notify,
}

impl PauseGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Blocks while the gate is closed. Does not itself observe
    /// cancellation — callers race this against their cancel token.
    pub async fn wait(&self) {
        loop {
            if !self.paused.load(Ordering::SeqCst) {
                return;
            }
            let notified = self.notify.notified();
            if !self.paused.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

enum DriveError {
    Cancelled,
    Failed(String),
}

/// Owned exclusively by the loop while active. At most one exists at any
/// moment.
pub struct PlaybackSession {
    track: Track,
    started_at: Instant,
    pause_gate: Arc<PauseGate>,
    cancel: CancellationToken,
}

impl PlaybackSession {
    #[must_use]
    pub fn new(track: Track, cancel: CancellationToken) -> Self {
        Self {
            track,
            started_at: Instant::now(),
            pause_gate: Arc::new(PauseGate::new()),
            cancel,
        }
    }

    #[must_use]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    #[must_use]
    pub fn pause_gate(&self) -> &Arc<PauseGate> {
        &self.pause_gate
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs the source -> sink copy loop to completion, translating every
    /// outcome (including cancellation and failure) into a
    /// `PlaybackEndResult` — this is the boundary past which the loop never
    /// sees a raw error.
    pub async fn start(&self, source: &dyn AudioSource, sink: &dyn AudioSink) -> PlaybackEndResult {
        match self.drive(source, sink).await {
            Ok(()) => PlaybackEndResult::completed(),
            Err(DriveError::Cancelled) => PlaybackEndResult::cancelled(),
            Err(DriveError::Failed(message)) => PlaybackEndResult::failed(message),
        }
    }

    async fn drive(&self, source: &dyn AudioSource, sink: &dyn AudioSink) -> Result<(), DriveError> {
        if self.cancel.is_cancelled() {
            return Err(DriveError::Cancelled);
        }

        let mut reader = source
            .open_reader(&self.track, &self.cancel)
            .await
            .map_err(|err| DriveError::Failed(err.to_string()))?;

        let result = self.copy_loop(reader.as_mut(), sink).await;
        reader.close().await;
        result
    }

    async fn copy_loop(
        &self,
        reader: &mut dyn crate::source::PcmReader,
        sink: &dyn AudioSink,
    ) -> Result<(), DriveError> {
        let mut buffer = vec![0u8; READ_BUFFER_BYTES];
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return Err(DriveError::Cancelled),
                () = self.pause_gate.wait() => {}
            }
            if self.cancel.is_cancelled() {
                return Err(DriveError::Cancelled);
            }

            let read = reader
                .read(&mut buffer, &self.cancel)
                .await
                .map_err(|err| DriveError::Failed(err.to_string()))?;
            if self.cancel.is_cancelled() {
                return Err(DriveError::Cancelled);
            }
            if read == 0 {
                break;
            }

            sink.write(&buffer[..read], &self.cancel)
                .await
                .map_err(|err| DriveError::Failed(err.to_string()))?;
            if self.cancel.is_cancelled() {
                return Err(DriveError::Cancelled);
            }
        }

        sink.complete(&self.cancel)
            .await
            .map_err(|err| DriveError::Failed(err.to_string()))?;
        Ok(())
    }
}
