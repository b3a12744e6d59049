//! The real-time PCM sink and its pacing policy.
//!
//! The underlying Opus/Discord stream this sink eventually feeds has no
//! back-pressure of its own: writing faster than real time silently drops
//! frames downstream. `PacingSink` is the thing standing between a decoder
//! that can produce bytes arbitrarily fast and a consumer that can only
//! absorb them at exactly 192 000 B/s.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use playback_types::SinkError;

/// Bytes/second for 48 kHz / 16-bit signed / 2 channels PCM.
pub const PCM_BYTE_RATE: u64 = 48_000 * 2 * 2;

/// A gap since the last write beyond which the pacing clock resets instead
/// of trying to "catch up".
const STALL_RESET: Duration = Duration::from_secs(1);

/// Upper bound on a single pacing sleep.
pub const MAX_PACING_DELAY: Duration = Duration::from_secs(2);

/// The thing a [`PacingSink`] actually forwards bytes to. Splitting this out
/// from pacing itself is what lets tests swap in an in-memory writer.
#[async_trait]
pub trait PcmWriter: Send {
    async fn write_all(&mut self, buffer: &[u8]) -> Result<(), SinkError>;
    async fn flush(&mut self) -> Result<(), SinkError>;
}

/// Public sink contract.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn write(&self, buffer: &[u8], cancel: &CancellationToken) -> Result<(), SinkError>;
    async fn complete(&self, cancel: &CancellationToken) -> Result<(), SinkError>;
    async fn close(&self);
}

/// Writes to a child process's stdin — the downstream encoder stage
/// (Discord/Opus) that motivates pacing in the first place.
pub struct ProcessPcmWriter {
    stdin: tokio::process::ChildStdin,
}

impl ProcessPcmWriter {
    #[must_use]
    pub fn new(stdin: tokio::process::ChildStdin) -> Self {
        Self { stdin }
    }
}

#[async_trait]
impl PcmWriter for ProcessPcmWriter {
    async fn write_all(&mut self, buffer: &[u8]) -> Result<(), SinkError> {
        use tokio::io::AsyncWriteExt;
        self.stdin.write_all(buffer).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        use tokio::io::AsyncWriteExt;
        self.stdin.flush().await?;
        Ok(())
    }
}

struct PacingState {
    clock_start: Option<Instant>,
    bytes_sent: u64,
    last_write_at: Option<Instant>,
}

impl Default for PacingState {
    fn default() -> Self {
        Self {
            clock_start: None,
            bytes_sent: 0,
            last_write_at: None,
        }
    }
}

/// Sink that paces writes to real time over a pluggable [`PcmWriter`].
pub struct PacingSink<W> {
    writer: Mutex<W>,
    state: Mutex<PacingState>,
}

impl<W: PcmWriter> PacingSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            state: Mutex::new(PacingState::default()),
        }
    }
}

#[async_trait]
impl<W: PcmWriter + Send> AudioSink for PacingSink<W> {
    async fn write(&self, buffer: &[u8], cancel: &CancellationToken) -> Result<(), SinkError> {
        if buffer.is_empty() {
            return Ok(());
        }

        let now = Instant::now();
        let delay = {
            let mut state = self.state.lock().await;

            let stalled = state
                .last_write_at
                .is_none_or(|last| now.saturating_duration_since(last) > STALL_RESET);
            if state.clock_start.is_none() || stalled {
                state.clock_start = Some(now);
                state.bytes_sent = 0;
            }
            state.last_write_at = Some(now);

            state.bytes_sent += buffer.len() as u64;
            let expected_ms = state.bytes_sent * 1000 / PCM_BYTE_RATE;
            let target = state.clock_start.unwrap() + Duration::from_millis(expected_ms);
            target.checked_duration_since(now)
        };

        {
            let mut writer = self.writer.lock().await;
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                result = writer.write_all(buffer) => result?,
            }
        }

        // A delay of zero means we're already behind; one at or past
        // MAX_PACING_DELAY means clock_start raced a reset and sleeping
        // would pointlessly stall the session. Neither is worth sleeping
        // for.
        if let Some(delay) = delay {
            if delay > Duration::ZERO && delay < MAX_PACING_DELAY {
                tokio::select! {
                    () = cancel.cancelled() => return Ok(()),
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        Ok(())
    }

    async fn complete(&self, cancel: &CancellationToken) -> Result<(), SinkError> {
        {
            let mut writer = self.writer.lock().await;
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                result = writer.flush() => result?,
            }
        }
        *self.state.lock().await = PacingState::default();
        Ok(())
    }

    async fn close(&self) {
        // Dropping the writer releases whatever resource it held; double
        // dispose is a no-op because Mutex<W> just gets locked and dropped
        // again harmlessly.
    }
}
