//! Audio source: opens a byte-producing reader for a track.

mod local;
mod pump;
mod remote;

pub use local::LocalFileSource;
pub use remote::RemoteSource;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use playback_types::{InputKind, SourceError, Track};

/// Yields raw PCM (48 kHz / 16-bit signed LE / 2 channels) until EOF.
#[async_trait]
pub trait PcmReader: Send {
    /// Reads up to `buffer.len()` bytes, returning the count read. `0` means
    /// EOF.
    async fn read(&mut self, buffer: &mut [u8], cancel: &CancellationToken) -> Result<usize, SourceError>;

    async fn close(&mut self);
}

#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn open_reader(
        &self,
        track: &Track,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn PcmReader>, SourceError>;
}

/// Composite that dispatches to a concrete source by `Track::input_kind`.
pub struct RoutingSource {
    local: LocalFileSource,
    remote: RemoteSource,
}

impl RoutingSource {
    #[must_use]
    pub fn new(local: LocalFileSource, remote: RemoteSource) -> Self {
        Self { local, remote }
    }
}

#[async_trait]
impl AudioSource for RoutingSource {
    async fn open_reader(
        &self,
        track: &Track,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn PcmReader>, SourceError> {
        match track.input_kind {
            InputKind::LocalFile => self.local.open_reader(track, cancel).await,
            InputKind::Remote => self.remote.open_reader(track, cancel).await,
        }
    }
}
