use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::sync::CancellationToken;

use playback_types::{DecoderConfig, SourceError, Track};

use crate::process_util::{exit_code, kill_and_wait};

use super::{AudioSource, PcmReader};

/// Spawns a decoder child process against a path on disk.
pub struct LocalFileSource {
    decoder: DecoderConfig,
}

impl LocalFileSource {
    #[must_use]
    pub fn new(decoder: DecoderConfig) -> Self {
        Self { decoder }
    }

    fn decoder_args(&self, path: &str) -> Vec<String> {
        let mut args = Vec::new();
        if self.decoder.hide_banner {
            args.push("-hide_banner".to_string());
        }
        args.push("-loglevel".to_string());
        args.push(self.decoder.log_level.clone());
        args.push("-i".to_string());
        args.push(path.to_string());
        args.push("-f".to_string());
        args.push(self.decoder.sample_format.clone());
        args.push("-ar".to_string());
        args.push(self.decoder.sample_rate.to_string());
        args.push("-ac".to_string());
        args.push(self.decoder.channels.to_string());
        args.push("pipe:1".to_string());
        args
    }
}

#[async_trait]
impl AudioSource for LocalFileSource {
    async fn open_reader(
        &self,
        track: &Track,
        _cancel: &CancellationToken,
    ) -> Result<Box<dyn PcmReader>, SourceError> {
        if let Err(err) = tokio::fs::metadata(&track.uri).await {
            if err.kind() == std::io::ErrorKind::NotFound {
                return Err(SourceError::FileNotFound(track.uri.clone()));
            }
            return Err(SourceError::Io(err));
        }

        let mut child = Command::new(&self.decoder.path)
            .args(self.decoder_args(&track.uri))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child.stdout.take().expect("decoder stdout must be piped");

        Ok(Box::new(LocalFileReader { child, stdout }))
    }
}

struct LocalFileReader {
    child: Child,
    stdout: ChildStdout,
}

#[async_trait]
impl PcmReader for LocalFileReader {
    async fn read(&mut self, buffer: &mut [u8], cancel: &CancellationToken) -> Result<usize, SourceError> {
        let read = tokio::select! {
            () = cancel.cancelled() => return Ok(0),
            result = self.stdout.read(buffer) => result?,
        };
        if read == 0 {
            let status = self.child.wait().await?;
            let code = exit_code(status);
            if code != 0 {
                return Err(SourceError::PipelineFailed { child: "decoder", code });
            }
        }
        Ok(read)
    }

    async fn close(&mut self) {
        kill_and_wait("decoder", &mut self.child).await;
    }
}
