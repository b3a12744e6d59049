use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::sync::CancellationToken;

use playback_types::{DecoderConfig, FetcherConfig, SourceError, Track};

use crate::process_util::{exit_code, kill_and_wait};

use super::pump::{spawn_pump, DEFAULT_PUMP_BUFFER};
use super::{AudioSource, PcmReader};

/// Two-process pipeline (fetcher | decoder) linked by a background pump.
pub struct RemoteSource {
    fetcher: FetcherConfig,
    decoder: DecoderConfig,
    pump_buffer: usize,
}

impl RemoteSource {
    #[must_use]
    pub fn new(fetcher: FetcherConfig, decoder: DecoderConfig) -> Self {
        Self {
            fetcher,
            decoder,
            pump_buffer: DEFAULT_PUMP_BUFFER,
        }
    }

    #[must_use]
    pub fn with_pump_buffer(mut self, bytes: usize) -> Self {
        self.pump_buffer = bytes;
        self
    }

    fn fetcher_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "-".to_string()];
        if self.fetcher.use_cookies {
            if let Some(browser) = &self.fetcher.cookies_from_browser {
                args.push("--cookies-from-browser".to_string());
                args.push(browser.clone());
            }
            if let Some(file) = &self.fetcher.cookies_file {
                args.push("--cookies".to_string());
                args.push(file.display().to_string());
            }
        }
        args.push(url.to_string());
        args
    }

    fn decoder_args(&self) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.decoder.log_level.clone(),
            "-i".to_string(),
            "pipe:0".to_string(),
            "-f".to_string(),
            self.decoder.sample_format.clone(),
            "-ar".to_string(),
            self.decoder.sample_rate.to_string(),
            "-ac".to_string(),
            self.decoder.channels.to_string(),
            "pipe:1".to_string(),
        ]
    }
}

#[async_trait]
impl AudioSource for RemoteSource {
    async fn open_reader(
        &self,
        track: &Track,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn PcmReader>, SourceError> {
        let mut fetch = Command::new(&self.fetcher.path)
            .args(self.fetcher_args(&track.uri))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let mut decode = Command::new(&self.decoder.path)
            .args(self.decoder_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let fetch_stdout = fetch.stdout.take().expect("fetcher stdout must be piped");
        let decode_stdin = decode.stdin.take().expect("decoder stdin must be piped");
        let decode_stdout = decode.stdout.take().expect("decoder stdout must be piped");

        let pump_cancel = cancel.child_token();
        let pump_handle = spawn_pump(fetch_stdout, decode_stdin, self.pump_buffer, pump_cancel.clone());

        Ok(Box::new(RemoteReader {
            fetch,
            decode,
            decode_stdout,
            pump_cancel,
            pump_handle: Some(pump_handle),
        }))
    }
}

struct RemoteReader {
    fetch: Child,
    decode: Child,
    decode_stdout: ChildStdout,
    pump_cancel: CancellationToken,
    pump_handle: Option<tokio::task::JoinHandle<()>>,
}

#[async_trait]
impl PcmReader for RemoteReader {
    async fn read(&mut self, buffer: &mut [u8], cancel: &CancellationToken) -> Result<usize, SourceError> {
        let read = tokio::select! {
            () = cancel.cancelled() => return Ok(0),
            result = self.decode_stdout.read(buffer) => result?,
        };
        if read == 0 {
            let decode_status = self.decode.wait().await?;
            let fetch_status = self.fetch.wait().await?;
            let decode_code = exit_code(decode_status);
            let fetch_code = exit_code(fetch_status);
            if decode_code != 0 {
                return Err(SourceError::PipelineFailed { child: "decoder", code: decode_code });
            }
            if fetch_code != 0 {
                return Err(SourceError::PipelineFailed { child: "fetcher", code: fetch_code });
            }
        }
        Ok(read)
    }

    async fn close(&mut self) {
        self.pump_cancel.cancel();
        if let Some(handle) = self.pump_handle.take() {
            let _ = handle.await;
        }
        kill_and_wait("decoder", &mut self.decode).await;
        kill_and_wait("fetcher", &mut self.fetch).await;
    }
}
