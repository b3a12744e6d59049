//! Background byte-copy pump linking two child processes' stdio streams.

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, ChildStdout};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PUMP_BUFFER: usize = 80 * 1024;

/// Spawns the pump as its own task. Returns the handle so the caller can
/// await it during disposal; the task itself tolerates `cancel` firing
/// mid-copy by simply stopping, never propagating an error back.
pub fn spawn_pump(
    mut src: ChildStdout,
    mut dst: ChildStdin,
    buffer_size: usize,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = BytesMut::zeroed(buffer_size);
        loop {
            let read = tokio::select! {
                () = cancel.cancelled() => break,
                result = src.read(&mut buffer) => result,
            };
            let n = match read {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            let write = tokio::select! {
                () = cancel.cancelled() => break,
                result = dst.write_all(&buffer[..n]) => result,
            };
            if write.is_err() {
                break;
            }
        }
    })
}
