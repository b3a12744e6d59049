//! Small helpers shared by the local-file and remote sources for spawning
//! and tearing down decoder/fetcher child processes.

use tokio::process::Child;

/// Kill a child process and wait for it to actually go away, tolerating the
/// process already having exited. Disposal steps must never let one child's
/// teardown error stop the rest from running.
pub async fn kill_and_wait(name: &'static str, child: &mut Child) {
    if let Err(err) = child.start_kill() {
        warn!("failed to signal {name} to stop: {err}");
    }
    if let Err(err) = child.wait().await {
        warn!("failed to reap {name} after kill: {err}");
    }
}

/// Map a child's exit status to the exit code `SourceError::PipelineFailed`
/// wants. Processes killed by a signal (no portable exit code) report `-1`.
#[must_use]
pub fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
