//! Subprocess runner (SR) and timeout watcher.
//!
//! Forks the encoder tool with the assembled argument vector, captures its
//! standard output on a pipe (standard error goes to `/dev/null`), and
//! enforces a wall-clock timeout. The watcher is expressed as a
//! `tokio::select!` race between the child's exit and a sleep rather than a
//! separate polling thread: whichever resolves first cancels the other
//! branch for free, which is both the "cooperative cancellation" and the
//! "cancel the watcher on normal exit" behavior the design calls for.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, ChildStdout, Command};

/// How the child process terminated.
#[derive(Debug, PartialEq, Eq)]
pub enum ChildOutcome {
    /// The child exited on its own; `code(0)` means success.
    Exited(std::process::ExitStatus),
    /// The watcher's deadline elapsed first and the child was killed.
    TimedOut,
}

impl ChildOutcome {
    /// Whether this outcome counts as job success: a normal exit with
    /// status 0. Anything else — non-zero exit, signal, or timeout — is a
    /// job failure.
    pub fn is_success(&self) -> bool {
        matches!(self, ChildOutcome::Exited(status) if status.success())
    }
}

/// A spawned child with its stdout pipe split out for the progress pump.
pub struct SpawnedChild {
    pub child: Child,
    pub stdout: ChildStdout,
}

/// Spawns `program` with `args`, piping stdout and discarding stderr.
/// On exec failure the child exits with status 127, per the encoder tool's
/// documented contract; that surfaces here as a normal (non-zero) exit
/// status rather than a spawn error in most cases, but a `spawn()` failure
/// (e.g. the binary doesn't exist) is still possible and is propagated.
pub fn spawn(program: &str, args: &[String]) -> std::io::Result<SpawnedChild> {
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;
    let stdout = child.stdout.take().expect("stdout was piped");
    Ok(SpawnedChild { child, stdout })
}

/// Waits for `child` to exit, killing it forcefully if `timeout` elapses
/// first. Reaps the process after a forced kill so it doesn't linger as a
/// zombie.
pub async fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
) -> std::io::Result<ChildOutcome> {
    tokio::select! {
        status = child.wait() => Ok(ChildOutcome::Exited(status?)),
        _ = tokio::time::sleep(timeout) => {
            child.start_kill()?;
            let _ = child.wait().await;
            Ok(ChildOutcome::TimedOut)
        }
    }
}
