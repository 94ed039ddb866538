//! Running local speech engines as child processes

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::{Error, Result};

/// Resolve an engine binary on `PATH` (or as given, when it is a path)
///
/// # Errors
///
/// Returns error if the binary cannot be found
pub fn locate(binary: &str) -> Result<PathBuf> {
    which::which(binary).map_err(|e| Error::Config(format!("{binary} not found: {e}")))
}

/// Prepare a command with piped output that dies with its handle
pub fn command(binary: &Path) -> Command {
    let mut cmd = Command::new(binary);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run a command to completion within `timeout`
///
/// A timed-out child is killed when its future is dropped.
///
/// # Errors
///
/// Returns error if the process cannot be spawned, times out, or exits
/// unsuccessfully
pub async fn run(mut cmd: Command, timeout: Duration) -> Result<Output> {
    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| Error::Timeout(timeout.as_secs()))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: String = stderr.lines().rev().take(3).collect::<Vec<_>>().join(" | ");
        return Err(Error::Io(std::io::Error::other(format!(
            "engine exited with {}: {tail}",
            output.status
        ))));
    }

    Ok(output)
}
