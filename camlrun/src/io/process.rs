//! Helpers for running child processes and capturing their output.

use std::fs::File;
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Turn a non-zero exit (or a timeout) into an error carrying the child's stderr.
    pub fn ensure_success(self, label: &str) -> Result<Self> {
        if self.timed_out {
            return Err(anyhow!("{label} timed out"));
        }
        if !self.status.success() {
            let stderr = self.stderr_text();
            let stderr = stderr.trim();
            if stderr.is_empty() {
                return Err(anyhow!("{label} failed with {}", self.status));
            }
            return Err(anyhow!("{label} failed with {}: {stderr}", self.status));
        }
        Ok(self)
    }
}

/// Run a command to completion and capture stdout/stderr without risking pipe deadlocks.
///
/// `stdin` is redirected from the given file, or from `/dev/null` when absent.
/// With `timeout` set the child is killed once it elapses; otherwise this blocks
/// until the child exits.
#[instrument(skip_all, fields(program = ?cmd.get_program(), timeout_secs = timeout.map(|t| t.as_secs())))]
pub fn run_command(
    mut cmd: Command,
    stdin: Option<File>,
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    match stdin {
        Some(file) => cmd.stdin(Stdio::from(file)),
        None => cmd.stdin(Stdio::null()),
    };
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            debug!(err = %e, "failed to spawn command");
            return Err(e).with_context(|| format!("spawn {:?}", cmd.get_program()));
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream(stdout));
    let stderr_handle = thread::spawn(move || read_stream(stderr));

    let mut timed_out = false;
    let status = match timeout {
        None => child.wait().context("wait for command")?,
        Some(limit) => match child.wait_timeout(limit).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
                timed_out = true;
                child.kill().context("kill command")?;
                child.wait().context("wait command after kill")?
            }
        },
    };

    let stdout = join_output(stdout_handle).context("join stdout")?;
    let stderr = join_output(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

fn join_output(handle: thread::JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).context("read output")?;
    Ok(buf)
}
