//! Interpreter abstraction.
//!
//! The [`Interpreter`] trait decouples the run command from the actual
//! interpreter binary (by default `camllight`). Tests use scripted
//! interpreters that return predetermined transcripts without spawning
//! processes.

use std::fs::File;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::config::InterpreterConfig;
use crate::io::process::run_command;

/// Raw text the interpreter wrote to its output streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub stdout: String,
    pub stderr: String,
}

/// Abstraction over interpreter backends.
pub trait Interpreter {
    /// Run the interpreter with `input` as its standard input.
    fn interpret(&self, input: File) -> Result<Transcript>;
}

/// Interpreter that spawns an external program.
#[derive(Debug, Clone)]
pub struct ProcessInterpreter {
    command: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessInterpreter {
    pub fn new(command: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { command, timeout }
    }

    pub fn from_config(cfg: &InterpreterConfig) -> Self {
        Self::new(cfg.command.clone(), cfg.timeout())
    }
}

impl Interpreter for ProcessInterpreter {
    #[instrument(skip_all, fields(program = self.command.first().map(String::as_str)))]
    fn interpret(&self, input: File) -> Result<Transcript> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("interpreter command is empty"))?;
        info!("starting interpreter");

        let mut cmd = Command::new(program);
        cmd.args(args);
        let output = run_command(cmd, Some(input), self.timeout)
            .with_context(|| format!("run interpreter {program}"))?;

        if output.timed_out {
            warn!("interpreter timed out");
            return Err(anyhow!(
                "interpreter {program} timed out after {:?}",
                self.timeout.unwrap_or_default()
            ));
        }
        if !output.status.success() {
            // The toplevel reports program errors on stderr; they end up in the result.
            debug!(exit_code = ?output.status.code(), "interpreter exited with failure status");
        }

        Ok(Transcript {
            stdout: output.stdout_text(),
            stderr: output.stderr_text(),
        })
    }
}
