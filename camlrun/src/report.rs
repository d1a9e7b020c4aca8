//! User-facing failure messages.
//!
//! Commands never crash on failure. They print one of these messages and
//! return `false`. The underlying error text is only shown with `--debug`.

use std::fmt;
use std::io::Write;

use tracing::warn;

/// The three ways a command can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The new version could not be downloaded.
    Download,
    /// The downloaded file could not replace the running executable.
    Replace,
    /// Anything else going wrong while running a program.
    Unexpected,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::Download => {
                "\nUnable to retrieve the new version of the script. Please try again later."
            }
            Self::Replace => {
                "\nUnable to move the new script to the current script directory. \
                 Please re-run the script with enough privileges."
            }
            Self::Unexpected => "\nUnexpected error happened.",
        }
    }
}

/// A failed command: what went wrong, and the raw diagnostic behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    /// Build a failure from an error chain, keeping every context layer.
    pub fn from_error(kind: FailureKind, err: &anyhow::Error) -> Self {
        Self::new(kind, format!("{err:#}"))
    }

    /// Render the console text; the detail line is only included when `debug` is set.
    pub fn render(&self, debug: bool) -> String {
        let mut text = self.kind.message().to_string();
        if debug && let Some(detail) = &self.detail {
            text.push_str(&format!("\nOriginal error: [{detail}]"));
        }
        text
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.message().trim_start())?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Write a line of user-facing text to the console.
///
/// A broken console is logged, never escalated: the command outcome stands.
pub fn emit<W: Write>(console: &mut W, text: &str) {
    if let Err(err) = writeln!(console, "{text}").and_then(|()| console.flush()) {
        warn!(err = %err, "failed to write to console");
    }
}
