//! Post-processing of captured interpreter output.
//!
//! Pure string functions: no I/O, so everything here is tested in isolation.

use crate::config::InterpreterConfig;

/// Rules for turning raw interpreter output into the displayed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaner {
    banner_lines: usize,
    prompt_marker: String,
    error_separator: String,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::from_config(&InterpreterConfig::default())
    }
}

impl Cleaner {
    pub fn from_config(cfg: &InterpreterConfig) -> Self {
        Self {
            banner_lines: cfg.banner_lines,
            prompt_marker: cfg.prompt_marker.clone(),
            error_separator: cfg.error_separator.clone(),
        }
    }

    /// Drop the banner lines and strip leading prompt markers from every remaining line.
    ///
    /// Line endings are normalized to `\n`. Output shorter than the banner
    /// yields an empty body.
    pub fn clean_stdout(&self, text: &str) -> String {
        text.split('\n')
            .skip(self.banner_lines)
            .map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                line.trim_start_matches(self.prompt_marker.as_str())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the final result: cleaned stdout, then the error section if stderr has content.
    pub fn assemble(&self, stdout: &str, stderr: &str) -> String {
        let mut result = self.clean_stdout(stdout);
        if has_error_lines(stderr) {
            result.push_str(&self.error_separator);
            result.push('\n');
            result.push_str(&normalize_newlines(stderr));
        }
        result
    }
}

/// True when stderr holds at least one non-blank line.
pub fn has_error_lines(stderr: &str) -> bool {
    stderr.split('\n').any(|line| !line.trim().is_empty())
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}
