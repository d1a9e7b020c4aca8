//! camlrun configuration, read from `camlrun.toml` by default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::io::update::check_templates;

/// Default location of the self-update payload.
///
/// This is the historical location of the tool, which hosts the script
/// version. An update with this default replaces the executable with that
/// script. Point `update.url` at a build of this binary to keep it native.
pub const DEFAULT_UPDATE_URL: &str =
    "https://raw.githubusercontent.com/tbagrel1/sublime_camllight/master/camllight_interpreter.py";

/// Environment variable that replaces `interpreter.command` with a single program.
pub const INTERPRETER_ENV: &str = "CAMLRUN_INTERPRETER";

/// Top-level configuration (TOML).
///
/// Missing tables and fields fall back to the Caml Light defaults, so an
/// absent or partial file is always usable.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Program and arguments of the interpreter. The input file is fed on stdin.
    pub command: Vec<String>,

    /// Number of banner lines printed before any program output.
    pub banner_lines: usize,

    /// Prompt marker stripped from the start of every output line.
    pub prompt_marker: String,

    /// Text inserted between the cleaned output and the raw stderr.
    pub error_separator: String,

    /// Kill the interpreter after this many seconds. Unset waits forever.
    pub timeout_secs: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            command: vec!["camllight".to_string()],
            banner_lines: 2,
            prompt_marker: "#".to_string(),
            error_separator: "\n=== ERRORS ===\n".to_string(),
            timeout_secs: None,
        }
    }
}

impl InterpreterConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpdateConfig {
    /// Where the new version is downloaded from.
    pub url: String,

    /// Download command template; `{{ url }}` and `{{ dest }}` are substituted.
    pub download_command: Vec<String>,

    /// Move command template; `{{ src }}` and `{{ dest }}` are substituted.
    pub move_command: Vec<String>,

    /// Parent for the temporary download directory. Unset uses the system default.
    pub temp_dir: Option<PathBuf>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPDATE_URL.to_string(),
            download_command: ["wget", "-q", "-O", "{{ dest }}", "{{ url }}"]
                .map(String::from)
                .to_vec(),
            move_command: ["mv", "{{ src }}", "{{ dest }}"].map(String::from).to_vec(),
            temp_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.command.is_empty() || self.interpreter.command[0].trim().is_empty() {
            return Err(anyhow!("interpreter.command must be a non-empty array"));
        }
        if self.interpreter.prompt_marker.is_empty() {
            return Err(anyhow!("interpreter.prompt_marker must not be empty"));
        }
        if self.interpreter.timeout_secs == Some(0) {
            return Err(anyhow!("interpreter.timeout_secs must be > 0"));
        }
        if self.update.url.trim().is_empty() {
            return Err(anyhow!("update.url must not be empty"));
        }
        if self.update.download_command.is_empty() {
            return Err(anyhow!("update.download_command must be a non-empty array"));
        }
        if self.update.move_command.is_empty() {
            return Err(anyhow!("update.move_command must be a non-empty array"));
        }
        check_templates(&self.update.download_command).context("update.download_command")?;
        check_templates(&self.update.move_command).context("update.move_command")?;
        Ok(())
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup(INTERPRETER_ENV)
            && !program.trim().is_empty()
        {
            self.interpreter.command = vec![program];
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `Config::default()`.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
