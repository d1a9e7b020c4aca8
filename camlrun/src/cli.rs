//! Command-line surface.

use std::fs::{self, File};
use std::path::PathBuf;

use clap::Parser;

use crate::run::RunRequest;

pub const DEFAULT_CONFIG_PATH: &str = "camlrun.toml";

#[derive(Parser, Debug)]
#[command(
    name = "camlrun",
    version,
    args_override_self = true,
    about = "Run a Caml Light program and print its output as the official toplevel shows it"
)]
pub struct Cli {
    /// Program to run. Must be an existing, readable file.
    #[arg(value_parser = existing_readable_file, required_unless_present = "update")]
    pub in_path: Option<PathBuf>,

    /// Optional file where output will be written.
    #[arg(short, long)]
    pub out_file: Option<PathBuf>,

    /// Run the specified file (default).
    #[arg(long, overrides_with = "update")]
    run: bool,

    /// Update this tool instead of running a file.
    #[arg(long, overrides_with = "run")]
    update: bool,

    /// Show the interpreter output (default).
    #[arg(long, overrides_with = "hide")]
    show: bool,

    /// Hide the interpreter output.
    #[arg(long, overrides_with = "show")]
    hide: bool,

    /// Show debug information on failure.
    #[arg(long, overrides_with = "no_debug")]
    debug: bool,

    /// Hide debug information (default).
    #[arg(long, overrides_with = "debug")]
    no_debug: bool,

    /// Configuration file. Missing files fall back to defaults.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// What the invocation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    Update,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.update && !self.run {
            Mode::Update
        } else {
            Mode::Run
        }
    }

    pub fn show(&self) -> bool {
        !self.hide
    }

    pub fn debug(&self) -> bool {
        self.debug && !self.no_debug
    }

    /// The run request, or `None` when no input path was given.
    pub fn run_request(&self) -> Option<RunRequest> {
        Some(RunRequest {
            in_path: self.in_path.clone()?,
            out_path: self.out_file.clone(),
            show: self.show(),
            debug: self.debug(),
        })
    }
}

/// Accept only existing, readable regular files, resolved to an absolute path.
fn existing_readable_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    let meta = fs::metadata(&path).map_err(|_| format!("path '{raw}' does not exist"))?;
    if meta.is_dir() {
        return Err(format!("path '{raw}' is a directory"));
    }
    File::open(&path).map_err(|err| format!("path '{raw}' is not readable: {err}"))?;
    fs::canonicalize(&path).map_err(|err| format!("resolve '{raw}': {err}"))
}
