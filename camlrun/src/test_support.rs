//! Test-only fakes for the interpreter and updater, plus fixture helpers.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::io::interpreter::{Interpreter, Transcript};
use crate::io::update::{Download, Updater};

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

/// Interpreter returning a predetermined transcript (or error) without spawning anything.
pub struct ScriptedInterpreter {
    result: std::result::Result<Transcript, String>,
    calls: Cell<usize>,
    last_input: RefCell<Option<String>>,
}

impl ScriptedInterpreter {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::with_result(Ok(Transcript {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_result(Err(message.into()))
    }

    fn with_result(result: std::result::Result<Transcript, String>) -> Self {
        Self {
            result,
            calls: Cell::new(0),
            last_input: RefCell::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Contents of the file passed to the most recent call.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.borrow().clone()
    }
}

impl Interpreter for ScriptedInterpreter {
    fn interpret(&self, mut input: File) -> Result<Transcript> {
        self.calls.set(self.calls.get() + 1);
        let mut contents = String::new();
        input.read_to_string(&mut contents)?;
        *self.last_input.borrow_mut() = Some(contents);
        self.result.clone().map_err(|message| anyhow!(message))
    }
}

/// Updater recording which steps ran, failing on demand.
#[derive(Default)]
pub struct RecordingUpdater {
    download_error: Option<String>,
    replace_error: Option<String>,
    steps: RefCell<Vec<&'static str>>,
    replaced: RefCell<Vec<PathBuf>>,
}

impl RecordingUpdater {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing_download(message: impl Into<String>) -> Self {
        Self {
            download_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failing_replace(message: impl Into<String>) -> Self {
        Self {
            replace_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn steps(&self) -> Vec<&'static str> {
        self.steps.borrow().clone()
    }

    pub fn replaced_targets(&self) -> Vec<PathBuf> {
        self.replaced.borrow().clone()
    }
}

impl Updater for RecordingUpdater {
    fn download(&self) -> Result<Download> {
        self.steps.borrow_mut().push("download");
        match &self.download_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(Download::at("/tmp/camlrun-update/camlrun")),
        }
    }

    fn replace(&self, _download: &Download, target: &Path) -> Result<()> {
        self.steps.borrow_mut().push("replace");
        match &self.replace_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => {
                self.replaced.borrow_mut().push(target.to_path_buf());
                Ok(())
            }
        }
    }
}
