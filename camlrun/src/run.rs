//! The run command: feed a program to the interpreter and report its cleaned output.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::clean::Cleaner;
use crate::io::interpreter::Interpreter;
use crate::report::{Failure, FailureKind, emit};

/// Parameters for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Program fed to the interpreter on stdin.
    pub in_path: PathBuf,
    /// Optional file receiving the result.
    pub out_path: Option<PathBuf>,
    /// Print the result to the console.
    pub show: bool,
    /// Include the underlying error text in failure messages.
    pub debug: bool,
}

/// Run the request, reporting any failure on `console`.
///
/// Returns whether the run succeeded. Failures are printed, never propagated.
#[instrument(skip_all, fields(in_path = %request.in_path.display()))]
pub fn run_program<I: Interpreter, W: Write>(
    interpreter: &I,
    cleaner: &Cleaner,
    request: &RunRequest,
    console: &mut W,
) -> bool {
    match execute(interpreter, cleaner, request, console) {
        Ok(result) => {
            debug!(result_bytes = result.len(), "run succeeded");
            true
        }
        Err(err) => {
            let failure = Failure::from_error(FailureKind::Unexpected, &err);
            warn!(kind = ?failure.kind, "run failed");
            debug!(%failure, "run failure detail");
            emit(console, &failure.render(request.debug));
            false
        }
    }
}

/// Produce the cleaned result, write it to the output file, and show it.
pub fn execute<I: Interpreter, W: Write>(
    interpreter: &I,
    cleaner: &Cleaner,
    request: &RunRequest,
    console: &mut W,
) -> Result<String> {
    let input = File::open(&request.in_path)
        .with_context(|| format!("open {}", request.in_path.display()))?;
    let mut out_file = match &request.out_path {
        Some(path) => Some((path, create_output(path)?)),
        None => None,
    };

    let transcript = interpreter.interpret(input)?;
    let result = cleaner.assemble(&transcript.stdout, &transcript.stderr);

    if let Some((path, file)) = out_file.as_mut() {
        file.write_all(result.as_bytes())
            .and_then(|()| file.flush())
            .with_context(|| format!("write {}", path.display()))?;
    }
    if request.show {
        writeln!(console, "{result}").context("write result to console")?;
    }
    Ok(result)
}

fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedInterpreter, write_file};

    const BANNER: &str = ">       Caml Light version 0.75\n\n";

    fn request(in_path: PathBuf, out_path: Option<PathBuf>, show: bool, debug: bool) -> RunRequest {
        RunRequest {
            in_path,
            out_path,
            show,
            debug,
        }
    }

    #[test]
    fn shows_cleaned_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = write_file(temp.path(), "prog.ml", "let x = 1;;\n");
        let interpreter = ScriptedInterpreter::new(format!("{BANNER}#x : int = 1\n#"), "");
        let mut console = Vec::new();

        let ok = run_program(
            &interpreter,
            &Cleaner::default(),
            &request(input, None, true, false),
            &mut console,
        );

        assert!(ok);
        assert_eq!(String::from_utf8(console).unwrap(), "x : int = 1\n\n");
        assert_eq!(interpreter.calls(), 1);
        assert_eq!(interpreter.last_input().as_deref(), Some("let x = 1;;\n"));
    }

    #[test]
    fn output_file_matches_console_text() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = write_file(temp.path(), "prog.ml", "");
        let out = temp.path().join("out").join("result.txt");
        let interpreter =
            ScriptedInterpreter::new(format!("{BANNER}#1 : int\n#"), "Warning: unused\n");
        let mut console = Vec::new();

        let ok = run_program(
            &interpreter,
            &Cleaner::default(),
            &request(input, Some(out.clone()), true, false),
            &mut console,
        );

        assert!(ok);
        let written = fs::read_to_string(&out).expect("read output");
        assert_eq!(written, "1 : int\n\n=== ERRORS ===\n\nWarning: unused\n");
        assert_eq!(String::from_utf8(console).unwrap(), format!("{written}\n"));
    }

    #[test]
    fn hide_writes_file_but_not_console() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = write_file(temp.path(), "prog.ml", "");
        let out = temp.path().join("result.txt");
        let interpreter = ScriptedInterpreter::new(format!("{BANNER}#()"), "");
        let mut console = Vec::new();

        let ok = run_program(
            &interpreter,
            &Cleaner::default(),
            &request(input, Some(out.clone()), false, false),
            &mut console,
        );

        assert!(ok);
        assert!(console.is_empty());
        assert_eq!(fs::read_to_string(&out).expect("read output"), "()");
    }

    #[test]
    fn missing_input_fails_before_interpreter() {
        let temp = tempfile::tempdir().expect("tempdir");
        let out = temp.path().join("result.txt");
        let interpreter = ScriptedInterpreter::new("unused", "");
        let mut console = Vec::new();

        let ok = run_program(
            &interpreter,
            &Cleaner::default(),
            &request(temp.path().join("missing.ml"), Some(out.clone()), true, false),
            &mut console,
        );

        assert!(!ok);
        assert_eq!(interpreter.calls(), 0);
        assert!(!out.exists());
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "\nUnexpected error happened.\n"
        );
    }

    #[test]
    fn debug_shows_underlying_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = write_file(temp.path(), "prog.ml", "");
        let interpreter = ScriptedInterpreter::failing("spawn \"camllight\": No such file");
        let mut console = Vec::new();

        let ok = run_program(
            &interpreter,
            &Cleaner::default(),
            &request(input, None, true, true),
            &mut console,
        );

        assert!(!ok);
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "\nUnexpected error happened.\nOriginal error: [spawn \"camllight\": No such file]\n"
        );
    }

    #[test]
    fn debug_does_not_change_success_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = write_file(temp.path(), "prog.ml", "");
        let stdout = format!("{BANNER}#s : string = \"hi\"\n#");

        let mut plain = Vec::new();
        let mut verbose = Vec::new();
        for (console, debug_flag) in [(&mut plain, false), (&mut verbose, true)] {
            let interpreter = ScriptedInterpreter::new(stdout.clone(), "");
            let input = input.clone();
            assert!(run_program(
                &interpreter,
                &Cleaner::default(),
                &request(input, None, true, debug_flag),
                console,
            ));
        }
        assert_eq!(plain, verbose);
    }
}
