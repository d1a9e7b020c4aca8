//! The update command: download the new version and install it over `target`.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::io::update::Updater;
use crate::report::{Failure, FailureKind, emit};

pub const SUCCESS_MESSAGE: &str = "\nUpdate was successful!";

/// Run both update steps, reporting the outcome on `console`.
///
/// A failed download stops the update before anything is replaced. Nothing is
/// rolled back or verified.
#[instrument(skip_all, fields(target = %target.display()))]
pub fn update_self<U: Updater, W: Write>(
    updater: &U,
    target: &Path,
    debug: bool,
    console: &mut W,
) -> bool {
    match install(updater, target) {
        Ok(()) => {
            info!("update installed");
            emit(console, SUCCESS_MESSAGE);
            true
        }
        Err(failure) => {
            warn!(kind = ?failure.kind, "update failed");
            debug!(%failure, "update failure detail");
            emit(console, &failure.render(debug));
            false
        }
    }
}

fn install<U: Updater>(updater: &U, target: &Path) -> Result<(), Failure> {
    let download = updater
        .download()
        .map_err(|err| Failure::from_error(FailureKind::Download, &err))?;
    updater
        .replace(&download, target)
        .map_err(|err| Failure::from_error(FailureKind::Replace, &err))
}
