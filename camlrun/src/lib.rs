//! Command-line front end for an external language interpreter.
//!
//! `camlrun` feeds a program file to an interpreter binary (the Caml Light
//! toplevel by default), strips the toplevel's banner and prompt markers from
//! what it prints, and appends anything written to stderr as an error section.
//! It can also replace itself with a freshly downloaded version.
//!
//! - **[`clean`]**: Pure output post-processing.
//! - **[`io`]**: Side-effecting operations (processes, downloads, file moves)
//!   behind traits so tests can script them.
//!
//! [`run`] and [`update`] compose the two into the CLI commands.

pub mod clean;
pub mod cli;
pub mod config;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod update;
