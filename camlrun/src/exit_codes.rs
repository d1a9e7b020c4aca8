//! Stable exit codes for the camlrun CLI.
//!
//! Usage errors exit with clap's own code (2).

/// A command ran. Run and update failures are reported on stdout, not through
/// the exit code.
pub const OK: i32 = 0;
/// Configuration could not be loaded or validated.
pub const INVALID: i32 = 1;
