//! I/O adapters: child processes, the interpreter, and self-update steps.

pub mod interpreter;
pub mod process;
pub mod update;
