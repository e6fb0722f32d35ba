//! Command-line interface
//!
//! `spec`, `check`, `discover` and `read` subcommands with harness-style
//! JSON envelope output.

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
