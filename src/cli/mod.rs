//! CLI module for wildcheck
//!
//! Provides command-line interface for:
//! - validate: Run a rule set over a JSON document
//! - resolve: Resolve one attribute pattern against a JSON document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{resolve, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json_file, write_error, write_response};
