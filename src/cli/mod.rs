//! CLI module for rowsift
//!
//! Provides command-line interface for:
//! - run: Filter, score and sort the rows of a JSON file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{process, run, run_command, run_file, RunOptions};
pub use errors::{CliError, CliResult};
pub use io::{read_input, write_error, write_response};
