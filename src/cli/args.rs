//! CLI argument definitions using clap
//!
//! Commands:
//! - rowsift run --input <path> [--config <path>] [--filter <pattern>]...
//!   [--fulltext <column:weight:term>]... [--sort <column[:dir]>]... [--ids]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowsift - filter, score and sort result rows
#[derive(Parser, Debug)]
#[command(name = "rowsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run rows from a JSON file through the filter and sort pipeline
    Run {
        /// JSON array of rows (objects or scalars); "-" reads stdin
        #[arg(long)]
        input: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Filter pattern, e.g. "console = nintendo" (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Fulltext pattern as column:weight:term (repeatable)
        #[arg(long = "fulltext")]
        fulltext: Vec<String>,

        /// Sort key as column or column:asc|desc (repeatable)
        #[arg(long = "sort")]
        sorts: Vec<String>,

        /// Print only the id column
        #[arg(long)]
        ids: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
