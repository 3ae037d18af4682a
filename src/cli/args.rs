//! CLI argument definitions using clap
//!
//! Commands:
//! - wildcheck validate --data <path> --rules <path> [--config <path>] [--tables <path>]
//! - wildcheck resolve --data <path> --pattern <pattern> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wildcheck - wildcard-aware validation of JSON documents
#[derive(Parser, Debug)]
#[command(name = "wildcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a JSON document against a rule set
    Validate {
        /// JSON document to validate
        #[arg(long)]
        data: PathBuf,

        /// Rule set: {"pattern": "rule|rule:param", ...}
        #[arg(long)]
        rules: PathBuf,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Collections consulted by exists/unique: {"table": [{row}, ...]}
        #[arg(long)]
        tables: Option<PathBuf>,
    },

    /// Resolve a pattern against a JSON document
    Resolve {
        /// JSON document to read
        #[arg(long)]
        data: PathBuf,

        /// Attribute pattern, e.g. items:*:sku
        #[arg(long)]
        pattern: String,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
