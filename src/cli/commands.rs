//! CLI command definitions using clap.
//!
//! - replay: run a recorded job history through the configured policy
//! - check: validate a configuration file and show the policy it describes

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// build-keeper - decide which CI builds to keep forever
#[derive(Parser, Debug)]
#[command(name = "build-keeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSONL build history through the configured policy
    Replay {
        /// History file, one build record per line
        history: PathBuf,

        /// Write the decided history to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start from the keep flags recorded in the file instead of clearing them
        #[arg(short, long)]
        keep_existing: bool,
    },

    /// Validate a configuration file and print its policy
    Check {
        /// Config file to check (defaults to the usual search path)
        path: Option<PathBuf>,
    },
}
