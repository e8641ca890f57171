//! CLI module for build-keeper - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
