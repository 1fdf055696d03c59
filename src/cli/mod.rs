//! CLI command definitions for latz
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod config;
pub mod search;

use clap::{Parser, Subcommand};
use config::ConfigArgs;
use search::SearchArgs;
use std::path::PathBuf;

/// Search images across pluggable backends
#[derive(Parser, Debug)]
#[command(name = "latz", author, version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file, loaded after the home and working-directory files
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for images with every configured backend
    Search(SearchArgs),

    /// Show or change configuration
    Config(ConfigArgs),
}
