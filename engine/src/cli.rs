//! CLI interface for Symposium
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for running debates and
//! inspecting the memory store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Symposium debate engine
///
/// Puts a question to a panel of LLM-backed philosopher personas, lets them
/// debate for a number of rounds, and closes with a summary.
#[derive(Parser, Debug)]
#[command(name = "symposium")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Debate a question (interactive prompt when no question is given)
    Ask {
        /// The question to debate
        question: Option<String>,

        /// Number of rounds (default: from config)
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Skip the closing summary
        #[arg(long)]
        no_summary: bool,

        /// Print each turn as soon as it is produced
        #[arg(long)]
        stream: bool,
    },

    /// Inspect or clear the memory store
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// List available tools
    Tools,

    /// Run system diagnostics
    Doctor,
}

/// Memory store actions
#[derive(Subcommand, Debug)]
pub enum MemoryAction {
    /// Show the newest entries
    Show {
        /// Number of entries to show (default: 10)
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Search keys and values
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Maximum number of matches (default: 10)
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show a single entry
    Get {
        /// Entry key
        key: String,
    },

    /// Remove every entry
    Clear,
}
