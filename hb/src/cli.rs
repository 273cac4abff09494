//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Homework bot - relays homework review status changes to Telegram
#[derive(Parser)]
#[command(
    name = "hb",
    about = "Polls the homework review API and relays status changes to a Telegram chat",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll forever, sending a message for every status change
    Run {
        /// Report changes since this unix timestamp instead of since startup
        #[arg(long)]
        from_date: Option<i64>,

        /// Seconds between polls
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single poll cycle and exit
    Once {
        /// Report changes since this unix timestamp instead of now
        #[arg(long)]
        from_date: Option<i64>,
    },

    /// Check that every required secret is set
    CheckConfig,

    /// List the review statuses the bot understands
    Verdicts,
}
