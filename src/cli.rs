use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rungear",
    version,
    about = "Running clothing planner driven by weather threshold rules"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend clothing for current conditions
    Now {
        /// One-shot zip code (not saved)
        #[arg(short, long)]
        zip: Option<String>,
    },
    /// Recommend clothing for a forecast hour
    Forecast {
        /// Whole hours ahead (1-24)
        #[arg(value_parser = clap::value_parser!(u32).range(1..=24))]
        hours: u32,

        /// One-shot zip code (not saved)
        #[arg(short, long)]
        zip: Option<String>,
    },
    /// Manage the saved location
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
    /// List, edit, or reset the clothing rules
    Rules {
        #[command(subcommand)]
        command: RuleCommands,
    },
    /// Re-run interactive setup
    Init,
    /// Validate config and test the weather provider
    Check,
}

#[derive(Subcommand)]
pub enum LocationCommands {
    /// Save a zip code for future runs
    Set { zip: String },
    /// Print the saved zip code
    Show,
    /// Forget the saved zip code
    Clear,
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// Print the active rules
    List,
    /// Edit the rules interactively; changes apply on save
    Edit,
    /// Restore the default rules immediately
    Reset,
}
