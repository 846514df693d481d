//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Batch-pipeline ETA forecasting.
///
/// Loads a schedule scenario (enabler jobs, events, observed actual times)
/// and computes consistent estimated start/end times for every event.
#[derive(Debug, Parser)]
#[command(name = "eta", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute estimated times for every event and print the schedule.
    Forecast {
        /// Path to the scenario file (defaults to the configured one).
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Cycle date: ISO 8601, a plain date, or relative ("2 days ago").
        #[arg(long)]
        cycle_date: Option<String>,

        /// Observation instant to forecast as of (defaults to now).
        #[arg(long)]
        as_of: Option<String>,

        /// Force recalculation of cached enabler start times.
        #[arg(long)]
        force: bool,

        /// Emit the full JSON report instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Project every event onto an average day (ignores actual times).
    Averages {
        /// Path to the scenario file (defaults to the configured one).
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Cycle date: ISO 8601, a plain date, or relative ("2 days ago").
        #[arg(long)]
        cycle_date: Option<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Validate a scenario: unknown references and dependency cycles.
    Check {
        /// Path to the scenario file (defaults to the configured one).
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
}
