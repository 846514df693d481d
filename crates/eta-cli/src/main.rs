use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use eta_cli::commands::{averages, check, forecast, util};
use eta_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let scenario_path = |explicit: &Option<PathBuf>| {
        explicit
            .clone()
            .unwrap_or_else(|| config.scenario_path.clone())
    };

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Forecast {
            scenario,
            cycle_date,
            as_of,
            force,
            json,
        }) => {
            let options = forecast::Options {
                cycle_date: cycle_date.as_deref().map(util::parse_datetime).transpose()?,
                as_of: as_of.as_deref().map(util::parse_datetime).transpose()?,
                force: *force,
                json: *json,
            };
            forecast::run(&mut stdout, &scenario_path(scenario), options)?;
        }
        Some(Commands::Averages {
            scenario,
            cycle_date,
            json,
        }) => {
            let cycle = cycle_date.as_deref().map(util::parse_datetime).transpose()?;
            averages::run(&mut stdout, &scenario_path(scenario), cycle, *json)?;
        }
        Some(Commands::Check { scenario }) => {
            check::run(&mut stdout, &scenario_path(scenario))?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
