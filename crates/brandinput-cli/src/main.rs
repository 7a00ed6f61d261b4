mod logging;
mod notify;
mod pipeline;
mod runner;
mod schedule;
mod sources;

use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "brandinput")]
#[command(about = "Populates measurement tickets with personnel assignments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process today's tickets once.
    Run {
        /// List matched tickets without changing them or sending email.
        #[arg(long)]
        dry_run: bool,
        /// Also log to stderr.
        #[arg(long)]
        console: bool,
    },
    /// Run on the configured weekday schedule until interrupted.
    Schedule {
        #[arg(long)]
        console: bool,
    },
    /// Validate configuration and probe the record store.
    Check,
    /// Apply database migrations for the assignments table.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = brandinput_core::load_app_config()?;

    match cli.command {
        Commands::Run { dry_run, console } => {
            // A dry run must not claim the day's log file.
            let file = if dry_run {
                None
            } else {
                let path = logging::run_log_path(
                    &config.log_dir,
                    &config.app_name,
                    Local::now().date_naive(),
                );
                Some(logging::open_run_log(&path)?)
            };
            logging::init(&config.log_level, file, console)?;
            runner::run_once(&config, dry_run).await?;
        }
        Commands::Schedule { console } => {
            let path = logging::schedule_log_path(
                &config.log_dir,
                &config.app_name,
                Local::now().naive_local(),
            );
            logging::init(&config.log_level, Some(logging::open_run_log(&path)?), console)?;
            schedule::run_scheduler(Arc::new(config)).await?;
        }
        Commands::Check => {
            logging::init(&config.log_level, None, true)?;
            runner::check_config(&config).await?;
        }
        Commands::Migrate => {
            logging::init(&config.log_level, None, true)?;
            runner::migrate(&config).await?;
        }
    }

    Ok(())
}
