use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logger::init_tracing;

mod agent;
mod output;

use xrmon::config::Config;

#[derive(Parser)]
#[command(name = "xrmon-service", version, about = "X-Road service monitoring agent")]
struct Cli {
    /// Path to the TOML config file (created with defaults if missing)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the monitoring agent (default)
    Run,
    /// Probe every configured service once and print the results
    Check,
    /// Show the latest stored status of each service
    Status,
    /// Show recent check results for one service
    History {
        /// Subsystem identifier, e.g. GOV/12345678/TestSystem
        #[arg(short = 's', long)]
        subsystem: String,
        /// Service code
        #[arg(short = 'S', long)]
        service: String,
        /// Number of results to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_ref())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => agent::run(config).await,
        Command::Check => agent::check_once(config).await,
        Command::Status => agent::show_status(config).await,
        Command::History { subsystem, service, limit } => {
            agent::show_history(config, subsystem, service, limit).await
        }
        Command::Config => {
            print!("{config}");
            Ok(())
        }
    }
}
