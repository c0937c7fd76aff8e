use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use hurstscan::cli::scan::ReportFormat;
use hurstscan::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Estimate and classify every configured ticker and interval
    Scan {
        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Override the configured number of concurrent requests
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => hurstscan::cli::setup::setup_at_path(path),
            None => hurstscan::cli::setup::setup(),
        },
        Some(Commands::Scan { json, workers }) => {
            let format = if json {
                ReportFormat::Json
            } else {
                ReportFormat::Table
            };
            hurstscan::run_command(
                hurstscan::AppCommand::Scan { format, workers },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
