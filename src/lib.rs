pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::scan::ReportFormat;
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

/// Commands that run against a loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Scan {
        format: ReportFormat,
        workers: Option<usize>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("hurstscan starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Scan { format, workers } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            cli::scan::run(&config, format).await
        }
    }
}
