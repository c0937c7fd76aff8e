use super::ui;
use crate::core::config::AppConfig;
use crate::core::{PriceSeriesProvider, ResultTable, TaskKey, run_scan};
use crate::providers::fmp::FmpProvider;
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::debug;

/// Output format of the scan report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

pub async fn run(config: &AppConfig, format: ReportFormat) -> Result<()> {
    let provider = FmpProvider::from_config(&config.providers.fmp)?
        .with_retry_policy(config.retries, config.retry_delay_ms);
    let table = scan_with_progress(config, &provider).await?;

    let report = match format {
        ReportFormat::Table => render_table(&table),
        ReportFormat::Json => serde_json::to_string_pretty(&table.rows())
            .context("Failed to serialize scan results")?,
    };
    println!("{report}");
    Ok(())
}

/// Validates the configuration, then runs the scan behind a progress bar.
pub async fn scan_with_progress(
    config: &AppConfig,
    provider: &(dyn PriceSeriesProvider + Send + Sync),
) -> Result<ResultTable> {
    let request = config.scan_request()?;
    let options = config.scan_options()?;
    debug!(?request, ?options, "Scan configuration");

    let pb = ui::new_progress_bar((request.tickers.len() * request.intervals.len()) as u64)?;
    let table = run_scan(provider, &request, &options, &|key: &TaskKey| {
        pb.set_message(format!("{} {}", key.ticker, key.interval));
        pb.inc(1);
    })
    .await?;
    pb.finish_and_clear();

    Ok(table)
}

/// Tickers as rows, intervals as columns.
pub fn render_table(table: &ResultTable) -> String {
    let mut grid = ui::new_styled_table();

    let mut header = vec![ui::header_cell("Ticker")];
    for interval in table.intervals() {
        header.push(ui::header_cell(interval.as_str()));
    }
    grid.set_header(header);

    for ticker in table.tickers() {
        let mut row_cells = vec![Cell::new(ticker)];
        for interval in table.intervals() {
            let key = TaskKey {
                ticker: ticker.clone(),
                interval: *interval,
            };
            row_cells.push(table.get(&key).map_or_else(ui::na_cell, ui::result_cell));
        }
        grid.add_row(row_cells);
    }

    let failed = table.iter().filter(|(_, c)| c.result.is_err()).count();
    let mut output = format!(
        "{}\n\n{grid}",
        ui::style_text("Hurst regimes", ui::StyleType::Title)
    );
    if failed > 0 {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("{failed} of {} cells unavailable", table.capacity()),
                ui::StyleType::Error
            )
        ));
    }
    output.push_str(&format!(
        "\n{}",
        ui::style_text("TR trend-persistent, MR mean-reverting, EF efficient", ui::StyleType::Subtle)
    ));
    output
}
