//! Fan-out of fetch, estimate and classify over tickers x intervals.

use crate::core::error::{ConfigError, FetchError, ScanError, TaskError};
use crate::core::hurst::hurst_exponent;
use crate::core::price::{DateRange, FetchTask, Interval, PriceSeriesProvider, TaskKey};
use crate::core::table::{HurstResult, ResultTable, TableCell};
use futures::StreamExt;
use futures::stream;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub tickers: Vec<String>,
    pub intervals: Vec<Interval>,
    pub range: DateRange,
}

impl ScanRequest {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::EmptyTickers);
        }
        if self.intervals.is_empty() {
            return Err(ConfigError::EmptyIntervals);
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.trim().is_empty() {
                return Err(ConfigError::BlankTicker);
            }
            if !seen.insert(ticker.as_str()) {
                return Err(ConfigError::DuplicateTicker(ticker.clone()));
            }
        }

        let mut seen = HashSet::new();
        for interval in &self.intervals {
            if !seen.insert(*interval) {
                return Err(ConfigError::DuplicateInterval(*interval));
            }
        }

        if self.range.start > self.range.end {
            return Err(ConfigError::InvalidDateRange {
                start: self.range.start,
                end: self.range.end,
            });
        }
        Ok(())
    }

    /// One task per (ticker, interval), tickers outermost.
    pub fn tasks(&self) -> Vec<FetchTask> {
        self.tickers
            .iter()
            .flat_map(|ticker| {
                self.intervals.iter().map(move |interval| FetchTask {
                    ticker: ticker.clone(),
                    interval: *interval,
                    start: self.range.start,
                    end: self.range.end,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum number of fetches in flight.
    pub workers: usize,
    /// Deadline for a single provider call.
    pub fetch_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl ScanOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Runs every task of `request` and returns the completed table.
///
/// Per-task failures are stored in the task's cell. A fatal provider error
/// (a rejected credential) stops further fetches; tasks not yet started are
/// recorded as [`TaskError::Aborted`]. `on_progress` runs once per recorded
/// cell.
#[instrument(
    name = "HurstScan",
    skip(provider, on_progress),
    fields(tickers = request.tickers.len(), intervals = request.intervals.len())
)]
pub async fn run_scan(
    provider: &(dyn PriceSeriesProvider + Send + Sync),
    request: &ScanRequest,
    options: &ScanOptions,
    on_progress: &(dyn Fn(&TaskKey) + Send + Sync),
) -> Result<ResultTable, ScanError> {
    request.validate()?;
    options.validate()?;

    let tasks = request.tasks();
    info!(
        tasks = tasks.len(),
        workers = options.workers,
        "Starting scan"
    );

    let aborted = AtomicBool::new(false);
    let mut table = ResultTable::new(request.tickers.clone(), request.intervals.clone());

    let mut outcomes = stream::iter(tasks)
        .map(|task| {
            let aborted = &aborted;
            async move {
                let result = if aborted.load(Ordering::SeqCst) {
                    Err(TaskError::Aborted)
                } else {
                    run_task(provider, &task, options.fetch_timeout).await
                };
                if let Err(TaskError::Fetch(e)) = &result
                    && e.is_fatal()
                    && !aborted.swap(true, Ordering::SeqCst)
                {
                    error!(ticker = %task.ticker, interval = %task.interval, error = %e, "Fatal provider error, skipping remaining tasks");
                }
                (task.key(), TableCell::new(result))
            }
        })
        .buffer_unordered(options.workers);

    // Sole writer of the table for the whole run.
    while let Some((key, cell)) = outcomes.next().await {
        table.record(&key, cell)?;
        on_progress(&key);
    }

    let failed = table.iter().filter(|(_, c)| c.result.is_err()).count();
    info!(cells = table.len(), failed, "Scan finished");
    Ok(table)
}

async fn run_task(
    provider: &(dyn PriceSeriesProvider + Send + Sync),
    task: &FetchTask,
    fetch_timeout: Duration,
) -> HurstResult {
    let series = tokio::time::timeout(fetch_timeout, provider.fetch_closes(task))
        .await
        .map_err(|_| FetchError::Timeout(fetch_timeout))
        .and_then(|fetched| fetched)
        .inspect_err(|e| {
            warn!(ticker = %task.ticker, interval = %task.interval, error = %e, "Fetch failed")
        })?;

    let exponent = hurst_exponent(&series)?;
    debug!(
        ticker = %task.ticker,
        interval = %task.interval,
        prices = series.len(),
        exponent,
        "Estimated exponent"
    );
    Ok(exponent)
}
