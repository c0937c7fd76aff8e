//! Typed failures for the fetch, estimate and aggregation stages.

use crate::core::price::Interval;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`PriceSeriesProvider`](crate::core::PriceSeriesProvider).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("credential rejected: {0}")]
    Unauthorized(String),
}

impl FetchError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) => true,
            FetchError::Http { status } => *status == 429 || *status >= 500,
            FetchError::Parse(_) | FetchError::Unauthorized(_) => false,
        }
    }

    /// Whether no further request in the same run can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Unauthorized(_))
    }
}

/// Failure of the exponent estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("insufficient data: need at least {required} prices, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("degenerate series: {0}")]
    DegenerateSeries(&'static str),

    #[error("invalid price {value} at index {index}")]
    InvalidPrice { index: usize, value: f64 },
}

/// Failure recorded in a single result table cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Estimate(#[from] EstimateError),

    #[error("skipped after a fatal provider error")]
    Aborted,
}

/// Run-level configuration problems, raised before any task is scheduled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no tickers configured")]
    EmptyTickers,

    #[error("no intervals configured")]
    EmptyIntervals,

    #[error("blank ticker in ticker list")]
    BlankTicker,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("unknown interval: {0}")]
    UnknownInterval(String),

    #[error("duplicate interval: {0}")]
    DuplicateInterval(Interval),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("worker pool size must be at least 1")]
    ZeroWorkers,

    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Violation of the one-write-per-cell rule of the result table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("no cell for {ticker} {interval}")]
    UnknownKey { ticker: String, interval: Interval },

    #[error("cell for {ticker} {interval} already recorded")]
    DuplicateKey { ticker: String, interval: Interval },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),
}
