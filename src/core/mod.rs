//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod hurst;
pub mod log;
pub mod orchestrator;
pub mod price;
pub mod regime;
pub mod table;

// Re-export main types for cleaner imports
pub use error::{ConfigError, EstimateError, FetchError, ScanError, TableError, TaskError};
pub use orchestrator::{ScanOptions, ScanRequest, run_scan};
pub use price::{DateRange, FetchTask, Interval, PriceSeries, PriceSeriesProvider, TaskKey};
pub use regime::{Classification, Regime};
pub use table::{HurstResult, ResultTable, TableCell, TableRow};
