//! Price series abstractions and core types

use crate::core::error::{ConfigError, EstimateError, FetchError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    OneHour,
    #[serde(rename = "4hour")]
    FourHours,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::FourHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1min",
            Interval::FiveMinutes => "5min",
            Interval::FifteenMinutes => "15min",
            Interval::ThirtyMinutes => "30min",
            Interval::OneHour => "1hour",
            Interval::FourHours => "4hour",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownInterval(s.trim().to_string()))
    }
}

/// Inclusive calendar date range shared by every task of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Identifies one cell of the result table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TaskKey {
    pub ticker: String,
    pub interval: Interval,
}

/// Immutable unit of work scheduled by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub ticker: String,
    pub interval: Interval,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchTask {
    pub fn key(&self) -> TaskKey {
        TaskKey {
            ticker: self.ticker.clone(),
            interval: self.interval,
        }
    }
}

/// Close prices in ascending chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Wraps closes that are already oldest first. Every price must be
    /// finite and strictly positive.
    pub fn new(closes: Vec<f64>) -> Result<Self, EstimateError> {
        if let Some((index, &value)) = closes
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(EstimateError::InvalidPrice { index, value });
        }
        Ok(Self { closes })
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Fetches the closes for `task`, oldest first, regardless of the
    /// source's native ordering.
    async fn fetch_closes(&self, task: &FetchTask) -> Result<PriceSeries, FetchError>;
}
