//! Maps an exponent to a market regime label.

use crate::core::table::HurstResult;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Regime {
    #[serde(rename = "TR")]
    TrendPersistent,
    #[serde(rename = "MR")]
    MeanReverting,
    #[serde(rename = "EF")]
    Efficient,
}

impl Regime {
    pub fn code(&self) -> &'static str {
        match self {
            Regime::TrendPersistent => "TR",
            Regime::MeanReverting => "MR",
            Regime::Efficient => "EF",
        }
    }
}

impl Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A regime, or the reason none could be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Regime(Regime),
    Unavailable(String),
}

impl Classification {
    pub fn regime(&self) -> Option<Regime> {
        match self {
            Classification::Regime(regime) => Some(*regime),
            Classification::Unavailable(_) => None,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Regime(regime) => write!(f, "{regime}"),
            Classification::Unavailable(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}

/// Exact comparison against 0.5; only 0.5 itself is efficient.
pub fn classify(exponent: f64) -> Regime {
    if exponent > 0.5 {
        Regime::TrendPersistent
    } else if exponent < 0.5 {
        Regime::MeanReverting
    } else {
        Regime::Efficient
    }
}

pub fn classify_result(result: &HurstResult) -> Classification {
    match result {
        Ok(exponent) => Classification::Regime(classify(*exponent)),
        Err(e) => Classification::Unavailable(e.to_string()),
    }
}
