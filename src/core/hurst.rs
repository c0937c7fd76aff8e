//! Single-window rescaled-range (R/S) exponent.
//!
//! The whole return series is treated as one window:
//!
//! ```text
//! r[i] = p[i] / p[i-1] - 1            m = n - 1 returns
//! Y[k] = sum_{i<=k} (r[i] - mean(r))  k = 1..m
//! R    = max(Y) - min(Y)
//! S    = sample std dev of r          (divisor m - 1)
//! H    = ln(R / S) / ln(m)
//! ```
//!
//! This is not the multi-scale regression of log(R/S) against log(window);
//! `H` is not guaranteed to lie in `[0, 1]`.

use crate::core::error::EstimateError;
use crate::core::price::PriceSeries;
use tracing::trace;

/// Minimum number of prices accepted by [`hurst_exponent`].
pub const MIN_PRICES: usize = 3;

/// Dispersion at or below this is treated as zero.
const ZERO_TOLERANCE: f64 = 1e-12;

/// Simple returns of consecutive closes.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

pub fn hurst_exponent(series: &PriceSeries) -> Result<f64, EstimateError> {
    if series.len() < MIN_PRICES {
        return Err(EstimateError::InsufficientData {
            required: MIN_PRICES,
            actual: series.len(),
        });
    }

    let returns = simple_returns(series.closes());
    let m = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / m;

    let (mut cumulative, mut min_y, mut max_y) = (0.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for r in &returns {
        cumulative += r - mean;
        min_y = min_y.min(cumulative);
        max_y = max_y.max(cumulative);
    }
    let range = max_y - min_y;

    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (m - 1.0);
    let std_dev = variance.sqrt();

    // Rounding leaves residue in the returns of constant-ratio series.
    if std_dev <= ZERO_TOLERANCE {
        return Err(EstimateError::DegenerateSeries(
            "returns have zero standard deviation",
        ));
    }
    if range <= ZERO_TOLERANCE {
        return Err(EstimateError::DegenerateSeries(
            "cumulative deviations have zero range",
        ));
    }

    let exponent = (range / std_dev).ln() / m.ln();
    trace!(returns = returns.len(), range, std_dev, exponent, "R/S estimate");
    Ok(exponent)
}
