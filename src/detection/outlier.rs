//! Outlier capping (winsorization) for demand series.
//!
//! Extreme values are clipped to the Tukey fences computed from the
//! interquartile range rather than removed, so the series keeps its length.

use crate::error::{ForecastError, Result};
use tracing::{debug, info};

/// Configuration for the IQR fence rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierConfig {
    /// IQR multiplier `k` in `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self { multiplier: 1.5 }
    }
}

impl OutlierConfig {
    /// IQR fences with the given multiplier (1.5 is the usual choice).
    pub fn iqr(multiplier: f64) -> Self {
        Self { multiplier }
    }

    fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "IQR multiplier must be finite and non-negative, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// Result of winsorization.
#[derive(Debug, Clone, PartialEq)]
pub struct WinsorizeResult {
    /// Clipped series, same length as the input.
    pub values: Vec<f64>,
    /// Lower fence.
    pub lower_bound: f64,
    /// Upper fence.
    pub upper_bound: f64,
    /// Number of finite values that were moved onto a fence.
    pub clipped: usize,
}

/// Quantile by linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty; `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Compute the IQR fences of the finite values in `series`.
///
/// Returns `None` when there is no finite value.
pub fn iqr_bounds(series: &[f64], multiplier: f64) -> Option<(f64, f64)> {
    let mut sorted: Vec<f64> = series.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Clip every finite value of `series` into its IQR fences.
///
/// Non-finite values pass through untouched and are never counted as clipped.
/// An input without finite values is returned unchanged with infinite bounds.
///
/// # Example
/// ```
/// use demand_forecast::detection::{winsorize, OutlierConfig};
///
/// let capped = winsorize(&[10.0, 11.0, 12.0, 13.0, 100.0], &OutlierConfig::iqr(1.5)).unwrap();
/// assert_eq!(capped.values[4], 16.0);
/// assert_eq!(capped.clipped, 1);
/// ```
pub fn winsorize(series: &[f64], config: &OutlierConfig) -> Result<WinsorizeResult> {
    config.validate()?;

    let Some((lower_bound, upper_bound)) = iqr_bounds(series, config.multiplier) else {
        debug!(len = series.len(), "no finite values, winsorization skipped");
        return Ok(WinsorizeResult {
            values: series.to_vec(),
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
            clipped: 0,
        });
    };

    let mut clipped = 0;
    let values = series
        .iter()
        .map(|&x| {
            if !x.is_finite() {
                x
            } else if x < lower_bound {
                clipped += 1;
                lower_bound
            } else if x > upper_bound {
                clipped += 1;
                upper_bound
            } else {
                x
            }
        })
        .collect();

    info!(
        lower_bound,
        upper_bound,
        clipped,
        multiplier = config.multiplier,
        "winsorization complete"
    );

    Ok(WinsorizeResult {
        values,
        lower_bound,
        upper_bound,
        clipped,
    })
}
