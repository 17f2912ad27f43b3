//! Stationarity testing for demand series.
//!
//! Implements the augmented Dickey-Fuller unit-root test with a constant,
//! AIC lag selection and MacKinnon approximate p-values, plus the
//! preprocessing decision built on top of it.

use crate::config::PreprocessParams;
use crate::error::{ForecastError, Result};
use crate::utils::ols::ols;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{info, warn};

/// Result of the augmented Dickey-Fuller test.
#[derive(Debug, Clone)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Number of lagged differences used.
    pub lags: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    /// Critical values for the final sample size.
    pub critical_values: CriticalValues,
    /// Best AIC found during lag selection.
    pub ic_best: f64,
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// MacKinnon (2010) finite-sample critical values, constant-only regression.
    pub fn for_sample_size(nobs: usize) -> Self {
        const TAU_C: [[f64; 4]; 3] = [
            [-3.43035, -6.5393, -16.786, -79.433],
            [-2.86154, -2.8903, -4.234, -40.04],
            [-2.56677, -1.5384, -2.809, 0.0],
        ];
        let n = nobs as f64;
        let crit = |c: &[f64; 4]| c[0] + c[1] / n + c[2] / n.powi(2) + c[3] / n.powi(3);
        Self {
            cv_1pct: crit(&TAU_C[0]),
            cv_5pct: crit(&TAU_C[1]),
            cv_10pct: crit(&TAU_C[2]),
        }
    }
}

/// Outcome of the preprocessing stationarity decision.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityDecision {
    /// Whether the ADF test actually ran to completion.
    pub tested: bool,
    /// ADF statistic, when tested.
    pub statistic: Option<f64>,
    /// ADF p-value, when tested.
    pub p_value: Option<f64>,
    /// Whether the series is treated as stationary.
    pub is_stationary: bool,
}

impl StationarityDecision {
    fn assumed_stationary() -> Self {
        Self {
            tested: false,
            statistic: None,
            p_value: None,
            is_stationary: true,
        }
    }

    /// Whether differencing should be applied.
    pub fn needs_differencing(&self) -> bool {
        !self.is_stationary
    }
}

/// MacKinnon (1994) approximate asymptotic p-value for the ADF statistic
/// with a constant and one integrated series.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefs: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefs
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * statistic + c);

    Normal::new(0.0, 1.0).map(|normal| normal.cdf(z)).unwrap_or(f64::NAN)
}

/// Augmented Dickey-Fuller test with a constant.
///
/// Regression: `dy_t = a + b*y_{t-1} + sum_i g_i*dy_{t-i} + e_t`. The number of
/// lagged differences is chosen by minimum AIC over a common sample, searching
/// `0..=max_lags` (default `ceil(12*(n/100)^(1/4))`, capped at `n/2 - 2`), and
/// the chosen regression is re-run on its full sample.
///
/// Fails on non-finite input, too-short series and degenerate regressions
/// (for example a constant series).
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> Result<AdfResult> {
    let n = series.len();
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }
    let cap = (n / 2)
        .checked_sub(2)
        .ok_or(ForecastError::InsufficientData { needed: 6, got: n })?;
    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = max_lags.unwrap_or(default_lags).min(cap);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best_lag = 0;
    let mut ic_best = f64::INFINITY;
    for lag in 0..=max_lag {
        let fit = ols(&adf_design(series, &diff, max_lag, lag), &diff[max_lag..])?;
        let aic = fit.aic();
        if aic < ic_best {
            ic_best = aic;
            best_lag = lag;
        }
    }

    let fit = ols(&adf_design(series, &diff, best_lag, best_lag), &diff[best_lag..])?;
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return Err(ForecastError::ComputationError(
            "ADF statistic is not finite".into(),
        ));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        lags: best_lag,
        nobs: fit.nobs,
        critical_values: CriticalValues::for_sample_size(fit.nobs),
        ic_best,
    })
}

/// Rows `[1, y_{t-1}, dy_{t-1}, .., dy_{t-lag}]` for `t` in `start..diff.len()`.
fn adf_design(level: &[f64], diff: &[f64], start: usize, lag: usize) -> Vec<Vec<f64>> {
    (start..diff.len())
        .map(|t| {
            let mut row = Vec::with_capacity(lag + 2);
            row.push(1.0);
            row.push(level[t]);
            row.extend((1..=lag).map(|i| diff[t - i]));
            row
        })
        .collect()
}

/// Decide whether a demand series needs differencing.
///
/// Series shorter than `minimum_length` are not tested and are treated as
/// stationary, as are series on which the test fails numerically. Otherwise
/// the series is non-stationary iff the p-value exceeds `p_value_threshold`.
pub fn check_stationarity(series: &[f64], params: &PreprocessParams) -> StationarityDecision {
    if series.len() < params.minimum_length {
        info!(
            len = series.len(),
            minimum_length = params.minimum_length,
            "series too short for ADF test, assuming stationary"
        );
        return StationarityDecision::assumed_stationary();
    }

    match adf_test(series, None) {
        Ok(adf) => {
            let is_stationary = adf.p_value <= params.p_value_threshold;
            info!(
                statistic = adf.statistic,
                p_value = adf.p_value,
                lags = adf.lags,
                is_stationary,
                "ADF test complete"
            );
            StationarityDecision {
                tested: true,
                statistic: Some(adf.statistic),
                p_value: Some(adf.p_value),
                is_stationary,
            }
        }
        Err(err) => {
            warn!(error = %err, "ADF test failed, assuming stationary");
            StationarityDecision::assumed_stationary()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5
            })
            .collect()
    }

    fn params(minimum_length: usize) -> PreprocessParams {
        PreprocessParams {
            minimum_length,
            ..PreprocessParams::default()
        }
    }

    #[test]
    fn p_value_at_five_percent_critical_value() {
        assert_relative_eq!(mackinnon_p_value(-2.86), 0.05, epsilon = 0.005);
    }

    #[test]
    fn p_value_tails() {
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-25.0), 0.0);
        assert!(mackinnon_p_value(0.0) > 0.9);
        assert!(mackinnon_p_value(f64::NAN).is_nan());
    }

    #[test]
    fn p_value_monotone() {
        let stats = [-6.0, -4.0, -3.0, -2.0, -1.61, -1.0, 0.0, 1.0, 2.0];
        for pair in stats.windows(2) {
            assert!(mackinnon_p_value(pair[0]) <= mackinnon_p_value(pair[1]));
        }
    }

    #[test]
    fn critical_values_approach_asymptotic() {
        let cv = CriticalValues::for_sample_size(1_000_000);
        assert_relative_eq!(cv.cv_5pct, -2.86154, epsilon = 1e-4);
        let small = CriticalValues::for_sample_size(50);
        assert!(small.cv_1pct < small.cv_5pct && small.cv_5pct < small.cv_10pct);
    }

    #[test]
    fn white_noise_is_stationary() {
        let series: Vec<f64> = noise(120, 7).iter().map(|e| 10.0 + e).collect();
        let adf = adf_test(&series, None).unwrap();
        assert!(adf.statistic < adf.critical_values.cv_5pct);
        assert!(adf.p_value < 0.05);
    }

    #[test]
    fn explosive_growth_is_non_stationary() {
        let series: Vec<f64> = noise(80, 3)
            .iter()
            .enumerate()
            .map(|(t, e)| 10.0 * 1.05f64.powi(t as i32) + e)
            .collect();
        let decision = check_stationarity(&series, &params(20));
        assert!(decision.tested);
        assert!(decision.needs_differencing());
    }

    #[test]
    fn default_lag_bound() {
        let series: Vec<f64> = noise(100, 11).iter().map(|e| 5.0 + e).collect();
        let adf = adf_test(&series, None).unwrap();
        assert!(adf.lags <= 12);
        assert_eq!(adf.nobs, 99 - adf.lags);
    }

    #[test]
    fn constant_series_fails_and_is_assumed_stationary() {
        let series = vec![4.0; 40];
        assert!(adf_test(&series, None).is_err());

        let decision = check_stationarity(&series, &params(20));
        assert!(!decision.tested);
        assert!(decision.is_stationary);
    }

    #[test]
    fn short_series_skipped() {
        let series: Vec<f64> = (0..10).map(|t| t as f64).collect();
        let decision = check_stationarity(&series, &params(20));
        assert_eq!(decision, StationarityDecision::assumed_stationary());
    }

    #[test]
    fn too_short_for_regression() {
        assert!(adf_test(&[1.0, 2.0, 3.0], None).is_err());
    }
}
