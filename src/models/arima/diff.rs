//! Differencing utilities for seasonal ARIMA models.
//!
//! Ordinary and seasonal differencing are both expressed through the lag
//! polynomial `(1 - B)^d (1 - B^s)^D`, which is applied to the training
//! series on fit and inverted on forecast.

/// Lag-`lag` difference: `y[t] - y[t - lag]`, dropping the first `lag` values.
pub fn lag_difference(series: &[f64], lag: usize) -> Vec<f64> {
    if lag == 0 {
        return series.to_vec();
    }
    if series.len() <= lag {
        return Vec::new();
    }
    series
        .iter()
        .skip(lag)
        .zip(series.iter())
        .map(|(curr, prev)| curr - prev)
        .collect()
}

/// Multiply two lag polynomials given as coefficient vectors (index = lag).
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Coefficients of `(1 - B)^d (1 - B^period)^seasonal_d`.
///
/// `coef[0]` is always 1 and the length is `d + period*seasonal_d + 1`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a differencing polynomial: `w[t] = sum_k coef[k] * y[t - k]`.
///
/// The output starts at `t = coef.len() - 1`, so it is shorter than the input
/// by the polynomial degree.
pub fn apply_polynomial(series: &[f64], coef: &[f64]) -> Vec<f64> {
    let degree = coef.len().saturating_sub(1);
    if series.len() <= degree {
        return Vec::new();
    }
    (degree..series.len())
        .map(|t| coef.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// Invert a differencing polynomial over a forecast.
///
/// Given future values `w` on the differenced scale and the history `y` on
/// the original scale, returns `y[t] = w[t] - sum_{k>=1} coef[k] * y[t - k]`
/// for each future step, feeding earlier forecasts back in.
pub fn integrate(differenced: &[f64], history: &[f64], coef: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    for &w in differenced {
        let t = extended.len();
        let carried: f64 = coef
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| if t >= k { c * extended[t - k] } else { 0.0 })
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(history.len())
}
