//! Seasonal ARIMA model fitted by conditional sum of squares.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{apply_polynomial, differencing_polynomial, integrate, poly_mul};
use crate::models::{Forecaster, ModelSummary};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::mean;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Seasonal ARIMA order `(p, d, q)(P, D, Q)[s]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub cap_p: usize,
    /// Seasonal differencing order (D)
    pub cap_d: usize,
    /// Seasonal MA order (Q)
    pub cap_q: usize,
    /// Seasonal period (s)
    pub s: usize,
}

impl SarimaOrder {
    pub fn new(p: usize, d: usize, q: usize, cap_p: usize, cap_d: usize, cap_q: usize, s: usize) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// Order without a seasonal component.
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Self {
        Self::new(p, d, q, 0, 0, 0, 0)
    }

    /// Whether the seasonal part contributes anything.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// The order actually estimated: a degenerate seasonal part is dropped.
    pub fn effective(&self) -> Self {
        if self.is_seasonal() {
            *self
        } else {
            Self::non_seasonal(self.p, self.d, self.q)
        }
    }

    /// Number of estimated mean and lag coefficients.
    pub fn num_params(&self) -> usize {
        let eff = self.effective();
        1 + eff.p + eff.q + eff.cap_p + eff.cap_q
    }

    /// Degree of the differencing polynomial.
    pub fn differencing_degree(&self) -> usize {
        let eff = self.effective();
        eff.d + eff.s * eff.cap_d
    }
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self::non_seasonal(1, 1, 1)
    }
}

impl fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SARIMA({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.cap_p, self.cap_d, self.cap_q, self.s
        )
    }
}

/// Seasonal ARIMA forecasting model.
///
/// The training series is differenced with `(1 - B)^d (1 - B^s)^D`, and the
/// result is modelled as a mean plus the multiplicative ARMA
/// `phi(B) Phi(B^s) (w_t - mu) = theta(B) Theta(B^s) e_t`. Parameters minimise the
/// conditional sum of squares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SARIMA {
    order: SarimaOrder,
    enforce_stationarity: bool,
    max_iter: usize,
    intercept: f64,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    seasonal_ar_coefficients: Vec<f64>,
    seasonal_ma_coefficients: Vec<f64>,
    /// Training series on the original scale.
    history: Option<Vec<f64>>,
    /// Training series after differencing.
    differenced: Option<Vec<f64>>,
    /// In-sample one-step predictions on the original scale, from `fit_offset`.
    fitted: Option<Vec<f64>>,
    /// Residuals aligned with `fitted`.
    residuals: Option<Vec<f64>>,
    fit_offset: usize,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
    converged: bool,
}

/// Expanded lag polynomials of a parameter vector.
struct LagPolynomials {
    /// `ar[k]` multiplies `w_{t-k} - mu`; `ar[0]` is unused.
    ar: Vec<f64>,
    /// `ma[k]` multiplies `e_{t-k}`; `ma[0]` is unused.
    ma: Vec<f64>,
}

impl SARIMA {
    /// Create a new seasonal ARIMA model.
    pub fn new(p: usize, d: usize, q: usize, cap_p: usize, cap_d: usize, cap_q: usize, s: usize) -> Self {
        Self::from_order(SarimaOrder::new(p, d, q, cap_p, cap_d, cap_q, s))
    }

    /// Create a model from an order tuple.
    pub fn from_order(order: SarimaOrder) -> Self {
        Self {
            order,
            enforce_stationarity: false,
            max_iter: 1000,
            intercept: 0.0,
            ar_coefficients: vec![],
            ma_coefficients: vec![],
            seasonal_ar_coefficients: vec![],
            seasonal_ma_coefficients: vec![],
            history: None,
            differenced: None,
            fitted: None,
            residuals: None,
            fit_offset: 0,
            residual_variance: None,
            aic: None,
            bic: None,
            converged: false,
        }
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::from_order(SarimaOrder::non_seasonal(p, d, q))
    }

    /// Restrict AR and MA coefficients to `(-0.99, 0.99)` during estimation.
    pub fn enforce_stationarity(mut self, enforce: bool) -> Self {
        self.enforce_stationarity = enforce;
        self
    }

    /// Iteration cap for the optimizer.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Get the model order as configured.
    pub fn order(&self) -> SarimaOrder {
        self.order
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar_coefficients
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma_coefficients
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> Option<f64> {
        self.residual_variance
    }

    /// Whether the optimizer converged within its iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Index of the first training observation covered by `fitted_values`.
    pub fn fit_offset(&self) -> usize {
        self.fit_offset
    }

    /// Split a flat parameter vector `[mu, phi, theta, Phi, Theta]`.
    fn unpack(order: &SarimaOrder, params: &[f64]) -> (f64, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let (p, q, cap_p) = (order.p, order.q, order.cap_p);
        let mut offset = 1;
        let mut take = |len: usize| {
            let slice = params[offset..offset + len].to_vec();
            offset += len;
            slice
        };
        let ar = take(p);
        let ma = take(q);
        let sar = take(cap_p);
        let sma = take(order.cap_q);
        (params[0], ar, ma, sar, sma)
    }

    /// Expand `phi(B) Phi(B^s)` and `theta(B) Theta(B^s)` into full lag vectors.
    fn expand(order: &SarimaOrder, ar: &[f64], ma: &[f64], sar: &[f64], sma: &[f64]) -> LagPolynomials {
        let s = order.s.max(1);
        let lag_poly = |coefs: &[f64], step: usize, sign: f64| {
            let mut poly = vec![0.0; coefs.len() * step + 1];
            poly[0] = 1.0;
            for (i, &c) in coefs.iter().enumerate() {
                poly[(i + 1) * step] = sign * c;
            }
            poly
        };

        let ar_poly = poly_mul(&lag_poly(ar, 1, -1.0), &lag_poly(sar, s, -1.0));
        let ma_poly = poly_mul(&lag_poly(ma, 1, 1.0), &lag_poly(sma, s, 1.0));

        LagPolynomials {
            ar: ar_poly.iter().map(|c| -c).collect(),
            ma: ma_poly,
        }
    }

    /// Run the ARMA recursion over `w`, returning one-step residuals.
    ///
    /// Residuals before `ar.len() - 1` are taken as zero.
    fn recursion(w: &[f64], intercept: f64, poly: &LagPolynomials) -> Vec<f64> {
        let n = w.len();
        let start = poly.ar.len() - 1;
        let mut residuals = vec![0.0; n];

        for t in start..n {
            let mut pred = intercept;
            for k in 1..poly.ar.len() {
                pred += poly.ar[k] * (w[t - k] - intercept);
            }
            for k in 1..poly.ma.len().min(t + 1) {
                pred += poly.ma[k] * residuals[t - k];
            }
            residuals[t] = w[t] - pred;
        }

        residuals
    }

    /// Conditional sum of squares; non-finite values map to `f64::MAX`.
    fn calculate_css(w: &[f64], order: &SarimaOrder, params: &[f64]) -> f64 {
        if params.iter().any(|p| !p.is_finite()) {
            return f64::MAX;
        }
        let (intercept, ar, ma, sar, sma) = Self::unpack(order, params);
        let poly = Self::expand(order, &ar, &ma, &sar, &sma);
        let start = poly.ar.len() - 1;
        if w.len() <= start {
            return f64::MAX;
        }

        let residuals = Self::recursion(w, intercept, &poly);
        let css: f64 = residuals[start..].iter().map(|e| e * e).sum();
        if css.is_finite() {
            css
        } else {
            f64::MAX
        }
    }

    /// Estimate parameters using conditional least squares.
    fn estimate_parameters(&mut self, order: &SarimaOrder, w: &[f64]) {
        let mu = mean(w);
        let n_params = order.num_params();

        if n_params == 1 {
            self.intercept = mu;
            self.ar_coefficients = vec![];
            self.ma_coefficients = vec![];
            self.seasonal_ar_coefficients = vec![];
            self.seasonal_ma_coefficients = vec![];
            self.converged = true;
            return;
        }

        let mut initial = vec![mu];
        for lags in [order.p, order.q, order.cap_p, order.cap_q] {
            initial.extend((0..lags).map(|i| 0.1 / (i + 1) as f64));
        }

        let bounds: Option<Vec<(f64, f64)>> = self.enforce_stationarity.then(|| {
            let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
            bounds.extend(std::iter::repeat((-0.99, 0.99)).take(n_params - 1));
            bounds
        });

        let config = NelderMeadConfig {
            max_iter: self.max_iter,
            tolerance: 1e-8,
            ..Default::default()
        };

        let result = nelder_mead(
            |params| Self::calculate_css(w, order, params),
            &initial,
            bounds.as_deref(),
            config,
        );

        if !result.converged {
            warn!(
                order = %self.order,
                iterations = result.iterations,
                "CSS optimisation did not converge"
            );
        }
        debug!(
            order = %self.order,
            css = result.optimal_value,
            iterations = result.iterations,
            "CSS optimisation finished"
        );

        let (intercept, ar, ma, sar, sma) = Self::unpack(order, &result.optimal_point);
        self.intercept = intercept;
        self.ar_coefficients = ar;
        self.ma_coefficients = ma;
        self.seasonal_ar_coefficients = sar;
        self.seasonal_ma_coefficients = sma;
        self.converged = result.converged;
    }

    fn polynomials(&self) -> LagPolynomials {
        Self::expand(
            &self.order.effective(),
            &self.ar_coefficients,
            &self.ma_coefficients,
            &self.seasonal_ar_coefficients,
            &self.seasonal_ma_coefficients,
        )
    }

    fn differencing_coefficients(&self) -> Vec<f64> {
        let eff = self.order.effective();
        differencing_polynomial(eff.d, eff.cap_d, eff.s)
    }

    /// Calculate fitted values, residuals and information criteria.
    fn calculate_fitted(&mut self, history: &[f64], w: &[f64]) {
        let poly = self.polynomials();
        let start = poly.ar.len() - 1;
        let degree = self.order.differencing_degree();
        let residuals = Self::recursion(w, self.intercept, &poly);

        // y_t - yhat_t equals w_t - what_t, so map predictions back through the residuals
        let residuals = residuals[start..].to_vec();
        let fitted: Vec<f64> = residuals
            .iter()
            .enumerate()
            .map(|(i, e)| history[degree + start + i] - e)
            .collect();

        let n_eff = residuals.len() as f64;
        if n_eff > 0.0 {
            let variance = residuals.iter().map(|r| r * r).sum::<f64>() / n_eff;
            self.residual_variance = Some(variance);

            let k = self.order.num_params() as f64;
            let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());
            self.aic = Some(-2.0 * ll + 2.0 * k).filter(|v| v.is_finite());
            self.bic = Some(-2.0 * ll + k * n_eff.ln()).filter(|v| v.is_finite());
        }

        self.fit_offset = degree + start;
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::from_order(SarimaOrder::default())
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        let order = self.order.effective();
        let ar_degree = order.p + order.s * order.cap_p;
        let ma_degree = order.q + order.s * order.cap_q;
        let min_len = order.differencing_degree() + ar_degree.max(ma_degree) + 2;

        if values.len() < min_len {
            return Err(ForecastError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        let w = apply_polynomial(values, &self.differencing_coefficients());
        self.estimate_parameters(&order, &w);
        self.calculate_fitted(values, &w);

        self.history = Some(values.to_vec());
        self.differenced = Some(w);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let w = self.differenced.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let poly = self.polynomials();
        let residuals = Self::recursion(w, self.intercept, &poly);

        let mut extended = w.clone();
        let mut extended_residuals = residuals;
        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for k in 1..poly.ar.len() {
                if t >= k {
                    pred += poly.ar[k] * (extended[t - k] - self.intercept);
                }
            }
            for k in 1..poly.ma.len() {
                if t >= k {
                    pred += poly.ma[k] * extended_residuals[t - k];
                }
            }
            extended.push(pred);
            extended_residuals.push(0.0);
        }

        let forecast_w = &extended[w.len()..];
        let predictions = integrate(forecast_w, history, &self.differencing_coefficients());

        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SARIMA"
    }

    fn summary(&self) -> Result<ModelSummary> {
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;
        let s = self.order.s;

        let mut coefficients = vec![("intercept".to_string(), self.intercept)];
        let mut push = |prefix: &str, step: usize, coefs: &[f64]| {
            for (i, &c) in coefs.iter().enumerate() {
                coefficients.push((format!("{prefix}.L{}", (i + 1) * step), c));
            }
        };
        push("ar", 1, &self.ar_coefficients);
        push("ma", 1, &self.ma_coefficients);
        push("ar.S", s, &self.seasonal_ar_coefficients);
        push("ma.S", s, &self.seasonal_ma_coefficients);

        Ok(ModelSummary {
            model: self.order.to_string(),
            coefficients,
            sigma2: self.residual_variance,
            aic: self.aic,
            bic: self.bic,
            nobs: residuals.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_timestamps(n: usize) -> Vec<chrono::DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::univariate(make_timestamps(values.len()), values).unwrap()
    }

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

    #[test]
    fn order_display_and_degeneracy() {
        let order = SarimaOrder::new(1, 1, 1, 1, 0, 0, 12);
        assert_eq!(order.to_string(), "SARIMA(1,1,1)(1,0,0)[12]");
        assert!(order.is_seasonal());
        assert_eq!(order.num_params(), 4);

        let degenerate = SarimaOrder::new(1, 0, 0, 1, 1, 1, 1);
        assert!(!degenerate.is_seasonal());
        assert_eq!(degenerate.effective(), SarimaOrder::non_seasonal(1, 0, 0));
        assert_eq!(degenerate.differencing_degree(), 0);
    }

    #[test]
    fn expand_multiplicative_ar() {
        // (1 - 0.5B)(1 - 0.3B^4) = 1 - 0.5B - 0.3B^4 + 0.15B^5
        let order = SarimaOrder::new(1, 0, 0, 1, 0, 0, 4);
        let poly = SARIMA::expand(&order, &[0.5], &[], &[0.3], &[]);
        assert_eq!(poly.ar.len(), 6);
        assert_relative_eq!(poly.ar[1], 0.5);
        assert_relative_eq!(poly.ar[4], 0.3);
        assert_relative_eq!(poly.ar[5], -0.15);
        assert_eq!(poly.ma, vec![1.0]);
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = SARIMA::arima(1, 0, 0);
        assert!(matches!(model.predict(3), Err(ForecastError::FitRequired)));
        assert!(matches!(model.summary(), Err(ForecastError::FitRequired)));
        assert!(!model.is_fitted());
    }

    #[test]
    fn insufficient_data() {
        let mut model = SARIMA::new(1, 1, 0, 0, 1, 0, 12);
        let result = model.fit(&series(vec![1.0; 10]));
        assert!(matches!(result, Err(ForecastError::InsufficientData { .. })));
    }

    #[test]
    fn white_noise_mean_model() {
        let values: Vec<f64> = (0..40).map(|i| 50.0 + if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut model = SARIMA::arima(0, 0, 0);
        model.fit(&series(values)).unwrap();

        assert_relative_eq!(model.intercept(), 50.0, epsilon = 1e-10);
        let forecast = model.predict(4).unwrap();
        for v in forecast.primary() {
            assert_relative_eq!(*v, 50.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn ar1_recovers_coefficient() {
        let e = noise(300, 42);
        let mut values = vec![0.0];
        for i in 1..300 {
            values.push(0.7 * values[i - 1] + e[i]);
        }
        let mut model = SARIMA::arima(1, 0, 0);
        model.fit(&series(values)).unwrap();

        assert!((model.ar_coefficients()[0] - 0.7).abs() < 0.2);
        assert_eq!(model.predict(5).unwrap().horizon(), 5);
    }

    #[test]
    fn differencing_continues_trend() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + 2.0 * i as f64).collect();
        let last = *values.last().unwrap();
        let mut model = SARIMA::arima(0, 1, 0);
        model.fit(&series(values)).unwrap();

        let forecast = model.predict(3).unwrap();
        assert_relative_eq!(forecast.primary()[0], last + 2.0, epsilon = 1e-8);
        assert_relative_eq!(forecast.primary()[2], last + 6.0, epsilon = 1e-8);
    }

    #[test]
    fn seasonal_differencing_repeats_pattern() {
        let pattern = [5.0, 9.0, 3.0, 7.0];
        let values: Vec<f64> = (0..32).map(|i| pattern[i % 4]).collect();
        let mut model = SARIMA::new(0, 0, 0, 0, 1, 0, 4);
        model.fit(&series(values)).unwrap();

        let forecast = model.predict(8).unwrap();
        for (i, v) in forecast.primary().iter().enumerate() {
            assert_relative_eq!(*v, pattern[i % 4], epsilon = 1e-8);
        }
    }

    #[test]
    fn seasonal_ar_model_fits() {
        let values: Vec<f64> = (0..96)
            .map(|i| 100.0 + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin() + (i as f64 * 0.9).cos())
            .collect();
        let mut model = SARIMA::new(1, 0, 0, 1, 0, 0, 12);
        model.fit(&series(values)).unwrap();

        assert_eq!(model.seasonal_ar_coefficients().len(), 1);
        assert!(model.sigma2().unwrap().is_finite());
        assert_eq!(model.predict(12).unwrap().horizon(), 12);
    }

    #[test]
    fn fitted_values_and_residuals_align() {
        let values: Vec<f64> = (0..60).map(|i| 20.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let mut model = SARIMA::arima(2, 1, 1);
        model.fit(&series(values.clone())).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), residuals.len());
        assert_eq!(model.fit_offset() + fitted.len(), values.len());
        for (i, (f, r)) in fitted.iter().zip(residuals).enumerate() {
            assert_relative_eq!(f + r, values[model.fit_offset() + i], epsilon = 1e-9);
        }
    }

    #[test]
    fn summary_reports_criteria() {
        let values: Vec<f64> = (0..60).map(|i| 20.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let mut model = SARIMA::new(1, 0, 1, 1, 0, 0, 6);
        model.fit(&series(values)).unwrap();

        let summary = model.summary().unwrap();
        assert_eq!(summary.model, "SARIMA(1,0,1)(1,0,0)[6]");
        let names: Vec<&str> = summary.coefficients.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["intercept", "ar.L1", "ma.L1", "ar.S.L6"]);
        assert!(summary.aic.is_some());
        assert!(summary.bic.unwrap() > summary.aic.unwrap());
    }

    #[test]
    fn serde_round_trip_preserves_forecast() {
        let values: Vec<f64> = (0..40).map(|i| 5.0 + (i as f64 * 0.5).sin()).collect();
        let mut model = SARIMA::arima(1, 1, 0);
        model.fit(&series(values)).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: SARIMA = serde_json::from_str(&json).unwrap();
        let original = model.predict(3).unwrap();
        let reloaded = restored.predict(3).unwrap();
        for (a, b) in original.primary().iter().zip(reloaded.primary()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}
