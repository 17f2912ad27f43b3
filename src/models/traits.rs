//! Forecaster trait defining the common interface for all models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common interface for all forecasting models.
///
/// The model selector only depends on this trait, so any model that can be
/// fitted on a training window and asked for the steps that follow it can
/// take part in walk-forward validation.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Forecast exactly `horizon` steps immediately after the training window.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Fitted parameters and fit statistics.
    fn summary(&self) -> Result<ModelSummary>;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Human- and machine-readable description of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model label including its orders.
    pub model: String,
    /// Named parameter estimates.
    pub coefficients: Vec<(String, f64)>,
    /// Innovation variance.
    pub sigma2: Option<f64>,
    pub aic: Option<f64>,
    pub bic: Option<f64>,
    /// Observations contributing to the objective.
    pub nobs: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (nobs = {})", self.model, self.nobs)?;
        for (name, value) in &self.coefficients {
            writeln!(f, "  {name:<12} {value:>12.6}")?;
        }
        let opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
        write!(
            f,
            "  sigma2 = {}  AIC = {}  BIC = {}",
            opt(self.sigma2),
            opt(self.aic),
            opt(self.bic)
        )
    }
}
