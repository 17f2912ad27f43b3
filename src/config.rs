//! Pipeline configuration.
//!
//! A single [`ForecastConfig`] is loaded once at process start and handed to
//! each stage by reference. The on-disk layout is JSON:
//!
//! ```json
//! {
//!   "model":     { "params": { "order": [1, 1, 1], "seasonal_order": [0, 0, 0, 0] } },
//!   "splitting": { "n_splits": 5 },
//!   "params": {
//!     "minimum_length": 20,
//!     "p_value_threshold": 0.05,
//!     "winsorising_threshold": 1.5,
//!     "differencing_order": 1
//!   }
//! }
//! ```

use crate::error::{ForecastError, Result};
use crate::models::arima::SarimaOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Model orders as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Non-seasonal `(p, d, q)`.
    pub order: [usize; 3],
    /// Seasonal `(P, D, Q, s)`.
    pub seasonal_order: [usize; 4],
}

impl ModelParams {
    pub fn sarima_order(&self) -> SarimaOrder {
        let [p, d, q] = self.order;
        let [cap_p, cap_d, cap_q, s] = self.seasonal_order;
        SarimaOrder {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSection {
    pub params: ModelParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplittingSection {
    /// Number of walk-forward folds.
    pub n_splits: usize,
}

/// Preprocessing parameters for winsorization, stationarity and differencing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreprocessParams {
    /// Below this many observations the stationarity test is skipped.
    pub minimum_length: usize,
    /// ADF p-values above this mark the series non-stationary.
    pub p_value_threshold: f64,
    /// IQR multiplier for the capping bounds.
    pub winsorising_threshold: f64,
    /// Lag used by the differencer.
    #[serde(default = "default_differencing_order")]
    pub differencing_order: usize,
}

fn default_differencing_order() -> usize {
    1
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            minimum_length: 20,
            p_value_threshold: 0.05,
            winsorising_threshold: 1.5,
            differencing_order: 1,
        }
    }
}

impl PreprocessParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.p_value_threshold > 0.0 && self.p_value_threshold < 1.0) {
            return Err(ForecastError::Config(format!(
                "p_value_threshold must lie in (0, 1), got {}",
                self.p_value_threshold
            )));
        }
        if !(self.winsorising_threshold.is_finite() && self.winsorising_threshold >= 0.0) {
            return Err(ForecastError::Config(format!(
                "winsorising_threshold must be a non-negative number, got {}",
                self.winsorising_threshold
            )));
        }
        if self.differencing_order == 0 {
            return Err(ForecastError::Config(
                "differencing_order must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub model: ModelSection,
    pub splitting: SplittingSection,
    pub params: PreprocessParams,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelSection {
                params: ModelParams {
                    order: [1, 1, 1],
                    seasonal_order: [0, 0, 0, 0],
                },
            },
            splitting: SplittingSection { n_splits: 5 },
            params: PreprocessParams::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse and validate configuration from a JSON string.
    ///
    /// # Example
    /// ```
    /// use demand_forecast::config::ForecastConfig;
    ///
    /// let json = r#"{
    ///     "model": {"params": {"order": [1, 0, 0], "seasonal_order": [0, 0, 0, 0]}},
    ///     "splitting": {"n_splits": 3},
    ///     "params": {"minimum_length": 20, "p_value_threshold": 0.05, "winsorising_threshold": 1.5}
    /// }"#;
    /// let config = ForecastConfig::from_json_str(json).unwrap();
    /// assert_eq!(config.params.differencing_order, 1);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig =
            serde_json::from_str(json).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate configuration from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "loaded forecast configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.splitting.n_splits == 0 {
            return Err(ForecastError::Config(
                "splitting.n_splits must be at least 1".to_string(),
            ));
        }
        let order = self.model.params.sarima_order();
        if order.s == 1 && (order.cap_p > 0 || order.cap_d > 0 || order.cap_q > 0) {
            return Err(ForecastError::Config(
                "seasonal period must be 0 or at least 2 when seasonal orders are set".to_string(),
            ));
        }
        self.params.validate()
    }

    pub fn sarima_order(&self) -> SarimaOrder {
        self.model.params.sarima_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "model": {"params": {"order": [2, 1, 1], "seasonal_order": [1, 0, 1, 12]}},
        "splitting": {"n_splits": 4},
        "params": {
            "minimum_length": 30,
            "p_value_threshold": 0.01,
            "winsorising_threshold": 3.0,
            "differencing_order": 2
        }
    }"#;

    #[test]
    fn parses_full_config() {
        let config = ForecastConfig::from_json_str(FULL).unwrap();
        assert_eq!(config.splitting.n_splits, 4);
        assert_eq!(config.params.minimum_length, 30);
        assert_eq!(config.params.differencing_order, 2);

        let order = config.sarima_order();
        assert_eq!((order.p, order.d, order.q), (2, 1, 1));
        assert_eq!((order.cap_p, order.cap_d, order.cap_q, order.s), (1, 0, 1, 12));
    }

    #[test]
    fn missing_required_key_is_config_error() {
        let json = r#"{
            "model": {"params": {"order": [1, 1, 1]}},
            "splitting": {"n_splits": 4},
            "params": {"minimum_length": 20, "p_value_threshold": 0.05, "winsorising_threshold": 1.5}
        }"#;
        assert!(matches!(
            ForecastConfig::from_json_str(json),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn wrong_order_arity_rejected() {
        let json = FULL.replace("[2, 1, 1]", "[2, 1]");
        assert!(ForecastConfig::from_json_str(&json).is_err());
    }

    #[test]
    fn zero_splits_rejected() {
        let json = FULL.replace("\"n_splits\": 4", "\"n_splits\": 0");
        assert!(matches!(
            ForecastConfig::from_json_str(&json),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let mut params = PreprocessParams::default();
        params.p_value_threshold = 1.5;
        assert!(params.validate().is_err());

        let mut params = PreprocessParams::default();
        params.differencing_order = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let result = ForecastConfig::from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(ForecastError::Config(_))));
    }
}
