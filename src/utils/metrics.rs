//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MAE, RMSE and WMAPE computed from the same `(actual, predicted)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Weighted Mean Absolute Percentage Error, in percent (NaN if actuals sum to zero)
    pub wmape: f64,
}

impl fmt::Display for ScoreCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE = {:.4}  RMSE = {:.4}  WMAPE = {:.2}%",
            self.mae, self.rmse, self.wmape
        )
    }
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(())
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    check_lengths(actual, predicted)?;
    if actual.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    Ok(())
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    Ok(mse.sqrt())
}

/// Weighted MAPE: `sum|actual - predicted| / sum(actual) * 100`.
///
/// Actuals must be non-negative. Returns NaN when the actuals sum to zero,
/// which includes empty input.
///
/// # Example
/// ```
/// use demand_forecast::utils::metrics::wmape;
///
/// let score = wmape(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
/// assert!((score - 7.0 / 60.0 * 100.0).abs() < 1e-12);
/// ```
pub fn wmape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    if actual.iter().any(|&a| a < 0.0) {
        return Err(ForecastError::NegativeActuals);
    }

    let total: f64 = actual.iter().sum();
    if total == 0.0 {
        return Ok(f64::NAN);
    }
    let abs_error: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(abs_error / total * 100.0)
}

/// Compute the full scorecard.
///
/// All input validation happens up front, so either every metric is
/// produced or none is.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<ScoreCard> {
    check_pair(actual, predicted)?;
    if actual.iter().any(|&a| a < 0.0) {
        return Err(ForecastError::NegativeActuals);
    }
    Ok(ScoreCard {
        mae: mae(actual, predicted)?,
        rmse: rmse(actual, predicted)?,
        wmape: wmape(actual, predicted)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_forecast() {
        let actual = [3.0, 4.0, 5.0];
        let card = evaluate(&actual, &actual).unwrap();
        assert_eq!(card.mae, 0.0);
        assert_eq!(card.rmse, 0.0);
        assert_eq!(card.wmape, 0.0);
    }

    #[test]
    fn known_values() {
        let actual = [10.0, 20.0, 30.0];
        let predicted = [12.0, 18.0, 33.0];
        let card = evaluate(&actual, &predicted).unwrap();

        assert_relative_eq!(card.mae, 7.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(card.rmse, (17.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(card.wmape, 7.0 / 60.0 * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn rmse_dominates_mae() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [1.5, 1.0, 6.0, 4.0];
        assert!(rmse(&actual, &predicted).unwrap() >= mae(&actual, &predicted).unwrap());
    }

    #[test]
    fn wmape_zero_total_is_nan() {
        assert!(wmape(&[0.0, 0.0], &[1.0, 2.0]).unwrap().is_nan());
    }

    #[test]
    fn wmape_empty_input_is_nan() {
        assert!(wmape(&[], &[]).unwrap().is_nan());
    }

    #[test]
    fn wmape_rejects_negative_actuals() {
        assert!(matches!(
            wmape(&[1.0, -1.0], &[1.0, 1.0]),
            Err(ForecastError::NegativeActuals)
        ));
        assert!(matches!(
            evaluate(&[1.0, -1.0], &[1.0, 1.0]),
            Err(ForecastError::NegativeActuals)
        ));
    }

    #[test]
    fn length_mismatch() {
        for result in [
            mae(&[1.0], &[1.0, 2.0]),
            rmse(&[1.0], &[1.0, 2.0]),
            wmape(&[1.0], &[1.0, 2.0]),
        ] {
            assert!(matches!(
                result,
                Err(ForecastError::DimensionMismatch { expected: 1, got: 2 })
            ));
        }
    }

    #[test]
    fn empty_input() {
        assert!(matches!(mae(&[], &[]), Err(ForecastError::EmptyData)));
        assert!(matches!(rmse(&[], &[]), Err(ForecastError::EmptyData)));
        assert!(matches!(evaluate(&[], &[]), Err(ForecastError::EmptyData)));
    }

    #[test]
    fn display_formats_percent() {
        let card = ScoreCard {
            mae: 1.0,
            rmse: 2.0,
            wmape: 12.5,
        };
        assert_eq!(card.to_string(), "MAE = 1.0000  RMSE = 2.0000  WMAPE = 12.50%");
    }
}
