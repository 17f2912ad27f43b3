//! Forecast result structure for holding predictions.

/// Point predictions for the steps following a training window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { point: values }
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions in chronological order.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Consume the forecast, keeping only the point predictions.
    pub fn into_values(self) -> Vec<f64> {
        self.point
    }
}
