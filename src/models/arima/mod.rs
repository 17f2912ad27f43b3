//! Seasonal ARIMA models.
//!
//! This module provides:
//! - SARIMA models with seasonal components (P, D, Q)\[s\]
//! - The differencing polynomials used to fit and invert them

mod diff;
mod model;

pub use diff::{apply_polynomial, differencing_polynomial, integrate, lag_difference};
pub use model::{SarimaOrder, SARIMA};
