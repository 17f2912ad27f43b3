//! Stationarity testing.
//!
//! # Example
//!
//! ```
//! use demand_forecast::validation::adf_test;
//!
//! let series: Vec<f64> = (0..60).map(|i| ((i * 37) % 17) as f64).collect();
//! let adf = adf_test(&series, None).unwrap();
//! assert!(adf.p_value >= 0.0 && adf.p_value <= 1.0);
//! ```

pub mod stationarity;

pub use stationarity::{
    adf_test, check_stationarity, mackinnon_p_value, AdfResult, CriticalValues,
    StationarityDecision,
};
