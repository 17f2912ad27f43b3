//! Core data structures for demand time series.

mod forecast;
pub mod frame;
mod frequency;
mod time_series;

pub use forecast::Forecast;
pub use frequency::Frequency;
pub use time_series::TimeSeries;
