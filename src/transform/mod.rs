//! Transformations producing the model input column.

pub mod differencing;

pub use differencing::{diff_column_name, difference_column, Differenced, DIFF_SUFFIX};
