//! Data repair: cleansing, continuity verification and gap imputation.

pub mod cleansing;
pub mod continuity;
pub mod imputation;
pub mod timestamp;

pub use cleansing::{cleanse, cleanse_with_format, Cleansed, CleansingReport};
pub use continuity::{check_continuity, is_continuous};
pub use imputation::{impute, impute_gaps, FillPolicy, ImputationResult};
pub use timestamp::{parse_timestamp, parse_timestamp_column, parse_timestamp_with};
