//! Ingestion and persistence collaborators.

pub mod store;
pub mod table;

pub use store::RunStore;
pub use table::{read_csv, read_csv_from, write_csv, write_csv_to};
