//! Run-scoped persistence of snapshots and trained models.

use crate::error::Result;
use crate::io::table::{read_csv, write_csv};
use chrono::Utc;
use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

const RAW_DIR: &str = "raw";
const PROCESSED_DIR: &str = "processed";
const MODELS_DIR: &str = "models";

/// Artifacts of one pipeline run, laid out as
/// `<root>/{raw,processed}/<run_id>.csv` and `<root>/models/<run_id>.json`.
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
    run_id: String,
}

impl RunStore {
    pub fn new(root: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            run_id: run_id.into(),
        }
    }

    /// Store with a run id derived from the current UTC time.
    pub fn with_timestamped_run(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Self::new_run_id())
    }

    /// Run id of the form `YYYY-MM-DD_HH-MM-SS`.
    pub fn new_run_id() -> String {
        Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn raw_path(&self) -> PathBuf {
        self.artifact(RAW_DIR, "csv")
    }

    pub fn processed_path(&self) -> PathBuf {
        self.artifact(PROCESSED_DIR, "csv")
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifact(MODELS_DIR, "json")
    }

    fn artifact(&self, dir: &str, extension: &str) -> PathBuf {
        self.root.join(dir).join(format!("{}.{extension}", self.run_id))
    }

    fn prepare(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Snapshot the ingested table.
    pub fn save_raw(&self, frame: &DataFrame) -> Result<PathBuf> {
        self.save_frame(frame, self.raw_path(), "raw")
    }

    /// Snapshot the preprocessed table.
    pub fn save_processed(&self, frame: &DataFrame) -> Result<PathBuf> {
        self.save_frame(frame, self.processed_path(), "processed")
    }

    fn save_frame(&self, frame: &DataFrame, path: PathBuf, kind: &str) -> Result<PathBuf> {
        Self::prepare(&path)?;
        write_csv(frame, &path)?;
        info!(kind, path = %path.display(), rows = frame.height(), "saved snapshot");
        Ok(path)
    }

    /// Read back the processed snapshot of this run.
    pub fn load_processed(&self) -> Result<DataFrame> {
        read_csv(self.processed_path())
    }

    /// Persist a trained model as JSON.
    pub fn save_model<M: Serialize>(&self, model: &M) -> Result<PathBuf> {
        let path = self.model_path();
        Self::prepare(&path)?;
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), model)?;
        info!(path = %path.display(), "saved model");
        Ok(path)
    }

    /// Load the model persisted for this run.
    pub fn load_model<M: DeserializeOwned>(&self) -> Result<M> {
        let file = File::open(self.model_path())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
