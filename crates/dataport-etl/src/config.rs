//! ETL configuration
//!
//! Directory layout and tuning knobs for the CSV import/export jobs, loaded
//! from environment variables. Imported files are staged as `EXPORT_*.csv`
//! tables under `data_dir`; the export job publishes those tables to
//! `export_dir`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::log_buffer::DEFAULT_LOG_CAPACITY;

/// Default batch size between progress log lines during import.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// ETL job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Folder scanned for incoming `*.csv` files
    pub input_dir: PathBuf,
    /// Folder holding the staged `EXPORT_*.csv` tables
    pub data_dir: PathBuf,
    /// Folder receiving timestamped export artifacts
    pub export_dir: PathBuf,
    /// Folder receiving `{file}_rejects.csv` files for invalid rows
    pub rejects_dir: PathBuf,
    /// Rows processed between import progress lines
    pub batch_size: usize,
    /// Maximum retained log lines per job run
    pub log_capacity: usize,
}

impl EtlConfig {
    /// Load ETL configuration from environment variables
    ///
    /// - `ETL_INPUT_DIR` (default: `input`)
    /// - `ETL_DATA_DIR` (default: `data`)
    /// - `ETL_EXPORT_DIR` (default: `export`)
    /// - `ETL_REJECTS_DIR` (default: `rejects`)
    /// - `ETL_BATCH_SIZE` (default: 1000)
    /// - `ETL_LOG_CAPACITY` (default: 2000)
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            input_dir: env_path("ETL_INPUT_DIR", "input"),
            data_dir: env_path("ETL_DATA_DIR", "data"),
            export_dir: env_path("ETL_EXPORT_DIR", "export"),
            rejects_dir: env_path("ETL_REJECTS_DIR", "rejects"),
            batch_size: std::env::var("ETL_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
            log_capacity: std::env::var("ETL_LOG_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_LOG_CAPACITY),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("ETL_BATCH_SIZE must be greater than 0");
        }
        if self.log_capacity == 0 {
            anyhow::bail!("ETL_LOG_CAPACITY must be greater than 0");
        }
        if self.input_dir == self.data_dir {
            anyhow::bail!("ETL_INPUT_DIR and ETL_DATA_DIR must differ");
        }
        Ok(())
    }

    /// Create the configured directories if they do not exist yet
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            &self.input_dir,
            &self.data_dir,
            &self.export_dir,
            &self.rejects_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            data_dir: PathBuf::from("data"),
            export_dir: PathBuf::from("export"),
            rejects_dir: PathBuf::from("rejects"),
            batch_size: DEFAULT_BATCH_SIZE,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
