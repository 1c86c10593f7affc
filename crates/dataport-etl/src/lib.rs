//! Dataport ETL Core
//!
//! The job orchestration core behind the admin console's ETL control surface.
//!
//! # Overview
//!
//! Long-running import/export operations are executed as background jobs,
//! serialized so that at most one runs at any instant. Their output
//! accumulates in a bounded in-memory log that clients poll while the job
//! proceeds.
//!
//! - [`EtlOrchestrator`] owns the single execution slot and exposes the
//!   `start` / `status` / `read_log` operations consumed by the HTTP layer.
//! - [`Job`] is the pluggable unit of work; [`CsvImportJob`] and
//!   [`CsvExportJob`] are the two shipped implementations.
//! - [`LogBuffer`] is the bounded, thread-safe line buffer holding the
//!   current (or most recent) job's output.
//!
//! The orchestrator is an explicitly constructed component with no global
//! state: build one at startup and hand it to the HTTP layer as shared state.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dataport_etl::{CsvExportJob, CsvImportJob, EtlConfig, EtlOrchestrator, JobKind};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EtlConfig::from_env()?;
//! let orchestrator = EtlOrchestrator::new(
//!     Arc::new(CsvImportJob::new(config.clone())),
//!     Arc::new(CsvExportJob::new(config.clone())),
//! );
//!
//! let started = orchestrator.start(JobKind::Import)?;
//! tracing::info!(job_id = %started.job_id, "import accepted");
//! # Ok(())
//! # }
//! ```

pub mod config;
mod csv;
pub mod export;
pub mod import;
pub mod job;
pub mod log_buffer;
pub mod orchestrator;
mod runner;
pub mod status;

// Re-export commonly used types
pub use config::EtlConfig;
pub use export::CsvExportJob;
pub use import::CsvImportJob;
pub use job::{Job, JobLog};
pub use log_buffer::{LogBuffer, DEFAULT_LOG_CAPACITY};
pub use orchestrator::{EtlOrchestrator, StartError, StartedJob};
pub use status::{JobKind, JobState, JobStatus};
