//! Single-flight job orchestrator
//!
//! Owns one execution slot shared by the import and export jobs. `start` is
//! the only state transition callers can drive; everything else is a
//! non-blocking snapshot read. The Idle/terminal -> Running transition is
//! serialized by a single write lock over the status record, so two
//! concurrent `start` calls can never both succeed.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::job::{Job, JobLog};
use crate::log_buffer::{LogBuffer, DEFAULT_LOG_CAPACITY};
use crate::runner;
use crate::status::{JobKind, JobStatus};

/// Error returned when a start request is rejected.
///
/// Busy is client-retriable: no queuing or preemption happens, the caller
/// retries once the running job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("a {running} job is already running")]
    Busy { running: JobKind },
}

/// Receipt for an accepted start.
///
/// The job proceeds independently of the caller; `handle` completes when the
/// runner has written the terminal status (useful in tests and at shutdown,
/// the HTTP layer ignores it).
pub struct StartedJob {
    pub job_id: Uuid,
    pub kind: JobKind,
    pub handle: JoinHandle<()>,
}

/// State shared between the orchestrator and the spawned runner task.
pub(crate) struct Shared {
    status: RwLock<JobStatus>,
    buffer: RwLock<Arc<LogBuffer>>,
}

impl Shared {
    /// Write the terminal status for the finished job and release the slot.
    ///
    /// Called by the runner after its final log line so that a reader which
    /// observes a terminal state also sees the complete log.
    pub(crate) fn finish(&self, outcome: Result<(), String>) {
        self.status
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .finish(outcome);
    }
}

/// The ETL control surface: one job slot, one log buffer.
///
/// Cheap to clone; all clones share the same slot. Construct once at process
/// startup and inject into the HTTP layer.
#[derive(Clone)]
pub struct EtlOrchestrator {
    shared: Arc<Shared>,
    import_job: Arc<dyn Job>,
    export_job: Arc<dyn Job>,
    log_capacity: usize,
}

impl EtlOrchestrator {
    /// Create an orchestrator with the given job bodies and the default log
    /// capacity.
    pub fn new(import_job: Arc<dyn Job>, export_job: Arc<dyn Job>) -> Self {
        Self {
            shared: Arc::new(Shared {
                status: RwLock::new(JobStatus::idle()),
                buffer: RwLock::new(Arc::new(LogBuffer::new(DEFAULT_LOG_CAPACITY))),
            }),
            import_job,
            export_job,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Override the per-job log buffer capacity.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Request execution of the job registered for `kind`.
    ///
    /// Rejects with [`StartError::Busy`] while any job is running, regardless
    /// of kind. On acceptance the log buffer is replaced wholesale, the
    /// status flips to Running, and the job body is handed to a background
    /// runner; the call returns without waiting for the job.
    pub fn start(&self, kind: JobKind) -> Result<StartedJob, StartError> {
        let job = match kind {
            JobKind::Import => Arc::clone(&self.import_job),
            JobKind::Export => Arc::clone(&self.export_job),
        };

        let job_id = Uuid::new_v4();
        let buffer = {
            let mut status = self
                .shared
                .status
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if status.is_running() {
                return Err(StartError::Busy {
                    running: status.kind.unwrap_or(kind),
                });
            }

            let buffer = Arc::new(LogBuffer::new(self.log_capacity));
            *self
                .shared
                .buffer
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&buffer);
            *status = JobStatus::running(kind, job_id);
            buffer
        };

        tracing::info!(%kind, %job_id, "job accepted");
        let handle = runner::spawn(job, JobLog::new(buffer), Arc::clone(&self.shared));

        Ok(StartedJob {
            job_id,
            kind,
            handle,
        })
    }

    /// Non-blocking snapshot of the current status.
    pub fn status(&self) -> JobStatus {
        self.shared
            .status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Non-blocking snapshot of the current log lines, in append order.
    ///
    /// May be a partial view while a job is running; repeated calls are
    /// idempotent reads.
    pub fn read_log(&self) -> Vec<String> {
        self.current_buffer().snapshot()
    }

    /// The log snapshot joined with newlines, as served to polling clients.
    pub fn log_text(&self) -> String {
        self.current_buffer().to_text()
    }

    fn current_buffer(&self) -> Arc<LogBuffer> {
        Arc::clone(
            &self
                .shared
                .buffer
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}
