//! Job status record and lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two kinds of ETL job the orchestrator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Import,
    Export,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Import => write!(f, "import"),
            JobKind::Export => write!(f, "export"),
        }
    }
}

/// Lifecycle state of the orchestrator's single job slot.
///
/// `Idle --start--> Running --success--> Succeeded`
/// `Running --failure--> Failed`
/// `Succeeded | Failed --start--> Running` (new job, fresh log buffer)
///
/// There is no cancelled state: a job runs to completion or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    /// Whether the state admits a new `start` (everything but Running).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// Snapshot of the current or most recent job.
///
/// `kind`, `job_id`, and `started_at` are set from the accepted start onward;
/// `finished_at` appears on completion and `error` only when `state` is
/// [`JobState::Failed`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<JobKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    /// The initial, never-ran state.
    pub fn idle() -> Self {
        Self {
            state: JobState::Idle,
            kind: None,
            job_id: None,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Status of a freshly accepted job.
    pub(crate) fn running(kind: JobKind, job_id: Uuid) -> Self {
        Self {
            state: JobState::Running,
            kind: Some(kind),
            job_id: Some(job_id),
            started_at: Some(Utc::now()),
            finished_at: None,
            error: None,
        }
    }

    /// Whether a job currently holds the execution slot.
    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Transition to the terminal state for `outcome`, stamping `finished_at`.
    pub(crate) fn finish(&mut self, outcome: Result<(), String>) {
        self.finished_at = Some(Utc::now());
        match outcome {
            Ok(()) => self.state = JobState::Succeeded,
            Err(message) => {
                self.state = JobState::Failed;
                self.error = Some(message);
            }
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::idle()
    }
}
