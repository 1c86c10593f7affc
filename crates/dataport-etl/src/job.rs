//! The pluggable job capability and its logging handle

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::log_buffer::LogBuffer;
use crate::status::JobKind;

/// A runnable unit of ETL work.
///
/// The orchestrator is agnostic to what a job does; it only serializes
/// execution and collects output. Kind-specific behavior lives entirely in
/// the implementations ([`crate::CsvImportJob`], [`crate::CsvExportJob`]).
///
/// Implementations should emit progress lines through [`JobLog`] as work
/// proceeds, not just at the end: the admin UI polls the log while the job is
/// running. Errors returned from `run` (and panics) are converted by the
/// runner into a failed status; they never escape the job slot.
#[async_trait]
pub trait Job: Send + Sync {
    /// Which slot of the control surface this job occupies.
    fn kind(&self) -> JobKind;

    /// Execute the job body, streaming progress lines into `log`.
    async fn run(&self, log: &JobLog) -> anyhow::Result<()>;
}

/// Handle through which a running job emits progress lines.
///
/// Each line is timestamped, appended to the job's [`LogBuffer`], and
/// mirrored to the tracing subscriber.
#[derive(Clone)]
pub struct JobLog {
    buffer: Arc<LogBuffer>,
}

impl JobLog {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }

    /// Append one progress line.
    pub fn line(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!("{message}");
        self.buffer
            .push(format!("{} - {message}", Utc::now().format("%Y-%m-%d %H:%M:%S")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_timestamped_and_ordered() {
        let buffer = Arc::new(LogBuffer::new(10));
        let log = JobLog::new(Arc::clone(&buffer));

        log.line("starting");
        log.line("done");

        let lines = buffer.snapshot();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - starting"), "got: {}", lines[0]);
        assert!(lines[1].ends_with(" - done"), "got: {}", lines[1]);
    }
}
