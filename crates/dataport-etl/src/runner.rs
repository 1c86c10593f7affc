//! Background execution of a single accepted job
//!
//! The runner is the boundary that converts any job outcome into a terminal
//! status. Errors and panics from the job body are caught here; the slot is
//! released on every exit path, so the orchestrator can never be left stuck
//! in Running.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::job::{Job, JobLog};
use crate::orchestrator::Shared;

/// Run `job` on a background task that outlives the originating request.
pub(crate) fn spawn(job: Arc<dyn Job>, log: JobLog, shared: Arc<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let kind = job.kind();
        log.line(format!("{kind} job started"));

        let outcome = AssertUnwindSafe(job.run(&log)).catch_unwind().await;
        let result = match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(format!("{error:#}")),
            Err(panic) => Err(panic_message(panic)),
        };

        match &result {
            Ok(()) => {
                log.line(format!("{kind} job finished"));
                tracing::info!(%kind, "job finished");
            }
            Err(message) => {
                log.line(format!("{kind} job failed: {message}"));
                tracing::error!(%kind, error = %message, "job failed");
            }
        }

        // The terminal status is written after the final log line: a reader
        // that observes completion also sees the complete log.
        shared.finish(result);
    })
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("job panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("job panicked: {message}")
    } else {
        "job panicked".to_string()
    }
}
