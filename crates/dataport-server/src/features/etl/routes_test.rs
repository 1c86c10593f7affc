//! Integration tests for ETL routes
//!
//! These tests drive the router with scripted job bodies and verify the HTTP
//! contract: 202 on acceptance, 409 while busy, 200 for log/status polls.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use dataport_etl::{EtlOrchestrator, Job, JobKind, JobLog, JobState};

    use crate::features::etl::etl_routes;

    struct FakeJob {
        kind: JobKind,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Job for FakeJob {
        fn kind(&self) -> JobKind {
            self.kind
        }

        async fn run(&self, log: &JobLog) -> anyhow::Result<()> {
            log.line("processing");
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(())
        }
    }

    fn quick(kind: JobKind) -> Arc<FakeJob> {
        Arc::new(FakeJob { kind, gate: None })
    }

    fn gated(kind: JobKind, gate: Arc<Notify>) -> Arc<FakeJob> {
        Arc::new(FakeJob {
            kind,
            gate: Some(gate),
        })
    }

    fn test_router(orchestrator: EtlOrchestrator) -> Router {
        etl_routes().with_state(orchestrator)
    }

    async fn post(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn wait_until_terminal(orchestrator: &EtlOrchestrator) {
        for _ in 0..200 {
            if orchestrator.status().state.is_terminal() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job did not reach a terminal state");
    }

    #[tokio::test]
    async fn test_import_is_accepted() {
        let orchestrator =
            EtlOrchestrator::new(quick(JobKind::Import), quick(JobKind::Export));
        let app = test_router(orchestrator.clone());

        let (status, body) = post(&app, "/import").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["message"], "import process started in background");
        // Each accepted start is identified by a valid UUID.
        body["job_id"]
            .as_str()
            .unwrap()
            .parse::<uuid::Uuid>()
            .unwrap();

        wait_until_terminal(&orchestrator).await;
    }

    #[tokio::test]
    async fn test_start_while_busy_is_conflict() {
        let gate = Arc::new(Notify::new());
        let orchestrator = EtlOrchestrator::new(
            gated(JobKind::Import, Arc::clone(&gate)),
            quick(JobKind::Export),
        );
        let app = test_router(orchestrator.clone());

        let (status, _) = post(&app, "/import").await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, body) = post(&app, "/export").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"]["message"],
            "a import job is already running"
        );
        assert_eq!(body["error"]["status"], 409);

        gate.notify_one();
        wait_until_terminal(&orchestrator).await;
    }

    #[tokio::test]
    async fn test_logs_are_200_even_when_idle() {
        let orchestrator =
            EtlOrchestrator::new(quick(JobKind::Import), quick(JobKind::Export));
        let app = test_router(orchestrator);

        let (status, body) = get(&app, "/logs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logs"], "");
    }

    #[tokio::test]
    async fn test_logs_return_job_output() {
        let orchestrator =
            EtlOrchestrator::new(quick(JobKind::Import), quick(JobKind::Export));
        let app = test_router(orchestrator.clone());

        let (status, _) = post(&app, "/import").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        wait_until_terminal(&orchestrator).await;

        let (status, body) = get(&app, "/logs").await;
        assert_eq!(status, StatusCode::OK);
        let logs = body["logs"].as_str().unwrap();
        assert!(logs.contains("processing"));
        assert!(logs.contains("import job finished"));
    }

    #[tokio::test]
    async fn test_status_reports_state() {
        let orchestrator =
            EtlOrchestrator::new(quick(JobKind::Import), quick(JobKind::Export));
        let app = test_router(orchestrator.clone());

        let (status, body) = get(&app, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "idle");

        let (status, _) = post(&app, "/export").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        wait_until_terminal(&orchestrator).await;
        assert_eq!(orchestrator.status().state, JobState::Succeeded);

        let (_, body) = get(&app, "/status").await;
        assert_eq!(body["state"], "succeeded");
        assert_eq!(body["kind"], "export");
    }
}
