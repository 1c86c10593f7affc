//! Dataport Server - Main entry point

use anyhow::Result;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use dataport_common::logging::{init_logging, LogConfig};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use dataport_etl::{CsvExportJob, CsvImportJob, EtlOrchestrator};
use dataport_server::{config::Config, features, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::from_env()
        .unwrap_or_default()
        .with_file_prefix("dataport-server")
        .with_filter_directives("dataport_server=debug,dataport_etl=debug,tower_http=debug");

    init_logging(&log_config)?;

    info!("Starting Dataport Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // The job folders must exist before the first start request arrives
    config.etl.ensure_directories()?;
    info!(
        input = %config.etl.input_dir.display(),
        export = %config.etl.export_dir.display(),
        "ETL directories ready"
    );

    // Build the orchestrator with the two CSV job bodies
    let orchestrator = EtlOrchestrator::new(
        Arc::new(CsvImportJob::new(config.etl.clone())),
        Arc::new(CsvExportJob::new(config.etl.clone())),
    )
    .with_log_capacity(config.etl.log_capacity);

    // Build the application router
    let app = create_router(orchestrator, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(orchestrator: EtlOrchestrator, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", features::router(orchestrator))
        // Apply layers from innermost to outermost
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete; a running job is detached
    // and finishes on its own if the process stays up long enough.
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
