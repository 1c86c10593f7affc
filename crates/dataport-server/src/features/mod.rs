//! Feature modules implementing the Dataport API
//!
//! Each feature is a vertical slice with its own routes. The only feature in
//! this service is the ETL control surface; the CRUD resources the admin UI
//! shows are served elsewhere.

pub mod etl;

use axum::Router;
use dataport_etl::EtlOrchestrator;

/// Creates the API router with all feature routes mounted
///
/// - `/etl` — job start, log polling, and status endpoints
pub fn router(orchestrator: EtlOrchestrator) -> Router<()> {
    Router::new().nest("/etl", etl::etl_routes().with_state(orchestrator))
}
