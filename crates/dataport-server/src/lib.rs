//! Dataport Server Library
//!
//! HTTP boundary for the admin console's ETL control surface.
//!
//! # Overview
//!
//! The server translates the REST endpoints the admin UI polls into calls on
//! an injected [`dataport_etl::EtlOrchestrator`]:
//!
//! - `POST /api/etl/import` / `POST /api/etl/export` — request a job start;
//!   `202 Accepted` when the slot is free, `409 Conflict` while a job runs.
//! - `GET /api/etl/logs` — snapshot of the current job log (always `200`).
//! - `GET /api/etl/status` — the current job status record.
//!
//! The orchestrator is built once at startup and handed to the router as
//! shared state; no handler blocks on a running job.

pub mod config;
pub mod features;
pub mod middleware;
