//! ETL control surface feature
//!
//! Routes for triggering import/export jobs and polling their progress.

pub mod routes;

#[cfg(test)]
mod routes_test;

pub use routes::etl_routes;
