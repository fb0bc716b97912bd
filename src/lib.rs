//! Core library for the Agent Desk dashboard service.
//!
//! The `dashboard` module holds the pure domain logic (credentials, sessions,
//! listing catalog, ROI projection, contact handling) plus the HTTP router
//! that adapts it; `config`, `telemetry`, and `error` carry the service
//! plumbing.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod telemetry;
