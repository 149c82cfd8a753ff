//! # Call Orchestrator
//!
//! Wires the collaborators into an [`Api`], owns the top-level route table,
//! and moves each call from a bare request to a dispatched result.

pub mod api;
pub mod config;
pub mod routes;
pub mod tracing;

pub use api::*;
pub use config::ApiConfig;
pub use routes::default_routes;
pub use self::tracing::setup_tracing;
