//! Generic routing framework for API calls.
//!
//! This module provides the plumbing every call rides on: request contexts,
//! placeholder route tables, narrowed dispatch contexts and the error type.
//!
//! # Main Components
//!
//! - [`RequestContext`] - One inbound call, immutable once dispatch starts
//! - [`RouteTable`] / [`Route`] / [`RouteHandler`] - Pattern routing
//! - [`DispatchContext`] - A request narrowed to one route table
//! - [`route_call`] - The generic router entry point
//! - [`ApiError`] - Common error type with status codes
//!
//! # Testing
//!
//! See [`mock`] module for a scripted route handler.

pub mod core;
pub mod error;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
pub use error::ApiError;
pub use mock::MockHandler;
