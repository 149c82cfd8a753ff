//! # Content API
//!
//! > **Path resolution and nested field dispatch for a content REST API.**
//!
//! This crate takes a request path such as `pages/blog+post-1/fields/gallery+credits/items`,
//! turns the leading part into a content model, walks the field chain through nested
//! forms, and routes whatever is left to the target field's own route table.
//!
//! ## 🏗️ Design Philosophy
//!
//! Routing is the same operation at every level. The top-level table and every field's
//! private table are both [`RouteTable`](framework::RouteTable)s, and a nested dispatch is
//! just a narrowed [`DispatchContext`](framework::DispatchContext) handed back to
//! [`route_call`](framework::route_call). Composite fields may nest to any depth without
//! the router knowing about field types.
//!
//! Hidden content and missing content are indistinguishable from the outside: the
//! resolver collapses both into the same `NotFound` error.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic router contract: request contexts, route tables, the data bag, errors.
//! - **Key items**: [`RouteHandler`](framework::RouteHandler), [`ApiError`](framework::ApiError).
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! Contextualizes each call (language, identity, translation) and dispatches it.
//! - **Key items**: [`Api`](lifecycle::Api), [`ApiConfig`](lifecycle::ApiConfig).
//!
//! ### 3. The Resolver ([`resolver`]) and the Dispatcher ([`fields`])
//! Model path classification and lookup, then the field chain walk.
//!
//! ### 4. The Interface ([`clients`]) and the Store ([`content_actor`])
//! Traits for the content graph, forms and identities, with in-memory implementations.
//! The content graph is served by an actor that owns the store.
//!
//! ### 5. The Data ([`model`])
//! Sites, pages, files, users, forms and fields.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod clients;
pub mod content_actor;
pub mod fields;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod resolver;
