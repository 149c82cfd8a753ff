//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter that
//! hides module paths and reads its filter from `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Calls**: every call runs inside an `api_call` span carrying its path and method.
//! - **Field dispatch**: each nested dispatch opens a `field_api` span with the chain and depth.
//! - **Content store**: the actor logs startup, lookups and shutdown.
//! - **Failures**: unreadable or missing models are logged at `warn` with their key.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug cargo run     # full requests and contexts
//! RUST_LOG=content_api::fields=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a nested field call reads roughly as:
//!
//! ```text
//! INFO api_call: Call ok path="pages/trips/fields/gallery+credits" method=GET
//! DEBUG api_call:field_api: Route matched path="" pattern="" method=GET depth=1
//! ```
//!
//! Hidden content is logged the same way missing content is, so logs do not
//! reveal more than responses do.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
