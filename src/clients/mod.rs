//! Collaborators the core consumes, and in-memory implementations of them.
//!
//! - [`ContentGraph`] - Lookup and readability ([`ContentClient`] talks to the content actor)
//! - [`FormRegistry`] - Per-request forms ([`Blueprints`])
//! - [`IdentityProvider`] - Acting identity and requested language ([`SessionIdentity`])

pub mod content_client;
pub mod form_client;
pub mod identity_client;

pub use content_client::*;
pub use form_client::*;
pub use identity_client::*;
