//! Error types for the content actor.

use thiserror::Error;

/// Errors that can occur while talking to the content store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ContentError {
    #[error("Content actor closed")]
    ActorClosed,

    #[error("Content actor dropped response channel")]
    ActorDropped,

    /// The resource addressed by a remove request does not exist.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Accounts are aliases of the acting identity and cannot be stored.
    #[error("Cannot store an account alias: {0}")]
    NotStorable(String),
}
