//! # API Errors
//!
//! A single error type flows through the whole request path: resolution, field
//! dispatch, routing and the collaborators. Each variant knows its HTTP-style
//! status code and how to render itself as a JSON error body.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Errors that can occur while resolving or dispatching an API call.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ApiError {
    /// A resource, file, user, field or chain segment is absent, or present
    /// but not readable by the acting identity. The two cases are never told apart.
    #[error("{message}")]
    NotFound {
        key: String,
        message: String,
        data: BTreeMap<String, String>,
    },

    /// The path's kind selector matches no known resource kind.
    #[error("Invalid model type: {0}")]
    InvalidKind(String),

    #[error("No route found for path: \"{path}\" and request method: \"{method}\"")]
    RouteNotFound { path: String, method: String },

    #[error("Invalid request method: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid route pattern: {0}")]
    InvalidRoute(String),

    #[error("Field dispatch exceeded the maximum depth of {0}")]
    DepthExceeded(usize),

    #[error("Content store unavailable: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Handler error: {0}")]
    Handler(String),
}

impl ApiError {
    /// Builds a `NotFound` error with a machine-readable key and interpolation data.
    pub fn not_found<I, K, V>(key: impl Into<String>, message: impl Into<String>, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ApiError::NotFound {
            key: key.into(),
            message: message.into(),
            data: data
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn page_not_found(slug: &str) -> Self {
        Self::not_found(
            "page.notFound",
            format!("The page \"{slug}\" cannot be found"),
            [("slug", slug)],
        )
    }

    pub fn file_not_found(filename: &str) -> Self {
        Self::not_found(
            "file.notFound",
            format!("The file \"{filename}\" cannot be found"),
            [("filename", filename)],
        )
    }

    pub fn user_not_found(name: &str) -> Self {
        Self::not_found(
            "user.notFound",
            format!("The user \"{name}\" cannot be found"),
            [("name", name)],
        )
    }

    pub fn field_not_found(name: &str) -> Self {
        Self::not_found(
            "field.notFound",
            format!("The field \"{name}\" could not be found"),
            [("name", name)],
        )
    }

    /// Absent singleton or alias (`site`, `account`).
    pub fn undefined(kind: &str) -> Self {
        Self::not_found(
            format!("{kind}.undefined"),
            format!("The {kind} is undefined"),
            std::iter::empty::<(String, String)>(),
        )
    }

    /// The machine-readable key of this error.
    pub fn key(&self) -> &str {
        match self {
            ApiError::NotFound { key, .. } => key,
            ApiError::InvalidKind(_) => "error.invalidArgument",
            ApiError::RouteNotFound { .. } => "error.notFound",
            ApiError::MethodNotAllowed(_) => "error.invalidMethod",
            ApiError::InvalidRoute(_) => "error.invalidRoute",
            ApiError::DepthExceeded(_) => "error.depthExceeded",
            ApiError::Storage(_) => "error.storage",
            ApiError::Config(_) => "error.config",
            ApiError::Handler(_) => "error.handler",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } | ApiError::RouteNotFound { .. } => 404,
            ApiError::InvalidKind(_) | ApiError::InvalidRoute(_) | ApiError::DepthExceeded(_) => 400,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Storage(_) | ApiError::Config(_) | ApiError::Handler(_) => 500,
        }
    }

    /// Renders the JSON error body sent to the caller.
    pub fn to_body(&self) -> Value {
        let data = match self {
            ApiError::NotFound { data, .. } => data
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<Map<String, Value>>(),
            _ => Map::new(),
        };

        json!({
            "status": "error",
            "code": self.status_code(),
            "key": self.key(),
            "message": self.to_string(),
            "data": data,
        })
    }
}
