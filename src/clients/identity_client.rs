use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::framework::{ApiError, RequestContext};
use crate::model::User;

/// Supplies the acting identity and the requested language of a call.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The identity acting on `request`. With `allow_impersonation`, an
    /// impersonated identity takes precedence over the authenticated one.
    async fn current_identity(
        &self,
        request: &RequestContext,
        allow_impersonation: bool,
    ) -> Result<Option<User>, ApiError>;

    /// The requested display language: an explicit `language` parameter
    /// (query first, then payload) wins over the `x-language` header.
    fn requested_language(&self, request: &RequestContext) -> Option<String> {
        request
            .query("language")
            .or_else(|| request.payload().get("language").and_then(|v| v.as_str()))
            .or_else(|| request.header("x-language"))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Bearer-token sessions plus an optional impersonated identity.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    sessions: HashMap<String, User>,
    impersonated: Option<User>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as a session for `user`.
    pub fn with_session(mut self, token: impl Into<String>, user: User) -> Self {
        self.sessions.insert(token.into(), user);
        self
    }

    /// Acts as `user` whenever impersonation is allowed.
    pub fn impersonate(mut self, user: User) -> Self {
        self.impersonated = Some(user);
        self
    }

    fn authenticated(&self, request: &RequestContext) -> Option<&User> {
        let header = request.header("authorization")?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        self.sessions.get(token)
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn current_identity(
        &self,
        request: &RequestContext,
        allow_impersonation: bool,
    ) -> Result<Option<User>, ApiError> {
        if allow_impersonation {
            if let Some(user) = &self.impersonated {
                debug!(user = %user.id, "Impersonating");
                return Ok(Some(user.clone()));
            }
        }
        Ok(self.authenticated(request).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Method;
    use serde_json::json;

    fn provider() -> SessionIdentity {
        SessionIdentity::new()
            .with_session("t0k3n", User::new("editor", "e@example.com", "editor"))
            .impersonate(User::new("kirby", "kirby@example.com", "admin"))
    }

    #[tokio::test]
    async fn test_impersonation_requires_permission() {
        let request = RequestContext::new("account", Method::Get).with_header("Authorization", "Bearer t0k3n");

        let plain = provider().current_identity(&request, false).await.unwrap();
        assert_eq!(plain.map(|u| u.id), Some("editor".to_string()));

        let impersonated = provider().current_identity(&request, true).await.unwrap();
        assert_eq!(impersonated.map(|u| u.id), Some("kirby".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_token_is_anonymous() {
        let request = RequestContext::new("account", Method::Get).with_header("authorization", "Bearer nope");
        assert_eq!(provider().current_identity(&request, false).await.unwrap(), None);
    }

    #[test]
    fn test_language_prefers_explicit_parameter() {
        let p = provider();

        let request = RequestContext::new("site", Method::Get)
            .with_query("language", "de")
            .with_header("X-Language", "fr");
        assert_eq!(p.requested_language(&request).as_deref(), Some("de"));

        let mut payload = serde_json::Map::new();
        payload.insert("language".into(), json!("es"));
        let request = RequestContext::new("site", Method::Post)
            .with_payload(payload)
            .with_header("x-language", "fr");
        assert_eq!(p.requested_language(&request).as_deref(), Some("es"));

        let request = RequestContext::new("site", Method::Get).with_header("x-language", "fr");
        assert_eq!(p.requested_language(&request).as_deref(), Some("fr"));

        let request = RequestContext::new("site", Method::Get);
        assert_eq!(p.requested_language(&request), None);
    }
}
