use serde::{Deserialize, Serialize};

use crate::framework::ApiError;

/// Options read by the API at call time.
///
/// ```ignore
/// let config = ApiConfig::from_json_str(r#"{ "allow_impersonation": true }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Lets an impersonated identity act instead of the authenticated one.
    pub allow_impersonation: bool,
    /// Maximum number of nested field dispatches within one call.
    pub max_field_depth: usize,
    /// Page size for field item listings when the caller sends no `limit`.
    pub default_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            allow_impersonation: false,
            max_field_depth: 8,
            default_limit: 20,
        }
    }
}

impl ApiConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ApiError> {
        let config: ApiConfig =
            serde_json::from_str(json).map_err(|e| ApiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.max_field_depth == 0 {
            return Err(ApiError::Config("max_field_depth must be at least 1".into()));
        }
        if self.default_limit == 0 {
            return Err(ApiError::Config("default_limit must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config = ApiConfig::from_json_str(r#"{ "allow_impersonation": true }"#).unwrap();
        assert!(config.allow_impersonation);
        assert_eq!(config.max_field_depth, 8);
        assert_eq!(config.default_limit, 20);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = ApiConfig::from_json_str(r#"{ "max_field_depth": 0 }"#).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            ApiConfig::from_json_str("{ allow_impersonation"),
            Err(ApiError::Config(_))
        ));
    }
}
