//! Identity token configuration

use super::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Identity token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret with the identity provider
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,
    /// Expected `iss` claim
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration: default_jwt_expiration(),
            issuer: default_issuer(),
            audience: default_audience(),
        }
    }
}

/// Warn about insecure configuration in development
pub fn warn_insecure_config(config: &AuthConfig) {
    if config.jwt_secret.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
        warn!("JWT secret looks like a passphrase; use a random secret in production");
    }
}
