//! Main gateway configuration

#![allow(missing_docs)]

use super::*;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Identity token configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Authorization policy configuration
    #[serde(default)]
    pub rbac: RbacConfig,
    /// Denial audit configuration
    #[serde(default)]
    pub audit: AuditConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the current values
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("WAREHOUSE_GATE_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("WAREHOUSE_GATE_PORT") {
            self.server.port = port.parse().map_err(|e| {
                GatewayError::Config(format!("Invalid WAREHOUSE_GATE_PORT {:?}: {}", port, e))
            })?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.storage.database.url = url;
            self.storage.database.enabled = true;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }
}
