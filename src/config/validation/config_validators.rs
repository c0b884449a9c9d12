//! Core configuration validators
//!
//! This module provides validation implementations for the main gateway configuration
//! structures including GatewayConfig, ServerConfig and CorsConfig.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.storage.validate()?;
        self.auth.validate()?;
        self.rbac.validate()?;
        self.logging.validate()?;

        // A cached context must never outlive the token it was built for
        if self.rbac.cache.enabled && self.rbac.cache.ttl_seconds > self.auth.jwt_expiration {
            return Err(format!(
                "rbac.cache.ttl_seconds ({}) cannot exceed auth.jwt_expiration ({})",
                self.rbac.cache.ttl_seconds, self.auth.jwt_expiration
            ));
        }

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating server configuration");

        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
            if workers > 1000 {
                return Err("Worker count seems too high (>1000)".to_string());
            }
        }

        if self.timeout == 0 {
            return Err("Server timeout must be greater than 0".to_string());
        }

        if self.timeout > 3600 {
            return Err("Server timeout should not exceed 1 hour".to_string());
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        self.cors.validate()
    }
}

impl Validate for CorsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.allows_all_origins() && self.allow_credentials {
            return Err("CORS cannot allow all origins (*) when credentials are enabled for security reasons".to_string());
        }

        for method in &self.allowed_methods {
            if method.parse::<actix_web::http::Method>().is_err() {
                return Err(format!("Invalid CORS method: {}", method));
            }
        }

        Ok(())
    }
}
