//! Authentication configuration validators
//!
//! This module provides validation implementations for the identity token
//! and RBAC configuration structures.

use super::trait_def::Validate;
use crate::auth::rbac::{PermissionMatrix, is_sql_identifier};
use crate::config::models::*;
use std::collections::BTreeSet;
use tracing::debug;

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating auth configuration");

        if self.jwt_secret.is_empty() {
            return Err("JWT secret cannot be empty".to_string());
        }

        if self.jwt_secret.len() < 32 {
            return Err("JWT secret should be at least 32 characters long".to_string());
        }

        if self.jwt_expiration == 0 {
            return Err("JWT expiration must be greater than 0".to_string());
        }

        if self.jwt_expiration > 86400 * 30 {
            // 30 days
            return Err("JWT expiration should not exceed 30 days".to_string());
        }

        if self.issuer.is_empty() || self.audience.is_empty() {
            return Err("JWT issuer and audience cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for RbacConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating RBAC configuration");

        let mut seen = BTreeSet::new();
        for role in &self.global_access_roles {
            if !seen.insert(role) {
                return Err(format!("Duplicate global access role: {}", role));
            }
        }

        if let Some(grants) = &self.matrix {
            PermissionMatrix::from_grants(grants.clone()).map_err(|e| e.to_string())?;
        }

        if self.context_timeout_ms == 0 {
            return Err("RBAC context timeout must be greater than 0".to_string());
        }

        if self.cache.enabled {
            if self.cache.ttl_seconds == 0 {
                return Err("Context cache TTL must be greater than 0".to_string());
            }
            if self.cache.max_entries == 0 {
                return Err("Context cache max entries must be greater than 0".to_string());
            }
        }

        self.policy.validate()
    }
}

impl Validate for PolicyConfig {
    fn validate(&self) -> Result<(), String> {
        if self.user_expression.trim().is_empty() {
            return Err("Policy user expression cannot be empty".to_string());
        }

        let mut tables = BTreeSet::new();
        for table in &self.protected_tables {
            if !tables.insert(&table.table) {
                return Err(format!("Duplicate protected table: {}", table.table));
            }
            let columns = std::iter::once(&table.table)
                .chain(std::iter::once(&table.warehouse_column))
                .chain(table.owner_column.iter());
            for name in columns {
                if !is_sql_identifier(name) {
                    return Err(format!("Invalid SQL identifier: {:?}", name));
                }
            }
        }

        Ok(())
    }
}
