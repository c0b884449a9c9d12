//! Authorization policy configuration

use super::*;
use crate::auth::rbac::{AccessLevel, Capability, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RBAC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Roles that see every warehouse regardless of assignments
    #[serde(default = "default_global_access_roles")]
    pub global_access_roles: Vec<Role>,
    /// Replacement for the built-in permission matrix. Must be complete.
    #[serde(default)]
    pub matrix: Option<BTreeMap<Role, BTreeMap<Capability, AccessLevel>>>,
    /// Upper bound for the datastore reads of one context build
    #[serde(default = "default_context_timeout_ms")]
    pub context_timeout_ms: u64,
    /// Per-session context cache
    #[serde(default)]
    pub cache: ContextCacheConfig,
    /// Generated storage-level policies
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            global_access_roles: default_global_access_roles(),
            matrix: None,
            context_timeout_ms: default_context_timeout_ms(),
            cache: ContextCacheConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Per-session context cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextCacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Entry lifetime; may not exceed the token lifetime
    #[serde(default = "default_context_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_context_max_entries")]
    pub max_entries: u64,
}

impl Default for ContextCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_context_ttl(),
            max_entries: default_context_max_entries(),
        }
    }
}

/// Storage-level policy generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// SQL expression yielding the acting user's id inside the database
    #[serde(default = "default_user_expression")]
    pub user_expression: String,
    /// Tables receiving a row-level security policy
    #[serde(default = "default_protected_tables")]
    pub protected_tables: Vec<ProtectedTable>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            user_expression: default_user_expression(),
            protected_tables: default_protected_tables(),
        }
    }
}

/// One table guarded by a capability and partitioned by warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedTable {
    pub table: String,
    pub capability: Capability,
    #[serde(default = "default_warehouse_column")]
    pub warehouse_column: String,
    /// Column holding the creating user; enables `own_only` filtering
    #[serde(default)]
    pub owner_column: Option<String>,
}

impl ProtectedTable {
    pub fn new(table: &str, capability: Capability) -> Self {
        Self {
            table: table.to_string(),
            capability,
            warehouse_column: default_warehouse_column(),
            owner_column: None,
        }
    }

    pub fn with_owner(mut self, column: &str) -> Self {
        self.owner_column = Some(column.to_string());
        self
    }
}

fn default_global_access_roles() -> Vec<Role> {
    vec![Role::Admin, Role::GeneralManager, Role::OpsManager]
}

fn default_user_expression() -> String {
    "auth.uid()".to_string()
}

fn default_warehouse_column() -> String {
    "warehouse_code".to_string()
}

fn default_protected_tables() -> Vec<ProtectedTable> {
    vec![
        ProtectedTable::new("stock", Capability::ViewStock),
        ProtectedTable::new("transactions", Capability::ViewTransactions).with_owner("created_by"),
        ProtectedTable::new("replenishment_orders", Capability::ManageReplenishmentOrders),
    ]
}
