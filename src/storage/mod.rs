//! Storage layer for the Gateway
//!
//! Authorization data lives in four tables: role assignments, warehouse
//! assignments, optional server-computed permission snapshots and the
//! denial audit log. The traits below are the seams the authorization core
//! reads through; [`database::Database`] and [`memory::InMemoryStore`]
//! implement all of them.

/// Database storage module
pub mod database;
/// In-memory storage module
pub mod memory;

use crate::auth::audit::DenialEvent;
use crate::auth::rbac::{AccessLevel, Capability, PermissionSnapshot, Role, Warehouse};
use crate::config::StorageConfig;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use memory::InMemoryStore;

/// Reads needed to build an authorization context
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Roles held by the user
    async fn user_roles(&self, user_id: Uuid) -> Result<Vec<Role>>;

    /// Warehouses explicitly assigned to the user
    async fn user_warehouses(&self, user_id: Uuid) -> Result<Vec<Warehouse>>;

    /// Server-computed permission snapshot, if one exists
    async fn permission_snapshot(&self, user_id: Uuid) -> Result<Option<PermissionSnapshot>>;
}

/// Role and warehouse assignment mutations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Returns `false` when the role was already held
    async fn assign_role(&self, user_id: Uuid, role: Role) -> Result<bool>;

    /// Returns `false` when the role was not held
    async fn unassign_role(&self, user_id: Uuid, role: Role) -> Result<bool>;

    /// Returns `false` when the warehouse was already assigned
    async fn assign_warehouse(&self, user_id: Uuid, warehouse: Warehouse) -> Result<bool>;

    /// Returns `false` when the warehouse was not assigned
    async fn unassign_warehouse(&self, user_id: Uuid, warehouse: Warehouse) -> Result<bool>;

    /// Store or clear the server-computed snapshot for a user
    async fn set_permission_snapshot(
        &self,
        user_id: Uuid,
        snapshot: Option<PermissionSnapshot>,
    ) -> Result<()>;

    /// Remove every assignment of a deleted user
    async fn remove_user(&self, user_id: Uuid) -> Result<()>;
}

/// Denial audit persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record_denial(&self, event: &DenialEvent) -> Result<()>;

    /// Most recent denials, newest first
    async fn recent_denials(&self, limit: u64) -> Result<Vec<DenialEvent>>;
}

/// Parse stored role names, skipping names outside the closed set
pub(crate) fn parse_roles<I, S>(user_id: Uuid, names: I) -> Vec<Role>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| match name.as_ref().parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                warn!(%user_id, role = name.as_ref(), "Ignoring unknown stored role");
                None
            }
        })
        .collect()
}

/// Parse stored warehouse codes, skipping unknown codes
pub(crate) fn parse_warehouses<I, S>(user_id: Uuid, codes: I) -> Vec<Warehouse>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .filter_map(|code| match code.as_ref().parse::<Warehouse>() {
            Ok(warehouse) => Some(warehouse),
            Err(_) => {
                warn!(%user_id, warehouse = code.as_ref(), "Ignoring unknown stored warehouse");
                None
            }
        })
        .collect()
}

/// Decode a stored snapshot document.
///
/// The document must be a JSON object of capability name to access level
/// name. Unknown capabilities are skipped, so they stay denied; a document
/// of any other shape is an error.
pub(crate) fn parse_snapshot(user_id: Uuid, doc: serde_json::Value) -> Result<PermissionSnapshot> {
    let raw: BTreeMap<String, String> = serde_json::from_value(doc).map_err(|e| {
        GatewayError::internal(format!("Malformed permission snapshot for {}: {}", user_id, e))
    })?;

    let mut snapshot = PermissionSnapshot::new();
    for (name, level_name) in raw {
        let (Ok(capability), Ok(level)) =
            (name.parse::<Capability>(), level_name.parse::<AccessLevel>())
        else {
            warn!(%user_id, capability = %name, level = %level_name, "Ignoring unknown snapshot entry");
            continue;
        };
        snapshot.insert(capability, level);
    }
    Ok(snapshot)
}

/// Main storage layer: one backend behind all three store traits
#[derive(Clone)]
pub struct StorageLayer {
    pub authorization: Arc<dyn AuthorizationStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub audit: Arc<dyn AuditStore>,
    /// Present when backed by a database
    pub database: Option<Arc<database::Database>>,
    /// Present when backed by process memory
    pub memory: Option<Arc<InMemoryStore>>,
}

impl std::fmt::Debug for StorageLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLayer")
            .field("database", &self.database)
            .field("in_memory", &self.memory.is_some())
            .finish()
    }
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");

        if !config.database.enabled {
            warn!("Database disabled, authorization data is held in memory only");
            return Ok(Self::in_memory(Arc::new(InMemoryStore::new())));
        }

        debug!("Connecting to database");
        let database = Arc::new(database::Database::new(&config.database).await?);

        info!("Storage layer initialized successfully");
        Ok(Self::from_database(database))
    }

    /// Storage backed by a database
    pub fn from_database(database: Arc<database::Database>) -> Self {
        Self {
            authorization: database.clone(),
            assignments: database.clone(),
            audit: database.clone(),
            database: Some(database),
            memory: None,
        }
    }

    /// Storage backed by an in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            authorization: store.clone(),
            assignments: store.clone(),
            audit: store.clone(),
            database: None,
            memory: Some(store),
        }
    }

    /// Run database migrations; a no-op for in-memory storage
    pub async fn migrate(&self) -> Result<()> {
        match &self.database {
            Some(database) => database.migrate().await,
            None => Ok(()),
        }
    }

    /// Health check for the backing store
    pub async fn health_check(&self) -> Result<()> {
        match (&self.database, &self.memory) {
            (Some(database), _) => database.health_check().await,
            (None, Some(memory)) => memory.health_check().await,
            (None, None) => Ok(()),
        }
    }
}
