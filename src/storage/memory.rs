//! In-memory authorization store
//!
//! Backs development mode and tests. Supports failure injection so callers
//! can exercise the denial-safe paths without a real datastore.

use crate::auth::audit::DenialEvent;
use crate::auth::rbac::{PermissionSnapshot, Role, Warehouse};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use super::{AssignmentStore, AuditStore, AuthorizationStore};

/// Oldest denials are dropped beyond this many
const MAX_DENIALS: usize = 10_000;

#[derive(Debug, Default)]
struct MemoryState {
    roles: HashMap<Uuid, BTreeSet<Role>>,
    warehouses: HashMap<Uuid, BTreeSet<Warehouse>>,
    snapshots: HashMap<Uuid, PermissionSnapshot>,
    denials: VecDeque<DenialEvent>,
}

/// Authorization store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read and write fail until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every read by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Number of recorded denials
    pub fn denial_count(&self) -> usize {
        self.state.read().denials.len()
    }

    /// Fails while the store is marked unavailable
    pub async fn health_check(&self) -> Result<()> {
        self.ready().await
    }

    async fn ready(&self) -> Result<()> {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::datastore_unavailable("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorizationStore for InMemoryStore {
    async fn user_roles(&self, user_id: Uuid) -> Result<Vec<Role>> {
        self.ready().await?;
        Ok(self
            .state
            .read()
            .roles
            .get(&user_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn user_warehouses(&self, user_id: Uuid) -> Result<Vec<Warehouse>> {
        self.ready().await?;
        Ok(self
            .state
            .read()
            .warehouses
            .get(&user_id)
            .map(|warehouses| warehouses.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn permission_snapshot(&self, user_id: Uuid) -> Result<Option<PermissionSnapshot>> {
        self.ready().await?;
        Ok(self.state.read().snapshots.get(&user_id).cloned())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStore {
    async fn assign_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        self.ready().await?;
        let mut state = self.state.write();
        let changed = state.roles.entry(user_id).or_default().insert(role);
        if changed {
            state.snapshots.remove(&user_id);
        }
        Ok(changed)
    }

    async fn unassign_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        self.ready().await?;
        let mut state = self.state.write();
        let changed = state
            .roles
            .get_mut(&user_id)
            .is_some_and(|roles| roles.remove(&role));
        if changed {
            state.snapshots.remove(&user_id);
        }
        Ok(changed)
    }

    async fn assign_warehouse(&self, user_id: Uuid, warehouse: Warehouse) -> Result<bool> {
        self.ready().await?;
        Ok(self
            .state
            .write()
            .warehouses
            .entry(user_id)
            .or_default()
            .insert(warehouse))
    }

    async fn unassign_warehouse(&self, user_id: Uuid, warehouse: Warehouse) -> Result<bool> {
        self.ready().await?;
        let mut state = self.state.write();
        Ok(state
            .warehouses
            .get_mut(&user_id)
            .is_some_and(|warehouses| warehouses.remove(&warehouse)))
    }

    async fn set_permission_snapshot(
        &self,
        user_id: Uuid,
        snapshot: Option<PermissionSnapshot>,
    ) -> Result<()> {
        self.ready().await?;
        let mut state = self.state.write();
        match snapshot {
            Some(snapshot) => {
                state.snapshots.insert(user_id, snapshot);
            }
            None => {
                state.snapshots.remove(&user_id);
            }
        }
        Ok(())
    }

    async fn remove_user(&self, user_id: Uuid) -> Result<()> {
        self.ready().await?;
        let mut state = self.state.write();
        state.roles.remove(&user_id);
        state.warehouses.remove(&user_id);
        state.snapshots.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn record_denial(&self, event: &DenialEvent) -> Result<()> {
        self.ready().await?;
        let mut state = self.state.write();
        if state.denials.len() >= MAX_DENIALS {
            state.denials.pop_front();
        }
        state.denials.push_back(event.clone());
        Ok(())
    }

    async fn recent_denials(&self, limit: u64) -> Result<Vec<DenialEvent>> {
        self.ready().await?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .state
            .read()
            .denials
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
