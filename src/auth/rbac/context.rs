//! Authorization context building
//!
//! A context bundles everything a guard needs to decide: the user's roles,
//! effective permissions and accessible warehouses. Contexts are derived
//! per request (or per session through the cache in [`super::RbacSystem`])
//! and never persisted.

use crate::auth::identity::Identity;
use crate::storage::AuthorizationStore;
use crate::utils::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::matrix::PermissionMatrix;
use super::merge::{EffectivePermissions, PermissionSnapshot, merge_roles};
use super::types::{Role, Warehouse};
use super::warehouse::{WarehouseAccess, WarehouseResolver};

/// Where the effective permissions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// Server-authoritative snapshot, used whole
    Snapshot,
    /// Local merge of the held roles
    Merged,
    /// No identity was available
    Anonymous,
    /// The datastore could not be read; everything is denied
    Unavailable,
}

/// Per-request authorization bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationContext {
    pub user_id: Option<Uuid>,
    pub roles: BTreeSet<Role>,
    pub permissions: EffectivePermissions,
    #[serde(flatten)]
    pub warehouses: WarehouseAccess,
    pub source: PermissionSource,
    pub issued_at: DateTime<Utc>,
}

impl AuthorizationContext {
    /// Context for a request without identity
    pub fn anonymous() -> Self {
        Self::empty(None, PermissionSource::Anonymous)
    }

    /// Denial-safe context used when the datastore fails
    pub fn unavailable(user_id: Uuid) -> Self {
        Self::empty(Some(user_id), PermissionSource::Unavailable)
    }

    fn empty(user_id: Option<Uuid>, source: PermissionSource) -> Self {
        Self {
            user_id,
            roles: BTreeSet::new(),
            permissions: EffectivePermissions::empty(),
            warehouses: WarehouseAccess::none(),
            source,
            issued_at: Utc::now(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Built from a failed datastore read
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, PermissionSource::Unavailable)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn can_access_warehouse(&self, warehouse: Warehouse) -> bool {
        self.warehouses.contains(warehouse)
    }
}

/// Outcome of a context build: always a usable context, plus the error
/// that forced it to the denial-safe form, if any
#[derive(Debug)]
pub struct ContextResolution {
    pub context: AuthorizationContext,
    pub error: Option<GatewayError>,
}

impl ContextResolution {
    pub fn ok(context: AuthorizationContext) -> Self {
        Self {
            context,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Collapse into a `Result`, discarding the denial-safe context on error
    pub fn into_result(self) -> Result<AuthorizationContext> {
        match self.error {
            None => Ok(self.context),
            Some(err) => Err(err),
        }
    }
}

/// Loads assignments and derives contexts
#[derive(Clone)]
pub struct ContextBuilder {
    store: Arc<dyn AuthorizationStore>,
    matrix: Arc<PermissionMatrix>,
    resolver: WarehouseResolver,
    timeout: Duration,
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("resolver", &self.resolver)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ContextBuilder {
    pub fn new(
        store: Arc<dyn AuthorizationStore>,
        matrix: Arc<PermissionMatrix>,
        resolver: WarehouseResolver,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            matrix,
            resolver,
            timeout,
        }
    }

    /// Build a context, reporting authentication and datastore failures as errors
    pub async fn build(&self, identity: Option<&Identity>) -> Result<AuthorizationContext> {
        match identity {
            None => Err(GatewayError::authentication_required()),
            Some(identity) => self.resolve(identity).await.into_result(),
        }
    }

    /// Fetch roles, warehouse assignments and the optional snapshot
    /// concurrently, then derive the context.
    ///
    /// One attempt only. A failed or timed out read produces the
    /// denial-safe context, never a permissive one.
    pub async fn resolve(&self, identity: &Identity) -> ContextResolution {
        let user_id = identity.user_id;
        debug!(%user_id, "Building authorization context");

        let reads = async {
            tokio::try_join!(
                self.store.user_roles(user_id),
                self.store.user_warehouses(user_id),
                self.store.permission_snapshot(user_id),
            )
        };

        let failure = match tokio::time::timeout(self.timeout, reads).await {
            Ok(Ok((roles, warehouses, snapshot))) => {
                let context = self.assemble(user_id, roles, &warehouses, snapshot);
                return ContextResolution::ok(context);
            }
            Ok(Err(e)) => format!("authorization read failed: {}", e),
            Err(_) => format!(
                "authorization read timed out after {}ms",
                self.timeout.as_millis()
            ),
        };

        warn!(%user_id, error = %failure, "Falling back to denial-safe context");
        ContextResolution {
            context: AuthorizationContext::unavailable(user_id),
            error: Some(GatewayError::DatastoreUnavailable(failure)),
        }
    }

    /// Derive a context from already-fetched assignments.
    ///
    /// A present, non-empty snapshot is used whole; otherwise the roles are
    /// merged locally. The two are never mixed.
    pub fn assemble(
        &self,
        user_id: Uuid,
        roles: Vec<Role>,
        warehouses: &[Warehouse],
        snapshot: Option<PermissionSnapshot>,
    ) -> AuthorizationContext {
        let roles: BTreeSet<Role> = roles.into_iter().collect();

        let (permissions, source) = match snapshot {
            Some(snapshot) if !snapshot.is_empty() => (
                EffectivePermissions::from_snapshot(snapshot),
                PermissionSource::Snapshot,
            ),
            _ => (merge_roles(&self.matrix, &roles), PermissionSource::Merged),
        };

        let warehouses = self.resolver.resolve(&roles, warehouses);

        debug!(
            %user_id,
            roles = roles.len(),
            warehouses = warehouses.warehouses.len(),
            global = warehouses.has_global_access,
            ?source,
            "Authorization context built"
        );

        AuthorizationContext {
            user_id: Some(user_id),
            roles,
            permissions,
            warehouses,
            source,
            issued_at: Utc::now(),
        }
    }
}
