//! RBAC system core functionality

use crate::auth::identity::Identity;
use crate::config::RbacConfig;
use crate::storage::AuthorizationStore;
use crate::utils::error::{GatewayError, Result};
use moka::future::Cache;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::context::{AuthorizationContext, ContextBuilder, ContextResolution};
use super::matrix::PermissionMatrix;
use super::policy::PolicySet;
use super::types::Role;
use super::warehouse::WarehouseResolver;

/// Cache key: contexts never outlive the session they were built for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    user_id: Uuid,
    session_id: Option<String>,
}

impl From<&Identity> for SessionKey {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id,
            session_id: identity.session_id.clone(),
        }
    }
}

/// RBAC system: the static policy plus context resolution
#[derive(Clone)]
pub struct RbacSystem {
    config: RbacConfig,
    matrix: Arc<PermissionMatrix>,
    builder: ContextBuilder,
    cache: Option<Cache<SessionKey, AuthorizationContext>>,
    /// Bumped per user on every invalidation
    generations: Arc<Mutex<HashMap<Uuid, u64>>>,
}

impl std::fmt::Debug for RbacSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbacSystem")
            .field("global_access_roles", &self.config.global_access_roles)
            .field("cache_enabled", &self.cache.is_some())
            .finish()
    }
}

impl RbacSystem {
    /// Create the RBAC system.
    ///
    /// An incomplete matrix or a zero context timeout fails here, at startup.
    pub fn new(config: &RbacConfig, store: Arc<dyn AuthorizationStore>) -> Result<Self> {
        info!("Initializing RBAC system");

        let matrix = match &config.matrix {
            Some(grants) => PermissionMatrix::from_grants(grants.clone())?,
            None => PermissionMatrix::standard(),
        };
        matrix.validate()?;
        let matrix = Arc::new(matrix);

        if config.context_timeout_ms == 0 {
            return Err(GatewayError::config("rbac.context_timeout_ms must be positive"));
        }

        let resolver = WarehouseResolver::new(config.global_access_roles.iter().copied());
        let builder = ContextBuilder::new(
            store,
            Arc::clone(&matrix),
            resolver,
            Duration::from_millis(config.context_timeout_ms),
        );

        let cache = if config.cache.enabled {
            debug!(
                ttl_seconds = config.cache.ttl_seconds,
                max_entries = config.cache.max_entries,
                "Enabling per-session context cache"
            );
            Some(
                Cache::builder()
                    .max_capacity(config.cache.max_entries)
                    .time_to_live(Duration::from_secs(config.cache.ttl_seconds))
                    .support_invalidation_closures()
                    .build(),
            )
        } else {
            None
        };

        info!(
            global_access_roles = ?config.global_access_roles,
            "RBAC system initialized successfully"
        );

        Ok(Self {
            config: config.clone(),
            matrix,
            builder,
            cache,
            generations: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    pub fn global_access_roles(&self) -> BTreeSet<Role> {
        self.config.global_access_roles.iter().copied().collect()
    }

    pub fn builder(&self) -> &ContextBuilder {
        &self.builder
    }

    /// Resolve the context for a request identity.
    ///
    /// Cached contexts are reused for the same session; only successful
    /// builds are cached, so a datastore outage is retried on the next
    /// request rather than pinned.
    pub async fn context_for(&self, identity: Option<&Identity>) -> ContextResolution {
        let Some(identity) = identity else {
            return ContextResolution::ok(AuthorizationContext::anonymous());
        };

        let Some(cache) = &self.cache else {
            return self.builder.resolve(identity).await;
        };

        let key = SessionKey::from(identity);
        if let Some(context) = cache.get(&key).await {
            debug!(user_id = %identity.user_id, "Authorization context cache hit");
            return ContextResolution::ok(context);
        }

        // Recorded before the reads; an invalidation during the build bumps it
        let generation = self.generation(identity.user_id);
        let resolution = self.builder.resolve(identity).await;
        if !resolution.is_ok() || self.generation(identity.user_id) != generation {
            return resolution;
        }

        cache.insert(key.clone(), resolution.context.clone()).await;
        // An invalidation may have landed between the check and the insert
        if self.generation(identity.user_id) != generation {
            debug!(
                user_id = %identity.user_id,
                "Assignments changed during build, dropping cached context"
            );
            cache.invalidate(&key).await;
        }
        resolution
    }

    fn generation(&self, user_id: Uuid) -> u64 {
        self.generations.lock().get(&user_id).copied().unwrap_or(0)
    }

    /// Drop every cached context of a user. Called after any role or
    /// warehouse assignment change.
    pub fn invalidate_user(&self, user_id: Uuid) {
        let Some(cache) = &self.cache else {
            return;
        };

        {
            let mut generations = self.generations.lock();
            let generation = generations.entry(user_id).or_default();
            *generation = generation.wrapping_add(1);
        }

        match cache.invalidate_entries_if(move |key, _| key.user_id == user_id) {
            Ok(_) => debug!(%user_id, "Invalidated cached authorization contexts"),
            Err(e) => {
                // Stale grants must not survive an assignment change
                warn!(%user_id, error = %e, "Targeted invalidation failed, clearing cache");
                cache.invalidate_all();
            }
        }
    }

    /// Drop the cached context of one session
    pub async fn invalidate_session(&self, identity: &Identity) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&SessionKey::from(identity)).await;
        }
    }

    /// Storage-level policies generated from this system's matrix
    pub fn policy_set(&self) -> Result<PolicySet> {
        PolicySet::new(
            Arc::clone(&self.matrix),
            self.global_access_roles(),
            self.config.policy.clone(),
        )
    }
}
