//! Authentication and authorization system
//!
//! Identity comes in as a verified token; authorization decisions come out
//! of the RBAC core. Denials at the API boundary are audited.

pub mod audit;
pub mod identity;
pub mod rbac;

pub use audit::{AuditReporter, ClientMetadata, DenialEvent};
pub use identity::{Identity, JwtHandler};

use crate::config::{AuditConfig, AuthConfig, RbacConfig};
use crate::storage::StorageLayer;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use rbac::{ContextResolution, RbacSystem};

/// Main authentication system
#[derive(Debug, Clone)]
pub struct AuthSystem {
    /// JWT handler
    jwt: Arc<JwtHandler>,
    /// RBAC system
    rbac: Arc<RbacSystem>,
    /// Denial reporter
    audit: Arc<AuditReporter>,
}

impl AuthSystem {
    /// Create a new authentication system
    pub fn new(
        auth: &AuthConfig,
        rbac: &RbacConfig,
        audit: &AuditConfig,
        storage: &StorageLayer,
    ) -> Result<Self> {
        info!("Initializing authentication system");

        let jwt = Arc::new(JwtHandler::new(auth));
        let rbac = Arc::new(RbacSystem::new(rbac, storage.authorization.clone())?);
        let audit = Arc::new(AuditReporter::new(audit, storage.audit.clone()));

        info!("Authentication system initialized successfully");
        Ok(Self { jwt, rbac, audit })
    }

    /// Identity carried by a bearer token; `None` when absent or invalid
    pub fn identify(&self, token: Option<&str>) -> Option<Identity> {
        let token = token?;
        match self.jwt.verify(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }

    /// Authorization context for an optional identity
    pub async fn context_for(&self, identity: Option<&Identity>) -> ContextResolution {
        self.rbac.context_for(identity).await
    }

    /// Drop cached contexts after an assignment change
    pub fn assignments_changed(&self, user_id: Uuid) {
        self.rbac.invalidate_user(user_id);
    }

    /// Get JWT handler
    pub fn jwt(&self) -> &JwtHandler {
        &self.jwt
    }

    /// Get RBAC system
    pub fn rbac(&self) -> &RbacSystem {
        &self.rbac
    }

    /// Get denial reporter
    pub fn audit(&self) -> &AuditReporter {
        &self.audit
    }
}
