//! Authorization denial auditing
//!
//! Denials at the API boundary are recorded as structured events. Reporting
//! is fire-and-forget: the decision is already made, a failed write is
//! logged and dropped, and nothing is retried.

use crate::config::{AuditConfig, AuditSinkKind};
use crate::storage::AuditStore;
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::rbac::DenyReason;

/// Longest user agent kept in an audit record
const MAX_USER_AGENT_LEN: usize = 200;

/// Request metadata attached to a denial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
}

impl ClientMetadata {
    /// Truncate free-form fields to keep records bounded
    pub fn sanitized(mut self) -> Self {
        self.user_agent = self
            .user_agent
            .map(|ua| truncate_chars(&ua, MAX_USER_AGENT_LEN));
        self
    }
}

/// One recorded denial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub requested_resource: String,
    pub reason_code: String,
    pub reason: String,
    pub client: ClientMetadata,
}

impl DenialEvent {
    pub fn new(
        user_id: Option<Uuid>,
        requested_resource: impl Into<String>,
        reason: &DenyReason,
        client: ClientMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_id,
            requested_resource: requested_resource.into(),
            reason_code: reason.code().to_string(),
            reason: reason.message(),
            client: client.sanitized(),
        }
    }
}

/// Records denial events
#[derive(Clone)]
pub struct AuditReporter {
    enabled: bool,
    sink: AuditSinkKind,
    store: Option<Arc<dyn AuditStore>>,
}

impl std::fmt::Debug for AuditReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditReporter")
            .field("enabled", &self.enabled)
            .field("sink", &self.sink)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

impl AuditReporter {
    pub fn new(config: &AuditConfig, store: Arc<dyn AuditStore>) -> Self {
        Self {
            enabled: config.enabled,
            sink: config.sink,
            store: Some(store),
        }
    }

    /// Reporter that only emits tracing events
    pub fn tracing_only() -> Self {
        Self {
            enabled: true,
            sink: AuditSinkKind::Tracing,
            store: None,
        }
    }

    /// Reporter that records nothing
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sink: AuditSinkKind::Tracing,
            store: None,
        }
    }

    /// Record a denial. Never blocks the caller; a database write, if
    /// configured, runs on a detached task whose handle is returned.
    pub fn report(&self, event: DenialEvent) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        if matches!(self.sink, AuditSinkKind::Tracing | AuditSinkKind::Both) {
            warn!(
                target: "authz_audit",
                event_id = %event.id,
                user_id = ?event.user_id,
                resource = %event.requested_resource,
                reason_code = %event.reason_code,
                ip = ?event.client.ip_address,
                request_id = ?event.client.request_id,
                "Authorization denied: {}",
                event.reason
            );
        }

        if !matches!(self.sink, AuditSinkKind::Database | AuditSinkKind::Both) {
            return None;
        }

        let store = self.store.clone()?;
        Some(tokio::spawn(async move {
            match store.record_denial(&event).await {
                Ok(()) => debug!(event_id = %event.id, "Denial recorded"),
                Err(e) => warn!(event_id = %event.id, error = %e, "Dropping audit record"),
            }
        }))
    }
}
