//! Helper functions for creating specific error types

use super::types::GatewayError;
use crate::auth::rbac::DenyReason;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn datastore_unavailable<S: Into<String>>(message: S) -> Self {
        Self::DatastoreUnavailable(message.into())
    }

    /// Request carried no usable identity
    pub fn authentication_required() -> Self {
        Self::Denied(DenyReason::AuthenticationRequired)
    }

    /// The denial carried by this error, if it came from a guard or a
    /// failed context build
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Denied(reason) => Some(reason.clone()),
            Self::DatastoreUnavailable(_) => Some(DenyReason::DatastoreUnavailable),
            _ => None,
        }
    }
}
