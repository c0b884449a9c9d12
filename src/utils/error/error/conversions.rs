//! Type conversions for GatewayError

use super::types::GatewayError;
use crate::auth::rbac::DenyReason;

impl From<DenyReason> for GatewayError {
    fn from(reason: DenyReason) -> Self {
        GatewayError::Denied(reason)
    }
}
