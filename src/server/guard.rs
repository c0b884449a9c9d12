//! API guard
//!
//! Every protected handler calls [`authorize`] (or [`authorize_all`]) first.
//! The guard resolves the caller's context, evaluates the requirements and,
//! on denial, reports the event and returns the denial as an error that
//! renders with its stable reason code.

use crate::auth::ClientMetadata;
use crate::auth::DenialEvent;
use crate::auth::rbac::guards::evaluate_all;
use crate::auth::rbac::{AuthorizationContext, Decision, Requirement};
use crate::server::AppState;
use crate::server::middleware::{request_id, request_identity};
use crate::utils::error::{GatewayError, Result};
use actix_web::HttpRequest;
use actix_web::http::header::USER_AGENT;
use tracing::{debug, warn};

/// Authorize a request against a single requirement
pub async fn authorize(
    req: &HttpRequest,
    state: &AppState,
    requirement: &Requirement,
) -> Result<AuthorizationContext> {
    authorize_all(req, state, std::slice::from_ref(requirement)).await
}

/// Authorize a request against every requirement; the first denial wins.
///
/// With no requirements this still demands an authenticated caller with a
/// readable context.
pub async fn authorize_all(
    req: &HttpRequest,
    state: &AppState,
    requirements: &[Requirement],
) -> Result<AuthorizationContext> {
    let identity = request_identity(req);
    let resolution = state.auth.context_for(identity.as_ref()).await;
    if let Some(err) = &resolution.error {
        warn!(path = req.path(), error = %err, "Authorizing against a degraded context");
    }

    let context = resolution.context;
    match evaluate_all(&context, requirements) {
        Decision::Allow => {
            debug!(path = req.path(), user_id = ?context.user_id, "Request authorized");
            Ok(context)
        }
        Decision::Deny(reason) => {
            let resource = describe(req, requirements);
            warn!(
                user_id = ?context.user_id,
                resource = %resource,
                code = reason.code(),
                "Request denied"
            );

            let event = DenialEvent::new(context.user_id, resource, &reason, client_metadata(req));
            state.auth.audit().report(event);

            Err(GatewayError::Denied(reason))
        }
    }
}

/// Request details recorded with a denial
pub fn client_metadata(req: &HttpRequest) -> ClientMetadata {
    ClientMetadata {
        ip_address: req.connection_info().realip_remote_addr().map(str::to_string),
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        request_id: request_id(req),
        method: Some(req.method().to_string()),
        path: Some(req.path().to_string()),
    }
    .sanitized()
}

fn describe(req: &HttpRequest, requirements: &[Requirement]) -> String {
    let wanted: Vec<String> = requirements.iter().map(ToString::to_string).collect();
    if wanted.is_empty() {
        format!("{} {}", req.method(), req.path())
    } else {
        format!("{} {} [{}]", req.method(), req.path(), wanted.join(" "))
    }
}
