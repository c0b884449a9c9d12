//! Caller-facing authorization endpoints
//!
//! The UI reads the caller's context once and gates rendering with it; the
//! check endpoint evaluates requirements without recording denials.

use crate::auth::rbac::guards::evaluate_all;
use crate::auth::rbac::{Decision, DenyReason, Requirement};
use crate::server::AppState;
use crate::server::guard::authorize_all;
use crate::server::middleware::request_identity;
use crate::server::routes::ApiResponse;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configure authorization routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/authz")
            .route("/context", web::get().to(get_context))
            .route("/check", web::post().to(check))
            .route("/refresh", web::post().to(refresh)),
    );
}

/// One requirement or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CheckRequest {
    Many { requirements: Vec<Requirement> },
    One(Requirement),
}

impl CheckRequest {
    fn into_requirements(self) -> Vec<Requirement> {
        match self {
            CheckRequest::Many { requirements } => requirements,
            CheckRequest::One(requirement) => vec![requirement],
        }
    }
}

/// Outcome of a check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl From<Decision> for CheckResponse {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => Self {
                allowed: true,
                http_status: None,
                message: None,
                reason: None,
            },
            Decision::Deny(reason) => Self {
                allowed: false,
                http_status: Some(reason.http_status()),
                message: Some(reason.message()),
                reason: Some(reason),
            },
        }
    }
}

/// The caller's authorization context
async fn get_context(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let context = authorize_all(&req, &state, &[]).await?;
    Ok(ApiResponse::success(context).to_http_response())
}

/// Evaluate requirements against the caller's context
async fn check(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CheckRequest>,
) -> Result<HttpResponse, GatewayError> {
    let requirements = body.into_inner().into_requirements();
    if requirements.is_empty() {
        return Err(GatewayError::bad_request("At least one requirement is needed"));
    }

    let identity = request_identity(&req);
    let resolution = state.auth.context_for(identity.as_ref()).await;
    let decision = evaluate_all(&resolution.context, &requirements);
    debug!(allowed = decision.is_allowed(), "Authorization check evaluated");

    Ok(ApiResponse::success(CheckResponse::from(decision)).to_http_response())
}

/// Drop the caller's cached context and rebuild it
async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let identity = request_identity(&req).ok_or_else(GatewayError::authentication_required)?;

    state.auth.rbac().invalidate_session(&identity).await;
    let context = state.auth.context_for(Some(&identity)).await.into_result()?;

    Ok(ApiResponse::success(context).to_http_response())
}
