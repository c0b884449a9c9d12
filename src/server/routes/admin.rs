//! Administrative endpoints
//!
//! Assignment changes invalidate the affected user's cached contexts so the
//! next request sees the new grants.

use crate::auth::rbac::{Capability, PermissionMatrix, Requirement, Role, Warehouse};
use crate::server::AppState;
use crate::server::guard::authorize;
use crate::server::routes::ApiResponse;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

const DEFAULT_AUDIT_LIMIT: u64 = 50;
const MAX_AUDIT_LIMIT: u64 = 1000;

/// Configure admin routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/matrix", web::get().to(get_matrix))
            .route("/policies", web::get().to(get_policies))
            .route("/audit", web::get().to(recent_denials))
            .route("/users/{user_id}/roles/{role}", web::post().to(assign_role))
            .route("/users/{user_id}/roles/{role}", web::delete().to(unassign_role))
            .route(
                "/users/{user_id}/warehouses/{code}",
                web::post().to(assign_warehouse),
            )
            .route(
                "/users/{user_id}/warehouses/{code}",
                web::delete().to(unassign_warehouse),
            ),
    );
}

/// Matrix response
#[derive(Debug, Serialize)]
pub struct MatrixView<'a> {
    pub matrix: &'a PermissionMatrix,
    pub global_access_roles: BTreeSet<Role>,
}

/// Assignment change result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentChange {
    pub user_id: Uuid,
    /// `false` when the assignment was already in the requested state
    pub changed: bool,
}

/// Audit listing query
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u64>,
}

/// The active permission matrix
async fn get_matrix(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    authorize(&req, &state, &Requirement::admin_only()).await?;

    let rbac = state.auth.rbac();
    let view = MatrixView {
        matrix: rbac.matrix(),
        global_access_roles: rbac.global_access_roles(),
    };
    Ok(ApiResponse::success(view).to_http_response())
}

/// Storage-level policies generated from the matrix, as SQL
async fn get_policies(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    authorize(&req, &state, &Requirement::admin_only()).await?;

    let sql = state.auth.rbac().policy_set()?.render();
    Ok(HttpResponse::Ok()
        .content_type("application/sql; charset=utf-8")
        .body(sql))
}

/// Most recent denials
async fn recent_denials(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<AuditQuery>,
) -> Result<HttpResponse, GatewayError> {
    authorize(&req, &state, &Requirement::capability(Capability::SystemSettings)).await?;

    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    if limit == 0 || limit > MAX_AUDIT_LIMIT {
        return Err(GatewayError::bad_request(format!(
            "limit must be between 1 and {}",
            MAX_AUDIT_LIMIT
        )));
    }

    let events = state.storage.audit.recent_denials(limit).await?;
    let count = events.len();
    Ok(ApiResponse::success_with_meta(events, serde_json::json!({ "count": count }))
        .to_http_response())
}

fn parse_role(user_id: Uuid, name: &str) -> Result<(Uuid, Role), GatewayError> {
    Ok((user_id, name.parse::<Role>()?))
}

fn parse_warehouse(user_id: Uuid, code: &str) -> Result<(Uuid, Warehouse), GatewayError> {
    Ok((user_id, code.parse::<Warehouse>()?))
}

fn changed(state: &AppState, user_id: Uuid, changed: bool) -> HttpResponse {
    // Invalidate unconditionally
    state.auth.assignments_changed(user_id);
    ApiResponse::success(AssignmentChange { user_id, changed }).to_http_response()
}

async fn assign_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, GatewayError> {
    let actor = authorize(&req, &state, &Requirement::capability(Capability::ManageUsers)).await?;
    let (user_id, role) = parse_role(path.0, &path.1)?;

    let result = state.storage.assignments.assign_role(user_id, role).await?;
    info!(actor = ?actor.user_id, %user_id, %role, changed = result, "Role assigned");
    Ok(changed(&state, user_id, result))
}

async fn unassign_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, GatewayError> {
    let actor = authorize(&req, &state, &Requirement::capability(Capability::ManageUsers)).await?;
    let (user_id, role) = parse_role(path.0, &path.1)?;

    let result = state.storage.assignments.unassign_role(user_id, role).await?;
    info!(actor = ?actor.user_id, %user_id, %role, changed = result, "Role unassigned");
    Ok(changed(&state, user_id, result))
}

async fn assign_warehouse(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, GatewayError> {
    let actor = authorize(&req, &state, &Requirement::capability(Capability::ManageUsers)).await?;
    let (user_id, warehouse) = parse_warehouse(path.0, &path.1)?;

    let result = state
        .storage
        .assignments
        .assign_warehouse(user_id, warehouse)
        .await?;
    info!(actor = ?actor.user_id, %user_id, %warehouse, changed = result, "Warehouse assigned");
    Ok(changed(&state, user_id, result))
}

async fn unassign_warehouse(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, GatewayError> {
    let actor = authorize(&req, &state, &Requirement::capability(Capability::ManageUsers)).await?;
    let (user_id, warehouse) = parse_warehouse(path.0, &path.1)?;

    let result = state
        .storage
        .assignments
        .unassign_warehouse(user_id, warehouse)
        .await?;
    info!(actor = ?actor.user_id, %user_id, %warehouse, changed = result, "Warehouse unassigned");
    Ok(changed(&state, user_id, result))
}
