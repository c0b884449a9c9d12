//! Health check and version endpoints

use crate::server::AppState;
use crate::server::routes::ApiResponse;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use tracing::{debug, warn};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/version", web::get().to(version_info));
}

/// Health status
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// "healthy" or "degraded"
    pub status: &'static str,
    /// Whether the authorization datastore answered
    pub storage: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: &'static str,
}

/// Basic health check endpoint
///
/// Answers 200 when the datastore is reachable and 503 otherwise.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let storage = match state.storage.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            false
        }
    };

    let health = HealthStatus {
        status: if storage { "healthy" } else { "degraded" },
        storage,
        timestamp: chrono::Utc::now(),
        version: crate::VERSION,
    };

    let response = ApiResponse::success(health);
    Ok(if storage {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    })
}

/// Version information endpoint
pub async fn version_info() -> ActixResult<HttpResponse> {
    Ok(ApiResponse::success(crate::build_info()).to_http_response())
}
