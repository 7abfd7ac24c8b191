//! Health check endpoint

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let (status, log_entries) = match state.portal.audit.count().await {
        Ok(count) => ("healthy", count),
        Err(e) => {
            tracing::warn!(error = %e, "Audit log unavailable");
            ("degraded", 0)
        }
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        applications: state.portal.catalog().list_applications().len(),
        log_entries,
    }))
}
