//! Login endpoint

use axum::{extract::State, Json};

use crate::dto::{LoginRequest, LoginResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Check credentials against the static directory
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let viewer = state
        .portal
        .login(req.username.trim(), &req.password)
        .map_err(|_| ApiError::Unauthorized("invalid username or password".to_string()))?;

    Ok(Json(LoginResponse {
        username: viewer.username,
        role: viewer.role.as_str().to_string(),
    }))
}
