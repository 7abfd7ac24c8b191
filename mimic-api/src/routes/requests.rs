//! Request endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mimic_core::types::{Decision, RequestStatus};

use super::resolve_viewer;
use crate::dto::{
    DecisionRequest, DeploymentResponse, InstallRequest, ListRequestsQuery, RequestResponse,
    SubmitRequest, ViewerParams,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List requests visible to the caller
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<Json<Vec<RequestResponse>>> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let status = query
        .status
        .as_deref()
        .map(parse_request_status)
        .transpose()?;

    let requests = state.portal.requests.list_requests(&viewer, status).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Submit a request for the caller
pub async fn submit_request(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<Json<RequestResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let request = state
        .portal
        .requests
        .submit_request(&viewer.username, req.app.trim(), req.version.trim())
        .await?;

    Ok(Json(request.into()))
}

/// Get a request by id
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Query(query): Query<ViewerParams>,
) -> ApiResult<Json<RequestResponse>> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let request = state
        .portal
        .requests
        .get_request_for(&viewer, &request_id)
        .await?;

    Ok(Json(request.into()))
}

/// Approve or reject a pending request
pub async fn decide_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<Json<RequestResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let decision = Decision::from_str(&req.decision).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid decision: {}. Must be approve or reject",
            req.decision
        ))
    })?;

    let request = state
        .portal
        .requests
        .decide_request(&request_id, decision, &viewer)
        .await?;

    Ok(Json(request.into()))
}

/// Deploy an approved request
pub async fn deploy_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(req): Json<ViewerParams>,
) -> ApiResult<Json<DeploymentResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let deployment = state
        .portal
        .tickets
        .deploy_request(&request_id, &viewer)
        .await?;

    Ok(Json(deployment.into()))
}

/// Install an eligible version directly
pub async fn install_direct(
    State(state): State<AppState>,
    Json(req): Json<InstallRequest>,
) -> ApiResult<Json<DeploymentResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let deployment = state
        .portal
        .installs
        .install_direct(&viewer, req.app.trim(), req.version.trim())
        .await?;

    Ok(Json(deployment.into()))
}

fn parse_request_status(s: &str) -> ApiResult<RequestStatus> {
    RequestStatus::from_str(s).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid status: {}. Must be pending, approved or rejected",
            s
        ))
    })
}
