//! Agent endpoint

use axum::{extract::State, Json};

use super::resolve_viewer;
use crate::dto::{AgentRequest, AgentResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Classify a chat message and act on it
pub async fn handle_message(
    State(state): State<AppState>,
    Json(req): Json<AgentRequest>,
) -> ApiResult<Json<AgentResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let reply = state.portal.agent.handle(&viewer, &req.message).await?;
    Ok(Json(reply.into()))
}
