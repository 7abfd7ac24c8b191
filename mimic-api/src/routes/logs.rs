//! Audit log endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use mimic_core::types::{LogEvent, LogQuery, LogType};

use super::resolve_viewer;
use crate::dto::{AppendLogRequest, LogEntryResponse, LogsQuery};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query the audit log, newest first
pub async fn query_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<LogEntryResponse>>> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let log_type = query.log_type.as_deref().map(parse_log_type).transpose()?;

    let entries = state
        .portal
        .audit
        .query(
            &viewer,
            LogQuery {
                user: query.user,
                log_type,
                app: query.app,
                since: query.since,
                limit: query.limit,
            },
        )
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Append an entry
pub async fn append_log(
    State(state): State<AppState>,
    Json(req): Json<AppendLogRequest>,
) -> ApiResult<Json<LogEntryResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let log_type = parse_log_type(&req.log_type)?;

    let event = LogEvent {
        user: req.user.unwrap_or_else(|| viewer.username.clone()),
        log_type,
        action: req.action,
        app: req.app,
        version: req.version,
        status: req.status,
    };
    let entry = state.portal.audit.append(&viewer, event).await?;

    Ok(Json(entry.into()))
}

fn parse_log_type(s: &str) -> ApiResult<LogType> {
    LogType::from_str(s).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid log_type: {}. Must be install, chat, file or system",
            s
        ))
    })
}
