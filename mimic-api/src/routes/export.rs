//! Export endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use mimic_db::ExportKind;

use super::resolve_viewer;
use crate::dto::ViewerParams;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Export logs, tickets, requests or files visible to the caller
pub async fn export_records(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ViewerParams>,
) -> ApiResult<Response> {
    let kind = ExportKind::from_str(&kind).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid export: {}. Must be logs, tickets, requests or files",
            kind
        ))
    })?;
    let viewer = resolve_viewer(&state, &query.username)?;
    let export = state.portal.exports.export(&viewer, kind).await?;

    let headers = [
        (header::CONTENT_TYPE, export.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.content).into_response())
}
