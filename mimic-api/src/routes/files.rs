//! File endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::resolve_viewer;
use crate::dto::{FileResponse, ListFilesQuery, ViewerParams};
use crate::error::ApiResult;
use crate::state::AppState;

/// Files the caller may access
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> ApiResult<Json<Vec<FileResponse>>> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let files = state
        .portal
        .files
        .list_files(&viewer, query.search.as_deref());

    Ok(Json(files.into_iter().map(Into::into).collect()))
}

/// Download a file as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<u64>,
    Query(query): Query<ViewerParams>,
) -> ApiResult<Response> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let download = state.portal.files.download(&viewer, file_id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        ),
    ];
    Ok((headers, download.content).into_response())
}
