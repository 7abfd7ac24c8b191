//! API route handlers

pub mod agent;
pub mod auth;
pub mod catalog;
pub mod export;
pub mod files;
pub mod health;
pub mod logs;
pub mod requests;
pub mod tickets;

use axum::{routing::get, routing::post, Router};
use mimic_core::types::Viewer;

use crate::error::ApiResult;
use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/login", post(auth::login))
        // Catalog
        .route("/catalog", get(catalog::list_applications))
        .route("/catalog/:app", get(catalog::get_application))
        // Requests
        .route(
            "/requests",
            get(requests::list_requests).post(requests::submit_request),
        )
        .route("/requests/:request_id", get(requests::get_request))
        .route("/requests/:request_id/decision", post(requests::decide_request))
        .route("/requests/:request_id/deploy", post(requests::deploy_request))
        .route("/install", post(requests::install_direct))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route("/tickets/:ticket_id", get(tickets::get_ticket))
        .route("/tickets/:ticket_id/status", post(tickets::advance_ticket))
        // Audit log
        .route("/logs", get(logs::query_logs).post(logs::append_log))
        // Files
        .route("/files", get(files::list_files))
        .route("/files/:file_id/download", get(files::download_file))
        // Export
        .route("/export/:kind", get(export::export_records))
        // Agent
        .route("/agent", post(agent::handle_message));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Resolve the caller named in a request
pub(crate) fn resolve_viewer(state: &AppState, username: &str) -> ApiResult<Viewer> {
    Ok(state.portal.viewer(username.trim())?)
}

