//! Catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mimic_core::error::PortalError;

use super::resolve_viewer;
use crate::dto::{ApplicationResponse, CatalogQuery};
use crate::error::ApiResult;
use crate::state::AppState;

/// List applications, ordered by name
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Json<Vec<ApplicationResponse>>> {
    let role = match query.username {
        Some(ref username) => Some(resolve_viewer(&state, username)?.role),
        None => None,
    };

    let apps = state
        .portal
        .catalog()
        .list_applications()
        .iter()
        .map(|app| {
            let mut response = ApplicationResponse::from(app);
            if let Some(role) = role {
                response.eligible_versions = Some(
                    app.versions
                        .iter()
                        .filter(|v| state.portal.matrix().is_eligible(role, &app.name, v))
                        .cloned()
                        .collect(),
                );
            }
            response
        })
        .collect();

    Ok(Json(apps))
}

/// Get one application and its versions
pub async fn get_application(
    State(state): State<AppState>,
    Path(app): Path<String>,
) -> ApiResult<Json<ApplicationResponse>> {
    let application = state
        .portal
        .catalog()
        .get(&app)
        .ok_or_else(|| PortalError::not_found("Application", &app))?;

    Ok(Json(ApplicationResponse::from(application)))
}
