//! Ticket endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mimic_core::types::TicketStatus;

use super::resolve_viewer;
use crate::dto::{
    AdvanceTicketRequest, CreateTicketRequest, ListTicketsQuery, TicketResponse, ViewerParams,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List tickets visible to the caller
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<ListTicketsQuery>,
) -> ApiResult<Json<Vec<TicketResponse>>> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let status = query
        .status
        .as_deref()
        .map(parse_ticket_status)
        .transpose()?;

    let tickets = state.portal.tickets.list_tickets(&viewer, status).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}

/// Open a ticket for the caller
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<Json<TicketResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let ticket = state
        .portal
        .tickets
        .create_ticket(&viewer.username, viewer.role, req.action.trim())
        .await?;

    Ok(Json(ticket.into()))
}

/// Get a ticket by id
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    Query(query): Query<ViewerParams>,
) -> ApiResult<Json<TicketResponse>> {
    let viewer = resolve_viewer(&state, &query.username)?;
    let ticket = state
        .portal
        .tickets
        .get_ticket_for(&viewer, &ticket_id)
        .await?;

    Ok(Json(ticket.into()))
}

/// Move a ticket to a new status
pub async fn advance_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    Json(req): Json<AdvanceTicketRequest>,
) -> ApiResult<Json<TicketResponse>> {
    let viewer = resolve_viewer(&state, &req.username)?;
    let status = parse_ticket_status(&req.status)?;

    let ticket = state
        .portal
        .tickets
        .advance_ticket(&ticket_id, status, &viewer)
        .await?;

    Ok(Json(ticket.into()))
}

fn parse_ticket_status(s: &str) -> ApiResult<TicketStatus> {
    TicketStatus::from_str(s).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid status: {}. Must be open, in_progress or closed",
            s
        ))
    })
}
