use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    domain::entities::*,
    infrastructure::http::middleware::{ApiResult, AppState},
};

/// GET /api/tickets - List tickets, newest first
///
/// Query parameters: `queue_id`, `status`, `assigned_to`, `unassigned`,
/// `limit`, `offset`.
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> ApiResult<Json<TicketListResponse>> {
    let (tickets, total) = state.ticket_service.list_tickets(&filter).await?;

    Ok(Json(TicketListResponse {
        tickets: tickets.into_iter().map(TicketResponse::from).collect(),
        total,
        limit: filter.limit(),
        offset: filter.offset(),
    }))
}

/// POST /api/tickets - Create a ticket
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketResponse>)> {
    let ticket = state.ticket_service.create_ticket(req).await?;
    Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket))))
}

/// GET /api/tickets/latest - Most recently created ticket
pub async fn latest_ticket(State(state): State<AppState>) -> ApiResult<Json<TicketResponse>> {
    let ticket = state.ticket_service.latest_ticket().await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// GET /api/tickets/:id - Get a ticket
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TicketResponse>> {
    let ticket = state.ticket_service.get_ticket(id).await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// PATCH /api/tickets/:id - Update a ticket and journal the change
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTicketRequest>,
) -> ApiResult<Json<TicketUpdateResponse>> {
    let (ticket, followup) = state.ticket_service.update_ticket(id, req).await?;

    Ok(Json(TicketUpdateResponse {
        ticket: TicketResponse::from(ticket),
        followup: FollowUpResponse::from(followup),
    }))
}

/// DELETE /api/tickets/:id - Delete a ticket with its follow-ups
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.ticket_service.delete_ticket(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
