use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    domain::entities::*,
    infrastructure::http::middleware::{ApiResult, AppState},
};

/// GET /api/tickets/:id/followups - Ticket journal, oldest first
pub async fn list_ticket_followups(
    State(state): State<AppState>,
    Path(ticket_id): Path<i64>,
) -> ApiResult<Json<Vec<FollowUpResponse>>> {
    let followups = state.followup_service.list_for_ticket(ticket_id).await?;
    Ok(Json(
        followups.into_iter().map(FollowUpResponse::from).collect(),
    ))
}

/// POST /api/tickets/:id/followups - Comment on a ticket and/or change its status
pub async fn add_ticket_followup(
    State(state): State<AppState>,
    Path(ticket_id): Path<i64>,
    Json(req): Json<AddFollowUpRequest>,
) -> ApiResult<(StatusCode, Json<TicketUpdateResponse>)> {
    let (ticket, followup) = state.ticket_service.add_followup(ticket_id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketUpdateResponse {
            ticket: TicketResponse::from(ticket),
            followup: FollowUpResponse::from(followup),
        }),
    ))
}

/// GET /api/followups/:id - One follow-up with its changes
pub async fn get_followup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FollowUpResponse>> {
    let followup = state.followup_service.get_followup(id).await?;
    Ok(Json(FollowUpResponse::from(followup)))
}
