use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    domain::entities::*,
    infrastructure::http::middleware::{ApiResult, AppState},
};

/// GET /api/queues - List queues ordered by title
pub async fn list_queues(State(state): State<AppState>) -> ApiResult<Json<Vec<QueueResponse>>> {
    let queues = state.queue_service.list_queues().await?;
    Ok(Json(queues.into_iter().map(QueueResponse::from).collect()))
}

/// POST /api/queues - Create a queue
pub async fn create_queue(
    State(state): State<AppState>,
    Json(req): Json<CreateQueueRequest>,
) -> ApiResult<(StatusCode, Json<QueueResponse>)> {
    let queue = state.queue_service.create_queue(req).await?;
    Ok((StatusCode::CREATED, Json(QueueResponse::from(queue))))
}

/// GET /api/queues/:id - Get a queue
pub async fn get_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<QueueResponse>> {
    let queue = state.queue_service.get_queue(id).await?;
    Ok(Json(QueueResponse::from(queue)))
}

/// GET /api/queues/slug/:slug - Get a queue by slug
pub async fn get_queue_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<QueueResponse>> {
    let queue = state.queue_service.get_queue_by_slug(&slug).await?;
    Ok(Json(QueueResponse::from(queue)))
}

/// PATCH /api/queues/:id - Update a queue
pub async fn update_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateQueueRequest>,
) -> ApiResult<Json<QueueResponse>> {
    let queue = state.queue_service.update_queue(id, req).await?;
    Ok(Json(QueueResponse::from(queue)))
}

/// DELETE /api/queues/:id - Delete a queue and its tickets
pub async fn delete_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.queue_service.delete_queue(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
