//! Memory operation handlers: save, retrieve, rename, delete.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use whereabouts_types::query::{
    DeleteFactsRequest, RenameLocationRequest, RetrieveQuery, SaveMemoryRequest,
    SaveMemoryResponse, StatusMessage,
};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /save - Remember (or forget) facts stated in free text.
pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<SaveMemoryRequest>, JsonRejection>,
) -> Result<Json<SaveMemoryResponse>, AppError> {
    let Json(body) = payload?;
    let response = state.memory_service.save(body.user_id, &body.text).await?;
    Ok(Json(response))
}

/// GET /retrieve - Answer a natural-language lookup query.
///
/// The HTTP status mirrors the response's `status` field: 200 when at
/// least one target resolved, 404 otherwise.
pub async fn retrieve(
    State(state): State<AppState>,
    query: Result<Query<RetrieveQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let response = state
        .memory_service
        .retrieve(query.user_id, &query.text)
        .await?;
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(response)))
}

/// PUT /rename-location - Rename a location across the given facts.
pub async fn rename_location(
    State(state): State<AppState>,
    payload: Result<Json<RenameLocationRequest>, JsonRejection>,
) -> Result<Json<StatusMessage>, AppError> {
    let Json(body) = payload?;
    let message = state
        .memory_service
        .rename_location(
            body.user_id,
            &body.vector_ids,
            &body.original_location,
            &body.modified_location,
        )
        .await?;
    Ok(Json(StatusMessage {
        status: 200,
        message,
    }))
}

/// DELETE /delete - Remove specific facts by id.
pub async fn delete_facts(
    State(state): State<AppState>,
    payload: Result<Json<DeleteFactsRequest>, JsonRejection>,
) -> Result<Json<StatusMessage>, AppError> {
    let Json(body) = payload?;
    let message = state
        .memory_service
        .delete_facts(body.user_id, &body.vector_ids)
        .await?;
    Ok(Json(StatusMessage {
        status: 200,
        message,
    }))
}
