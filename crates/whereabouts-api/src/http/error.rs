//! Application error type mapping to HTTP status codes and body format.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use whereabouts_types::error::MemoryError;

/// Errors a handler can surface. Pipeline errors carry their own status
/// mapping; malformed requests are rejected before the pipeline runs.
#[derive(Debug)]
pub enum AppError {
    /// An error from the memory pipelines.
    Memory(MemoryError),
    /// Request body/query failed to parse.
    MalformedRequest(String),
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::Memory(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonSyntaxError(_) => "Invalid JSON format of request body.",
            _ => "Invalid request body.",
        };
        AppError::MalformedRequest(message.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(_: QueryRejection) -> Self {
        AppError::MalformedRequest("Invalid query parameters.".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Memory(err) if err.is_client_error() => {
                let status = match err {
                    MemoryError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            AppError::Memory(err) => {
                // External collaborator failures: log the detail, return a
                // generic message without internals.
                tracing::error!(error = %err, "memory operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing the request. Please try \
                     again."
                        .to_string(),
                )
            }
            AppError::MalformedRequest(message) => {
                let body = json!({
                    "status": 400,
                    "error": "Validation Error",
                    "message": message,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
        };

        let body = json!({
            "status": status.as_u16(),
            "error": error,
        });
        (status, axum::Json(body)).into_response()
    }
}
