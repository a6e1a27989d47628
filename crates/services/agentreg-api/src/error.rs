use agentreg_ledger::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let msg = err.to_string();
        match err {
            RegistryError::AgentNotFound(_) => ApiError::NotFound(msg),
            RegistryError::InvalidOwner | RegistryError::InvalidRating(_) => ApiError::BadRequest(msg),
            RegistryError::CannotRateOwnAgent(_) | RegistryError::NotAgentOwner { .. } => {
                ApiError::Forbidden(msg)
            }
            RegistryError::AlreadyRated(..) | RegistryError::Reentrant => ApiError::Conflict(msg),
            RegistryError::IdentifierSpaceExhausted
            | RegistryError::ScoreOverflow(_)
            | RegistryError::Storage(_) => ApiError::InternalServerError(msg),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalServerError(format!("registry task failed: {}", err))
    }
}
