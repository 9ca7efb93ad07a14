use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{task::TaskError, user::UserError},
};
use services::services::{generation::GenerationError, identity::IdentityError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Task(err) => match err {
                TaskError::TaskNotFound => (StatusCode::NOT_FOUND, "TaskError"),
                TaskError::DuplicateTitle => (StatusCode::CONFLICT, "TaskError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TaskError"),
            },
            ApiError::User(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UserError"),
            ApiError::Identity(err) => match err {
                IdentityError::InvalidToken => (StatusCode::UNAUTHORIZED, "IdentityError"),
                _ => (StatusCode::BAD_GATEWAY, "IdentityError"),
            },
            ApiError::Generation(_) => (StatusCode::BAD_GATEWAY, "GenerationError"),
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
        };

        // Client-facing text stays short; the cause only goes to the log.
        let error_message = match &self {
            ApiError::Task(TaskError::DuplicateTitle) => "Task already saved".to_string(),
            ApiError::Task(TaskError::TaskNotFound) => "Task not found".to_string(),
            ApiError::Identity(IdentityError::InvalidToken) | ApiError::Unauthorized => {
                "Unauthorized".to_string()
            }
            ApiError::Identity(_) => {
                "Could not reach the identity provider. Please try again.".to_string()
            }
            ApiError::Generation(_) => {
                "Task generation is currently unavailable. Please try again.".to_string()
            }
            ApiError::Database(DbErr::RecordNotFound(_)) => "Not found".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
