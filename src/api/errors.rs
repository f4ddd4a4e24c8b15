use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::ConfigError;
use crate::domain::repositories::RepositoryError;
use crate::domain::team::TeamError;
use crate::store::StoreError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::TeamNotFound(_)
            | StoreError::NoCurrentTeam
            | StoreError::Team(TeamError::AgentNotInWorkflow(_)) => Self::not_found(message),
            StoreError::Team(TeamError::AgentAlreadyInWorkflow(_)) => Self::conflict(message),
            StoreError::Team(TeamError::ReorderMismatch(_)) => Self::bad_request(message),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TeamNotFound(_) => Self::not_found(err.to_string()),
            _ => Self::internal_server_error(format!("Storage error: {}", err)),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound(_) => Self::not_found(err.to_string()),
            ConfigError::Parse(_)
            | ConfigError::InvalidEnv { .. }
            | ConfigError::NotADirectory(_) => {
                Self::bad_request(err.to_string())
            }
            ConfigError::Io { .. } => Self::internal_server_error(err.to_string()),
        }
    }
}
