use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::appointment::Appointment;

/// Engine-level error taxonomy. Every mutating operation either commits a
/// new state or returns one of these; validation happens before any mutation
/// is attempted.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slot conflict: staff member already committed to appointment {}", existing.id)]
    Conflict { existing: Box<Appointment> },

    #[error("Course state error: {0}")]
    CourseState(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("External service error: {0}")]
    External(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn course_state(msg: impl Into<String>) -> Self {
        EngineError::CourseState(msg.into())
    }
}

/// HTTP-facing error wrapper used by every cell's handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => AppError::BadRequest(msg),
            EngineError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            EngineError::Conflict { existing } => AppError::Conflict(format!(
                "staff member already committed to appointment {} at {} {}",
                existing.id, existing.date, existing.time
            )),
            EngineError::CourseState(msg) => AppError::Conflict(msg),
            EngineError::InvalidTransition { from, to } => {
                AppError::Conflict(format!("invalid status transition from {} to {}", from, to))
            }
            EngineError::External(msg) => AppError::ExternalService(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ExternalService(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        tracing::error!("Error: {}: {}", status, message);

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
