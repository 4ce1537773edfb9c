use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::models::booking::BookingStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Overlap conflict: {0}")]
    OverlapConflict(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Collaborator call failed: {0}")]
    Collaborator(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Stable machine code the presentation tier maps to a localized message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "STORE_FAILURE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidRange(_) => "INVALID_RANGE",
            AppError::OverlapConflict(_) => "OVERLAP_CONFLICT",
            AppError::InvalidValue(_) => "INVALID_VALUE",
            AppError::SlotUnavailable(_) => "SLOT_UNAVAILABLE",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::Validation(_) => "VALIDATION",
            AppError::Collaborator(_) => "COLLABORATOR_FAILURE",
            AppError::InternalWithMsg(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let db_code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 1555 = SQLite Primary Key Constraint
                    if db_code == "2067" || db_code == "1555" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": "OVERLAP_CONFLICT",
                                "message": "Resource already exists (duplicate entry)"
                            })),
                        )
                            .into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidRange(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidValue(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::OverlapConflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::SlotUnavailable(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::Collaborator(msg) | AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
