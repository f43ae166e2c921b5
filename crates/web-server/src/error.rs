use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid roll number: {0}")]
    InvalidRollNumber(String),
    #[error("Student {0} not found")]
    NotFound(i32),
    #[error("Student {0} already exists")]
    DuplicateRollNumber(i32),
    #[error("Invalid student data: {0}")]
    InvalidStudentData(#[from] CoreError),
    #[error("Request body is not valid UTF-8")]
    UnreadableBody,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Failed to encode response: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The uniform `{"error": "<message>"}` body.
pub fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(json!({ "error": message }))
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidRollNumber(raw) => {
                tracing::debug!(raw = %raw, "Rejected roll number.");
                (StatusCode::BAD_REQUEST, "Invalid roll number")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Student not found"),
            AppError::DuplicateRollNumber(_) => (
                StatusCode::CONFLICT,
                "Student with this roll number already exists",
            ),
            AppError::InvalidStudentData(CoreError::MissingField(_)) => {
                tracing::error!(error = %self, "Error adding student.");
                (StatusCode::BAD_REQUEST, "Invalid student data")
            }
            AppError::InvalidStudentData(CoreError::WrongType { .. }) | AppError::UnreadableBody => {
                tracing::error!(error = %self, "Error parsing student data.");
                (StatusCode::BAD_REQUEST, "Invalid student data format")
            }
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            AppError::Encoding(_) => {
                tracing::error!(error = %self, "Request handling error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, error_body(error_message)).into_response()
    }
}
