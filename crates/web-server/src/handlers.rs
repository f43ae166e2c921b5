use crate::{AppState, error::AppError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use core_types::{NewStudent, codec};
use std::sync::Arc;

/// # GET /api/students
pub async fn list_students(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let students = state.store.all().await;
    Ok(json_response(StatusCode::OK, codec::to_json_array(&students)?))
}

/// # GET /api/students/:roll_no
pub async fn get_student(
    Path(raw_roll_no): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    find_student(&state, &raw_roll_no).await
}

/// Looks a student up by the raw text after `/api/students/`. Anything that
/// is not a single integer, an empty tail included, is an invalid roll number.
pub async fn find_student(state: &AppState, raw_roll_no: &str) -> Result<Response, AppError> {
    let roll_no: i32 = raw_roll_no
        .parse()
        .map_err(|_| AppError::InvalidRollNumber(raw_roll_no.to_string()))?;

    let student = state
        .store
        .find(roll_no)
        .await
        .ok_or(AppError::NotFound(roll_no))?;
    Ok(json_response(StatusCode::OK, codec::to_json(&student)?))
}

/// # POST /api/students
/// Grades the submitted student, keeps it in memory and mirrors it to the
/// database. A database failure is logged and does not change the response.
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body = std::str::from_utf8(&body).map_err(|_| AppError::UnreadableBody)?;
    let fields = codec::decode_flat_object(body);
    let student = NewStudent::from_fields(&fields)?.into_student();

    if !state.store.insert_if_absent(student.clone()).await {
        return Err(AppError::DuplicateRollNumber(student.roll_no));
    }

    match state.gateway.insert_student(&student).await {
        Ok(()) => tracing::info!(roll_no = student.roll_no, "Student saved to database."),
        Err(e) => tracing::warn!(
            roll_no = student.roll_no,
            error = %e,
            "Database not available, student saved to memory only."
        ),
    }

    Ok(json_response(StatusCode::CREATED, codec::to_json(&student)?))
}

/// # OPTIONS *
/// CORS preflight; the CORS headers themselves are added by middleware.
pub async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")])
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
