use crate::{AppState, error::AppError, handlers};
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Fallback for every path the API does not claim: serves the front end.
pub async fn serve_static(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method == Method::OPTIONS {
        return handlers::preflight().await.into_response();
    }

    // Roll-number paths the router cannot match: an empty or multi-segment tail.
    if let Some(raw_roll_no) = uri.path().strip_prefix("/api/students/") {
        if method != Method::GET {
            return AppError::MethodNotAllowed.into_response();
        }
        return handlers::find_student(&state, raw_roll_no).await.into_response();
    }

    let request_path = match uri.path() {
        "/" => "/index.html",
        other => other,
    };

    let Some(file_path) = resolve(&state.static_dir, request_path) else {
        tracing::warn!(path = request_path, "Rejected static path outside the front end.");
        return not_found(request_path);
    };

    match tokio::fs::metadata(&file_path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(request_path),
    }

    match tokio::fs::read(&file_path).await {
        Ok(contents) => (
            [(header::CONTENT_TYPE, content_type(&file_path))],
            contents,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(path = %file_path.display(), error = %e, "Failed to read static file.");
            not_found(request_path)
        }
    }
}

/// Maps a request path onto `static_dir`, refusing anything that could
/// climb out of it.
fn resolve(static_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut resolved = static_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        _ => "text/plain",
    }
}

fn not_found(request_path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("File not found: {request_path}"),
    )
        .into_response()
}
