use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use configuration::Config;
use core_types::StudentStore;
use database::{SqlStudentGateway, StudentGateway};
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod static_files;

#[cfg(test)]
mod tests;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub store: StudentStore,
    pub gateway: Arc<dyn StudentGateway>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(gateway: Arc<dyn StudentGateway>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StudentStore::new(),
            gateway,
            static_dir: static_dir.into(),
        }
    }
}

/// Builds the full application: the student API, the static front end and
/// the middleware every response passes through.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/students",
            get(handlers::list_students)
                .post(handlers::create_student)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/students/:roll_no",
            get(handlers::get_student)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(static_files::serve_static)
        .with_state(state)
        // Innermost, so a panic still leaves with the CORS headers below.
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handling error.");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error::error_body("Internal server error"),
    )
        .into_response()
}

/// The main function to configure and run the web server.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let addr = config.server.bind_addr()?;
    let gateway = Arc::new(SqlStudentGateway::new(config.database.url.clone()));
    let app_state = Arc::new(AppState::new(gateway, config.server.static_dir.clone()));
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let port = config.server.port;
    tracing::info!("SRMS web server started on http://localhost:{}", port);
    tracing::info!("Frontend available at: http://localhost:{}", port);
    tracing::info!("API endpoint: http://localhost:{}/api/students", port);
    tracing::info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C.");
        std::future::pending::<()>().await;
    }
}
