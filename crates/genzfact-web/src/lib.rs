//! GenzFact Web Server
//!
//! Axum-based web server for the analysis page and JSON API.

pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Room for multipart framing and the text field on top of the file itself.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Base64 inflates uploads by a third on the JSON route.
    let max_upload = state.config().max_upload_bytes;
    let form_limit = max_upload.saturating_add(BODY_LIMIT_SLACK);
    let json_limit = (max_upload / 3 * 4 + 4).saturating_add(BODY_LIMIT_SLACK);

    let api_routes = Router::new()
        .route("/analyze", post(routes::api::analyze))
        .layer(DefaultBodyLimit::max(json_limit))
        .layer(cors)
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::page::index))
        .route(
            "/analyze",
            post(routes::page::analyze).layer(DefaultBodyLimit::max(form_limit)),
        )
        .route("/health", get(routes::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
