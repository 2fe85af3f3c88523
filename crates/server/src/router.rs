use super::{handlers, state::AppState};
use axum::http::{HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/chat", post(handlers::chat_handler))
        .route("/voice", get(handlers::voice_widget_handler))
        .route("/voice/process", post(handlers::voice_process_handler))
        .route("/clear_chat", post(handlers::clear_chat_handler))
        .route("/widget", get(handlers::widget_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Builds the CORS layer from the comma-separated `allowed_origins` setting;
/// `*` (the default) allows any origin.
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    if allowed_origins.split(',').any(|origin| origin.trim() == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any)
}
