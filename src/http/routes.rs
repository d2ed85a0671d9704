use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Call API
        .route("/calls", post(handlers::create_call))
        .route("/calls/:session_id", get(handlers::get_call))
        .route(
            "/calls/by-provider/:call_id",
            get(handlers::get_call_by_provider_id),
        )
        // Provider webhooks
        .route("/twiml/:session_id", post(handlers::call_instructions))
        .route("/call_status/:session_id", post(handlers::call_status))
        .route(
            "/capture_response/:session_id",
            post(handlers::capture_response),
        )
        .route("/process_speech/:session_id", post(handlers::process_speech))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
