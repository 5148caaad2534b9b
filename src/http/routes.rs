use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:session_id/status", get(handlers::get_status))
        .route(
            "/sessions/:session_id/transcript",
            get(handlers::get_transcript),
        )
        .route("/sessions/:session_id/end", post(handlers::end_interview))
        // Audio control
        .route(
            "/sessions/:session_id/recording/start",
            post(handlers::start_recording),
        )
        .route(
            "/sessions/:session_id/recording/stop",
            post(handlers::stop_recording),
        )
        .route(
            "/sessions/:session_id/recording/pause",
            post(handlers::pause_audio),
        )
        .route(
            "/sessions/:session_id/recording/resume",
            post(handlers::resume_audio),
        )
        // Interview interaction
        .route(
            "/sessions/:session_id/language",
            post(handlers::select_language),
        )
        .route("/sessions/:session_id/answer", post(handlers::submit_answer))
        .route(
            "/sessions/:session_id/summary",
            post(handlers::request_summary),
        )
        // Request logging and CORS
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
