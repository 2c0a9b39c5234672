use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Open note
        .route("/note", get(handlers::get_note))
        .route("/note/new", post(handlers::new_note))
        .route("/note/active", post(handlers::set_active_region))
        .route("/note/copy", post(handlers::copy_active))
        .route("/note/:region", put(handlers::edit_region))
        // Recording control
        .route("/record/start", post(handlers::start_recording))
        .route("/record/stop", post(handlers::stop_recording))
        .route("/record/toggle", post(handlers::toggle_recording))
        .route("/record/feedback", get(handlers::get_feedback))
        // History
        .route("/history", get(handlers::get_history))
        .route("/history/panel", post(handlers::set_history_panel))
        .route("/history/:id/load", post(handlers::load_history_entry))
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
