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
        // Panel chrome
        .route("/panel/open", post(handlers::open_panel))
        .route("/panel/close", post(handlers::close_panel))
        .route("/panel/toggle", post(handlers::toggle_panel))
        .route("/panel/minimize", post(handlers::minimize_panel))
        .route("/panel/restore", post(handlers::restore_panel))
        .route("/panel/state", get(handlers::get_panel_state))
        // Conversation
        .route("/panel/messages", post(handlers::send_message))
        // Voice input
        .route("/panel/recording/start", post(handlers::start_recording))
        .route("/panel/recording/stop", post(handlers::stop_recording))
        .route("/panel/recording/cancel", post(handlers::cancel_recording))
        // The shell is typically a webview served from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
