//! HTTP API for an external presentation shell
//!
//! This module exposes the panel's intents and rendered state as JSON:
//! - POST /panel/open | /panel/close | /panel/toggle - Widget chrome
//! - POST /panel/minimize | /panel/restore - Minimize state
//! - GET /panel/state - Rendered panel
//! - POST /panel/messages - Send typed text
//! - POST /panel/recording/start | stop | cancel - Voice input
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, SendMessageRequest, ToggleResponse};
pub use routes::create_router;
pub use state::AppState;
