use super::state::AppState;
use crate::panel::{ChatPanel, PanelView, RecordingStart};
use crate::session::IgnoreReason;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct SendMessageRequest {
    /// The typed draft, sent verbatim
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub open: bool,
    pub panel: Option<PanelView>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

async fn open_panel_or_404(state: &AppState) -> Result<Arc<ChatPanel>, Response> {
    state
        .widget
        .read()
        .await
        .panel()
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Chat panel is not open"))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /panel/open
/// Open the panel (no-op when already open)
pub async fn open_panel(State(state): State<AppState>) -> impl IntoResponse {
    let panel = state.widget.write().await.open();
    (StatusCode::OK, Json(panel.render()))
}

/// POST /panel/close
/// Close the panel and discard its conversation
pub async fn close_panel(State(state): State<AppState>) -> impl IntoResponse {
    if state.widget.write().await.close() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "Chat panel is not open")
    }
}

/// POST /panel/toggle
/// Floating button: open when closed, close when open
pub async fn toggle_panel(State(state): State<AppState>) -> impl IntoResponse {
    let panel = state.widget.write().await.toggle();
    Json(ToggleResponse {
        open: panel.is_some(),
        panel: panel.map(|p| p.render()),
    })
}

/// POST /panel/minimize
pub async fn minimize_panel(State(state): State<AppState>) -> Response {
    match open_panel_or_404(&state).await {
        Ok(panel) => {
            panel.minimize();
            (StatusCode::OK, Json(panel.render())).into_response()
        }
        Err(response) => response,
    }
}

/// POST /panel/restore
pub async fn restore_panel(State(state): State<AppState>) -> Response {
    match open_panel_or_404(&state).await {
        Ok(panel) => {
            panel.restore();
            (StatusCode::OK, Json(panel.render())).into_response()
        }
        Err(response) => response,
    }
}

/// GET /panel/state
/// Rendered panel for the shell to draw
pub async fn get_panel_state(State(state): State<AppState>) -> Response {
    match open_panel_or_404(&state).await {
        Ok(panel) => (StatusCode::OK, Json(panel.render())).into_response(),
        Err(response) => response,
    }
}

/// POST /panel/messages
/// Send typed text; the exchange completes in the background
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let panel = match open_panel_or_404(&state).await {
        Ok(panel) => panel,
        Err(response) => return response,
    };

    // The user message is on the timeline before the 202 goes out
    let exchange = match panel.open_text(&req.text).await {
        Ok(exchange) => exchange,
        Err(IgnoreReason::Blank) => {
            return error_response(StatusCode::BAD_REQUEST, "Message cannot be empty")
        }
        Err(IgnoreReason::Pending) => {
            return error_response(
                StatusCode::CONFLICT,
                "A reply is still pending, try again when it arrives",
            )
        }
        Err(IgnoreReason::Recording) => {
            return error_response(
                StatusCode::CONFLICT,
                "A recording is in progress, stop or cancel it first",
            )
        }
    };

    tokio::spawn(async move {
        let outcome = panel.session().complete(exchange).await;
        info!("Text exchange finished: {:?}", outcome);
    });

    StatusCode::ACCEPTED.into_response()
}

/// POST /panel/recording/start
pub async fn start_recording(State(state): State<AppState>) -> Response {
    let panel = match open_panel_or_404(&state).await {
        Ok(panel) => panel,
        Err(response) => return response,
    };

    match panel.start_recording().await {
        Ok(RecordingStart::Started) => (StatusCode::OK, Json(panel.render())).into_response(),
        Ok(RecordingStart::IgnoredWhilePending) => error_response(
            StatusCode::CONFLICT,
            "A reply is still pending, try again when it arrives",
        ),
        Ok(RecordingStart::AlreadyRecording) => {
            error_response(StatusCode::CONFLICT, "Already recording")
        }
        Err(e) => {
            error!("Failed to start recording: {}", e);
            // Notice stays queued for the shell's next render
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

/// POST /panel/recording/stop
/// Finalize the recording; the clip is sent in the background
pub async fn stop_recording(State(state): State<AppState>) -> Response {
    let panel = match open_panel_or_404(&state).await {
        Ok(panel) => panel,
        Err(response) => return response,
    };

    if !panel.is_recording() {
        return error_response(StatusCode::CONFLICT, "Not recording");
    }

    let exchange_panel = Arc::clone(&panel);
    tokio::spawn(async move {
        match exchange_panel.stop_recording().await {
            Some(outcome) => info!("Voice exchange finished: {:?}", outcome),
            None => info!("Recording was already stopped"),
        }
    });

    StatusCode::ACCEPTED.into_response()
}

/// POST /panel/recording/cancel
/// Drop the recording without sending it
pub async fn cancel_recording(State(state): State<AppState>) -> Response {
    let panel = match open_panel_or_404(&state).await {
        Ok(panel) => panel,
        Err(response) => return response,
    };

    if panel.cancel_recording().await {
        (StatusCode::OK, Json(panel.render())).into_response()
    } else {
        error_response(StatusCode::CONFLICT, "Not recording")
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
