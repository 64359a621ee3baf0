use crate::panel::ChatWidget;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The widget whose panel the shell is driving
    pub widget: Arc<RwLock<ChatWidget>>,
}

impl AppState {
    pub fn new(widget: ChatWidget) -> Self {
        Self {
            widget: Arc::new(RwLock::new(widget)),
        }
    }
}
