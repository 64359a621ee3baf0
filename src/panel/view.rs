use serde::Serialize;
use uuid::Uuid;

use crate::audio::RecordingState;
use crate::session::{Conversation, Message, Origin};

/// Everything a shell needs to draw the panel
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub session_id: Uuid,
    pub title: String,
    pub minimized: bool,
    /// Typing indicator, shown exactly while an exchange is in flight
    pub loading: bool,
    /// Recording indicator, shown exactly while the recorder is recording
    pub recording: bool,
    pub recording_state: RecordingState,
    /// One-shot notice (e.g. microphone access denied)
    pub notice: Option<String>,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub id: u64,
    pub origin: Origin,
    pub text: String,
    pub is_audio: bool,
    /// Local `HH:MM`
    pub time: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().value(),
            origin: message.origin(),
            text: message.text().to_string(),
            is_audio: message.is_audio(),
            time: message.display_time(),
        }
    }
}

impl PanelView {
    pub(crate) fn build(
        session_id: Uuid,
        title: &str,
        minimized: bool,
        conversation: &Conversation,
        recording_state: RecordingState,
        notice: Option<String>,
    ) -> Self {
        Self {
            session_id,
            title: title.to_string(),
            minimized,
            loading: conversation.is_pending(),
            recording: recording_state == RecordingState::Recording,
            recording_state,
            notice,
            messages: conversation.timeline().iter().map(MessageView::from).collect(),
        }
    }
}
