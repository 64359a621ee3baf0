use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-session message identifier, assigned in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

/// One entry of the timeline. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    id: MessageId,
    text: String,
    origin: Origin,
    /// Display only; the timeline order is authoritative
    created_at: DateTime<Utc>,
    /// User message recorded from a clip rather than typed
    is_audio: bool,
}

impl Message {
    pub(crate) fn new(id: u64, draft: Draft) -> Self {
        Self {
            id: MessageId(id),
            text: draft.text,
            origin: draft.origin,
            created_at: Utc::now(),
            is_audio: draft.is_audio,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_audio(&self) -> bool {
        self.is_audio
    }

    /// Creation time as local `HH:MM`
    pub fn display_time(&self) -> String {
        self.created_at.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// A message before the conversation assigns its id
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    text: String,
    origin: Origin,
    is_audio: bool,
}

impl Draft {
    pub(crate) fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
            is_audio: false,
        }
    }

    pub(crate) fn user_audio(label: impl Into<String>) -> Self {
        Self {
            text: label.into(),
            origin: Origin::User,
            is_audio: true,
        }
    }

    pub(crate) fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Assistant,
            is_audio: false,
        }
    }
}
