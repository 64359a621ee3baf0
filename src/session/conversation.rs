use serde::Serialize;
use tracing::warn;

use super::message::{Draft, Message};

/// Conversation state of one panel
///
/// Only changed through [`Action`]s applied by the session controller.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    timeline: Vec<Message>,
    /// True while an exchange is in flight
    pending: bool,
    #[serde(skip)]
    last_id: u64,
}

/// A state change of the conversation
#[derive(Debug)]
pub(crate) enum Action {
    /// Optimistic user message; opens an exchange. Rejected while one is open.
    Submit(Draft),
    /// Reply (or canned error) closing the open exchange
    Resolve(Draft),
}

impl Conversation {
    pub(crate) fn seeded(greeting: &str) -> Self {
        let mut conversation = Self {
            timeline: Vec::new(),
            pending: false,
            last_id: 0,
        };
        conversation.append(Draft::assistant(greeting));
        conversation
    }

    /// Messages in display order
    pub fn timeline(&self) -> &[Message] {
        &self.timeline
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.timeline.last()
    }

    /// Apply an action; returns whether the state changed
    pub(crate) fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Submit(draft) => {
                if self.pending {
                    return false;
                }
                self.append(draft);
                self.pending = true;
            }
            Action::Resolve(draft) => {
                if !self.pending {
                    warn!("Resolving an exchange that was not pending");
                }
                self.append(draft);
                self.pending = false;
            }
        }
        true
    }

    fn append(&mut self, draft: Draft) {
        self.last_id += 1;
        self.timeline.push(Message::new(self.last_id, draft));
    }
}
