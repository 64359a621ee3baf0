use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::conversation::{Action, Conversation};
use super::message::Draft;
use crate::audio::AudioClip;
use crate::config::WidgetConfig;
use crate::error::TransportError;
use crate::normalize::normalize;
use crate::transport::{ExchangeInput, Transport};

/// Why a send did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty or whitespace
    Blank,
    /// Another exchange is still in flight
    Pending,
    /// The panel is recording; the clip goes out first
    Recording,
}

/// An exchange whose user message is already on the timeline
#[derive(Debug)]
#[must_use = "the session stays pending until the exchange is completed"]
pub struct OpenExchange {
    input: ExchangeInput,
}

impl OpenExchange {
    pub fn input(&self) -> &ExchangeInput {
        &self.input
    }
}

/// How a send ended. Failures are already on the timeline; this is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Ignored(IgnoreReason),
    /// Reply normalized and appended
    Replied,
    /// Transport failed, canned error appended
    Failed,
}

/// Owns the conversation of one panel and drives its exchanges
///
/// The controller holds the only sender of the conversation channel, so it is the single
/// mutator. At most one exchange is in flight; the pending gate is checked and set in the
/// same store update.
pub struct SessionController {
    id: Uuid,
    transport: Arc<dyn Transport>,
    texts: WidgetConfig,
    state: watch::Sender<Conversation>,
}

impl SessionController {
    /// Create a session seeded with the greeting
    pub fn new(transport: Arc<dyn Transport>, texts: WidgetConfig) -> Self {
        let id = Uuid::new_v4();
        let (state, _) = watch::channel(Conversation::seeded(&texts.greeting));

        info!("Created chat session {} (transport: {})", id, transport.name());

        Self {
            id,
            transport,
            texts,
            state,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot for rendering
    pub fn current_state(&self) -> Conversation {
        self.state.borrow().clone()
    }

    /// Notified on every conversation change
    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Send typed text. The user message is on the timeline before the request goes out.
    pub async fn send_text(&self, input: &str) -> ExchangeOutcome {
        match self.open_text(input) {
            Ok(exchange) => self.complete(exchange).await,
            Err(reason) => ExchangeOutcome::Ignored(reason),
        }
    }

    /// Send a recorded clip, possibly empty
    pub async fn send_audio(&self, clip: AudioClip) -> ExchangeOutcome {
        match self.open_audio(clip) {
            Ok(exchange) => self.complete(exchange).await,
            Err(reason) => ExchangeOutcome::Ignored(reason),
        }
    }

    /// Put the user message on the timeline and mark the session pending
    ///
    /// The returned exchange must be passed to [`complete`](Self::complete), which is
    /// the only way to clear the pending flag again.
    pub fn open_text(&self, input: &str) -> Result<OpenExchange, IgnoreReason> {
        if input.trim().is_empty() {
            debug!("Ignoring blank message");
            return Err(IgnoreReason::Blank);
        }

        if !self.submit(Draft::user(input)) {
            warn!("Message rejected: an exchange is already in flight");
            return Err(IgnoreReason::Pending);
        }

        info!("Session {}: sending text ({} chars)", self.id, input.chars().count());
        Ok(OpenExchange {
            input: ExchangeInput::Text(input.to_string()),
        })
    }

    /// Audio counterpart of [`open_text`](Self::open_text)
    pub fn open_audio(&self, clip: AudioClip) -> Result<OpenExchange, IgnoreReason> {
        if !self.submit(Draft::user_audio(&self.texts.audio_label)) {
            warn!("Voice message rejected: an exchange is already in flight");
            return Err(IgnoreReason::Pending);
        }

        info!("Session {}: sending voice message ({} bytes)", self.id, clip.len());
        Ok(OpenExchange {
            input: ExchangeInput::Audio(clip),
        })
    }

    /// Run an opened exchange against the transport and append the reply
    pub async fn complete(&self, exchange: OpenExchange) -> ExchangeOutcome {
        let error_text = match exchange.input {
            ExchangeInput::Text(_) => &self.texts.text_error,
            ExchangeInput::Audio(_) => &self.texts.audio_error,
        };

        let result = self.transport.send(exchange.input).await;
        self.resolve(result, error_text)
    }

    fn submit(&self, draft: Draft) -> bool {
        self.state
            .send_if_modified(|conversation| conversation.apply(Action::Submit(draft)))
    }

    fn resolve(&self, result: Result<String, TransportError>, error_text: &str) -> ExchangeOutcome {
        let (draft, outcome) = match result {
            Ok(raw) => (Draft::assistant(normalize(&raw)), ExchangeOutcome::Replied),
            Err(e) => {
                warn!("Session {}: exchange failed: {}", self.id, e);
                (Draft::assistant(error_text), ExchangeOutcome::Failed)
            }
        };

        self.state
            .send_if_modified(|conversation| conversation.apply(Action::Resolve(draft)));

        debug!("Session {}: exchange resolved ({:?})", self.id, outcome);
        outcome
    }
}
