//! Outbound exchanges with the reply endpoint
//!
//! One call = one request/response round trip. No retries at this layer.

mod http;

pub use http::HttpTransport;

use crate::audio::AudioClip;
use crate::error::TransportError;

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeInput {
    /// Typed message, posted as the `prompt` form field
    Text(String),
    /// Recorded clip, posted as the `file` form part
    Audio(AudioClip),
}

impl ExchangeInput {
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeInput::Text(_) => "text",
            ExchangeInput::Audio(_) => "audio",
        }
    }
}

/// Exchange transport trait
///
/// Implementations:
/// - HTTP: multipart POST to the configured endpoint
/// - Tests: scripted fakes
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange and return the raw reply body, unparsed
    async fn send(&self, input: ExchangeInput) -> Result<String, TransportError>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}
