use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{ExchangeInput, Transport};
use crate::config::Config;
use crate::error::TransportError;

/// Multipart form field carrying typed text
pub const PROMPT_FIELD: &str = "prompt";
/// Multipart form field carrying the recorded clip
pub const FILE_FIELD: &str = "file";

/// Default timeout for establishing the connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport posting multipart forms to a single endpoint
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    audio_file_name: String,
    audio_mime_type: String,
}

impl HttpTransport {
    /// Create a transport for `endpoint`; every exchange fails after `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            audio_file_name: "input.m4a".to_string(),
            audio_mime_type: "audio/m4a".to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = Self::new(
            config.endpoint.url.clone(),
            Duration::from_secs(config.endpoint.timeout_secs),
        )?
        .with_audio_part(config.audio.file_name.clone(), config.audio.mime_type.clone());

        info!(
            "HTTP transport ready: {} (timeout {}s)",
            transport.endpoint, config.endpoint.timeout_secs
        );

        Ok(transport)
    }

    /// Override the filename and content type of the audio part
    pub fn with_audio_part(
        mut self,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        self.audio_file_name = file_name.into();
        self.audio_mime_type = mime_type.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(&self, input: ExchangeInput) -> Result<Form, TransportError> {
        match input {
            ExchangeInput::Text(text) => Ok(Form::new().text(PROMPT_FIELD, text)),
            ExchangeInput::Audio(clip) => {
                let part = Part::bytes(clip.into_bytes())
                    .file_name(self.audio_file_name.clone())
                    .mime_str(&self.audio_mime_type)
                    .map_err(|e| {
                        TransportError::InvalidRequest(format!(
                            "bad audio content type '{}': {}",
                            self.audio_mime_type, e
                        ))
                    })?;
                Ok(Form::new().part(FILE_FIELD, part))
            }
        }
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                after: self.timeout,
            }
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, input: ExchangeInput) -> Result<String, TransportError> {
        let kind = input.kind();
        let form = self.form(input)?;

        debug!("Posting {} exchange to {}", kind, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Endpoint answered {} to {} exchange", status, kind);
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        info!(
            "Received reply to {} exchange ({} bytes, HTTP {})",
            kind,
            body.len(),
            status.as_u16()
        );

        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
