use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment prefix for overrides, e.g. `CHAT_WIDGET__ENDPOINT__URL`
pub const ENV_PREFIX: &str = "CHAT_WIDGET";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "chat-widget".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8088,
        }
    }
}

/// The remote endpoint every exchange is posted to
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    /// Upper bound for one exchange, connect + response
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture source: `microphone` or `file:<path>`
    pub source: String,
    /// Filename sent with the audio form part
    pub file_name: String,
    /// Content type sent with the audio form part
    pub mime_type: String,
    /// Segment size emitted by file-backed capture
    pub chunk_bytes: usize,
    /// Delay between segments emitted by file-backed capture
    pub chunk_interval_ms: u64,
    /// How long to wait for the device to flush after stop
    pub flush_timeout_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            source: "microphone".to_string(),
            file_name: "input.m4a".to_string(),
            mime_type: "audio/m4a".to_string(),
            chunk_bytes: 4096,
            chunk_interval_ms: 100,
            flush_timeout_ms: 2000,
        }
    }
}

/// User-facing texts of the panel
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub title: String,
    pub greeting: String,
    pub audio_label: String,
    pub text_error: String,
    pub audio_error: String,
    pub device_error: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: "Chat AI".to_string(),
            greeting: "Hi! How can I help you today?".to_string(),
            audio_label: "🎵 Voice message sent".to_string(),
            text_error: "Sorry, an error occurred. Please try again later.".to_string(),
            audio_error: "Sorry, an error occurred with the voice message. Please try again later."
                .to_string(),
            device_error: "Could not access the microphone. Check the permissions.".to_string(),
        }
    }
}

impl Config {
    /// Load from an optional config file plus `CHAT_WIDGET__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: &str, env_prefix: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration (is endpoint.url set?)")
    }

    /// Defaults for everything except the endpoint
    pub fn for_endpoint(url: impl Into<String>) -> Self {
        Self {
            service: ServiceConfig::default(),
            endpoint: EndpointConfig::new(url),
            audio: AudioConfig::default(),
            widget: WidgetConfig::default(),
        }
    }
}
