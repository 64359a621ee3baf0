use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::panel::ChatPanel;
use crate::audio::recorder::DEFAULT_FLUSH_TIMEOUT;
use crate::audio::{AudioRecorder, CaptureDevice, CaptureDeviceFactory, CaptureSource};
use crate::config::{Config, WidgetConfig};
use crate::transport::{HttpTransport, Transport};

/// Builds a fresh capture device for each panel
pub type DeviceProvider = Arc<dyn Fn() -> Box<dyn CaptureDevice> + Send + Sync>;

/// The floating widget: a toggle button and at most one open panel
///
/// Opening creates a new conversation; closing discards it.
pub struct ChatWidget {
    transport: Arc<dyn Transport>,
    devices: DeviceProvider,
    texts: WidgetConfig,
    flush_timeout: Duration,
    panel: Option<Arc<ChatPanel>>,
}

impl ChatWidget {
    pub fn new(transport: Arc<dyn Transport>, devices: DeviceProvider, texts: WidgetConfig) -> Self {
        Self {
            transport,
            devices,
            texts,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            panel: None,
        }
    }

    /// Bound on waiting for the capture device's final flush
    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    /// HTTP transport and the configured capture source
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport =
            HttpTransport::from_config(config).context("Failed to create HTTP transport")?;
        let source: CaptureSource = config
            .audio
            .source
            .parse()
            .context("Invalid audio.source")?;

        let audio = config.audio.clone();
        let devices: DeviceProvider =
            Arc::new(move || CaptureDeviceFactory::create(source.clone(), &audio));

        Ok(
            Self::new(Arc::new(transport), devices, config.widget.clone())
                .with_flush_timeout(Duration::from_millis(config.audio.flush_timeout_ms)),
        )
    }

    pub fn is_open(&self) -> bool {
        self.panel.is_some()
    }

    pub fn panel(&self) -> Option<Arc<ChatPanel>> {
        self.panel.clone()
    }

    /// Open the panel, or return the one already open
    pub fn open(&mut self) -> Arc<ChatPanel> {
        if let Some(panel) = &self.panel {
            return Arc::clone(panel);
        }

        let recorder = AudioRecorder::new((self.devices)()).with_flush_timeout(self.flush_timeout);
        let panel = Arc::new(ChatPanel::with_recorder(
            Arc::clone(&self.transport),
            recorder,
            self.texts.clone(),
        ));
        info!("Chat panel opened (session {})", panel.session().id());

        self.panel = Some(Arc::clone(&panel));
        panel
    }

    /// Close the panel; returns whether one was open
    pub fn close(&mut self) -> bool {
        match self.panel.take() {
            Some(panel) => {
                info!("Chat panel closed (session {})", panel.session().id());
                true
            }
            None => false,
        }
    }

    /// Toggle button: open when closed, close when open
    pub fn toggle(&mut self) -> Option<Arc<ChatPanel>> {
        if self.close() {
            None
        } else {
            Some(self.open())
        }
    }
}
