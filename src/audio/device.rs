use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;

use super::file::FileCaptureDevice;
use crate::config::AudioConfig;
use crate::error::DeviceAccessError;

/// One item of the capture stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A segment of encoded audio, in arrival order
    Data(Vec<u8>),
    /// The device failed mid-recording; no more data follows
    Error(String),
}

/// Capture device capability
///
/// The recorder drives a device through one cycle per recording:
/// `acquire` → segments on the returned stream → `stop` (final flush, stream closes) → `release`.
///
/// Implementations:
/// - File: streams an existing clip in fixed-size segments (CLI, demos, tests)
/// - Microphone: needs a native backend, reports `Unavailable` otherwise
#[async_trait::async_trait]
pub trait CaptureDevice: Send {
    /// Acquire the device and start capturing
    ///
    /// Returns the stream of captured segments. The stream ends after `stop` has
    /// flushed the last buffered segment.
    async fn acquire(&mut self) -> Result<mpsc::Receiver<CaptureEvent>, DeviceAccessError>;

    /// Stop capturing and flush buffered data
    async fn stop(&mut self) -> Result<()>;

    /// Give the device back. Called once per successful `acquire`.
    fn release(&mut self);

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// Microphone input
    Microphone,
    /// File input (prerecorded clip)
    File(PathBuf),
}

impl FromStr for CaptureSource {
    type Err = anyhow::Error;

    /// Parses `microphone` or `file:<path>`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "microphone" | "mic" => Ok(Self::Microphone),
            other => match other.strip_prefix("file:") {
                Some(path) if !path.is_empty() => Ok(Self::File(PathBuf::from(path))),
                _ => anyhow::bail!(
                    "Unknown capture source '{}' (expected 'microphone' or 'file:<path>')",
                    other
                ),
            },
        }
    }
}

/// Capture device factory
pub struct CaptureDeviceFactory;

impl CaptureDeviceFactory {
    /// Create a capture device for the given source
    pub fn create(source: CaptureSource, config: &AudioConfig) -> Box<dyn CaptureDevice> {
        match source {
            CaptureSource::File(path) => Box::new(FileCaptureDevice::new(
                path,
                config.chunk_bytes,
                Duration::from_millis(config.chunk_interval_ms),
            )),
            CaptureSource::Microphone => Box::new(NoMicrophone),
        }
    }
}

/// Stand-in for builds without a native microphone backend
struct NoMicrophone;

#[async_trait::async_trait]
impl CaptureDevice for NoMicrophone {
    async fn acquire(&mut self) -> Result<mpsc::Receiver<CaptureEvent>, DeviceAccessError> {
        Err(DeviceAccessError::Unavailable(
            "no microphone backend in this build; use a file:<path> capture source".to_string(),
        ))
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) {}

    fn name(&self) -> &str {
        "microphone"
    }
}
