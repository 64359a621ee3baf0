//! Audio capture state machine.
//!
//! Transitions:
//! - Idle -> Armed (start: acquiring the device)
//! - Armed -> Recording (device acquired, segments are being collected)
//! - Armed -> Idle (device denied or unavailable)
//! - Recording -> Finalizing (stop: device flushing, bounded by the flush timeout)
//! - Finalizing -> Idle (clip assembled, device released)
//! - Recording -> Idle (cancel: device released, segments dropped)
//!
//! The device is never held while Idle. Every exit from Recording/Finalizing releases it
//! exactly once, and dropping the recorder releases it too.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::clip::AudioClip;
use super::device::{CaptureDevice, CaptureEvent};
use crate::error::DeviceAccessError;

/// Default bound on waiting for the device's final flush
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle state of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording. The device is not held.
    Idle,
    /// Waiting for the device to be acquired.
    Armed,
    /// Collecting segments from the device.
    Recording,
    /// Device stopped, waiting for its final flush.
    Finalizing,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Armed => write!(f, "Armed"),
            RecordingState::Recording => write!(f, "Recording"),
            RecordingState::Finalizing => write!(f, "Finalizing"),
        }
    }
}

/// Records clips from one capture device
pub struct AudioRecorder {
    device: Box<dyn CaptureDevice>,
    state: watch::Sender<RecordingState>,
    /// Segments of the current recording, in arrival order
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Drains the device stream into `chunks`; yields the capture error, if any
    collector: Option<JoinHandle<Option<String>>>,
    acquired: bool,
    flush_timeout: Duration,
}

impl AudioRecorder {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        let (state, _) = watch::channel(RecordingState::Idle);
        Self {
            device,
            state,
            chunks: Arc::new(Mutex::new(Vec::new())),
            collector: None,
            acquired: false,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    pub fn state(&self) -> RecordingState {
        *self.state.borrow()
    }

    /// Watch state changes without holding the recorder
    pub fn subscribe(&self) -> watch::Receiver<RecordingState> {
        self.state.subscribe()
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    /// Acquire the device and start collecting segments
    pub async fn start(&mut self) -> Result<(), DeviceAccessError> {
        if self.state() != RecordingState::Idle {
            warn!("Recording already in progress ({})", self.state());
            return Err(DeviceAccessError::Busy);
        }

        self.set_state(RecordingState::Armed);
        info!("Acquiring capture device: {}", self.device.name());

        let stream = match self.device.acquire().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to acquire capture device {}: {}", self.device.name(), e);
                self.set_state(RecordingState::Idle);
                return Err(e);
            }
        };
        self.acquired = true;

        self.chunks.lock().await.clear();
        self.collector = Some(tokio::spawn(collect(stream, Arc::clone(&self.chunks))));

        self.set_state(RecordingState::Recording);
        info!("Recording started on {}", self.device.name());

        Ok(())
    }

    /// Stop recording and assemble the clip
    ///
    /// Always yields a clip when a recording was in progress, even an empty one.
    /// Returns `None` when there was nothing to stop.
    pub async fn stop(&mut self) -> Option<AudioClip> {
        if self.state() != RecordingState::Recording {
            warn!("Stop requested while {}", self.state());
            return None;
        }

        self.set_state(RecordingState::Finalizing);
        info!("Stopping capture device: {}", self.device.name());

        self.stop_device().await;

        if let Some(mut collector) = self.collector.take() {
            match tokio::time::timeout(self.flush_timeout, &mut collector).await {
                Ok(Ok(Some(capture_error))) => {
                    warn!("Capture ended early: {}", capture_error);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => error!("Capture collector panicked: {}", e),
                Err(_) => {
                    warn!(
                        "Capture device {} did not flush within {:?}, keeping what arrived",
                        self.device.name(),
                        self.flush_timeout
                    );
                    collector.abort();
                }
            }
        }

        let chunks = std::mem::take(&mut *self.chunks.lock().await);
        self.release_device();
        self.set_state(RecordingState::Idle);

        let clip = AudioClip::from_chunks(chunks);
        info!(
            "Recording finalized: {} bytes in {} segments",
            clip.len(),
            clip.chunk_count()
        );

        Some(clip)
    }

    /// Stop recording and drop what was captured
    pub async fn cancel(&mut self) -> bool {
        if self.state() != RecordingState::Recording {
            return false;
        }

        info!("Cancelling recording on {}", self.device.name());

        self.stop_device().await;
        if let Some(collector) = self.collector.take() {
            collector.abort();
        }
        self.chunks.lock().await.clear();
        self.release_device();
        self.set_state(RecordingState::Idle);

        true
    }

    /// Ask the device to stop, waiting at most `flush_timeout` for it to answer
    async fn stop_device(&mut self) {
        match tokio::time::timeout(self.flush_timeout, self.device.stop()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Capture device {} failed to stop cleanly: {}", self.device.name(), e);
            }
            Err(_) => warn!(
                "Capture device {} did not stop within {:?}, releasing it anyway",
                self.device.name(),
                self.flush_timeout
            ),
        }
    }

    fn release_device(&mut self) {
        if self.acquired {
            self.device.release();
            self.acquired = false;
        }
    }

    fn set_state(&self, state: RecordingState) {
        self.state.send_replace(state);
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        if let Some(collector) = self.collector.take() {
            collector.abort();
        }
        if self.acquired {
            warn!("Recorder dropped while holding {}, releasing", self.device.name());
            self.release_device();
        }
    }
}

async fn collect(
    mut stream: mpsc::Receiver<CaptureEvent>,
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
) -> Option<String> {
    while let Some(event) = stream.recv().await {
        match event {
            CaptureEvent::Data(segment) => chunks.lock().await.push(segment),
            CaptureEvent::Error(e) => {
                error!("Capture device reported an error: {}", e);
                return Some(e);
            }
        }
    }
    None
}
