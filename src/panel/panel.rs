use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use super::view::PanelView;
use crate::audio::{AudioRecorder, CaptureDevice, RecordingState};
use crate::config::WidgetConfig;
use crate::error::DeviceAccessError;
use crate::session::{ExchangeOutcome, IgnoreReason, OpenExchange, SessionController};
use crate::transport::Transport;

/// Result of a start-recording intent that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingStart {
    Started,
    /// An exchange is in flight; the voice button is disabled meanwhile
    IgnoredWhilePending,
    AlreadyRecording,
}

/// True for the key press that submits the draft: Enter without Shift
pub fn is_submit_key(key: &str, shift: bool) -> bool {
    key == "Enter" && !shift
}

/// One open chat panel: a conversation plus the recorder feeding it
///
/// Dropping the panel discards the conversation and releases the capture device.
pub struct ChatPanel {
    session: SessionController,
    recorder: Mutex<AudioRecorder>,
    recording: watch::Receiver<RecordingState>,
    minimized: AtomicBool,
    notice: watch::Sender<Option<String>>,
    title: String,
    device_error: String,
    audio_error: String,
}

impl ChatPanel {
    pub fn new(
        transport: Arc<dyn Transport>,
        device: Box<dyn CaptureDevice>,
        texts: WidgetConfig,
    ) -> Self {
        Self::with_recorder(transport, AudioRecorder::new(device), texts)
    }

    pub fn with_recorder(
        transport: Arc<dyn Transport>,
        recorder: AudioRecorder,
        texts: WidgetConfig,
    ) -> Self {
        let recording = recorder.subscribe();
        let (notice, _) = watch::channel(None);
        let title = texts.title.clone();
        let device_error = texts.device_error.clone();
        let audio_error = texts.audio_error.clone();

        Self {
            session: SessionController::new(transport, texts),
            recorder: Mutex::new(recorder),
            recording,
            minimized: AtomicBool::new(false),
            notice,
            title,
            device_error,
            audio_error,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized.load(Ordering::SeqCst)
    }

    pub fn minimize(&self) {
        self.minimized.store(true, Ordering::SeqCst);
    }

    pub fn restore(&self) {
        self.minimized.store(false, Ordering::SeqCst);
    }

    pub fn recording_state(&self) -> RecordingState {
        *self.recording.borrow()
    }

    pub fn is_recording(&self) -> bool {
        self.recording_state() == RecordingState::Recording
    }

    /// Send the typed draft
    pub async fn submit_text(&self, text: &str) -> ExchangeOutcome {
        match self.open_text(text).await {
            Ok(exchange) => self.session.complete(exchange).await,
            Err(reason) => ExchangeOutcome::Ignored(reason),
        }
    }

    /// Put the typed draft on the timeline without waiting for the reply
    ///
    /// Rejected while a recording is open, so the clip is never shut out by a text
    /// exchange. Complete the result with [`SessionController::complete`].
    pub async fn open_text(&self, text: &str) -> Result<OpenExchange, IgnoreReason> {
        if text.trim().is_empty() {
            return Err(IgnoreReason::Blank);
        }

        let recorder = self.recorder.lock().await;
        if recorder.state() != RecordingState::Idle {
            warn!("Message rejected: recording in progress ({})", recorder.state());
            return Err(IgnoreReason::Recording);
        }
        self.session.open_text(text)
    }

    /// Acquire the capture device and start recording
    ///
    /// A device failure leaves the recorder idle and posts a notice for the shell.
    pub async fn start_recording(&self) -> Result<RecordingStart, DeviceAccessError> {
        let mut recorder = self.recorder.lock().await;
        if self.session.is_pending() {
            return Ok(RecordingStart::IgnoredWhilePending);
        }
        if recorder.state() != RecordingState::Idle {
            return Ok(RecordingStart::AlreadyRecording);
        }

        match recorder.start().await {
            Ok(()) => Ok(RecordingStart::Started),
            Err(e) => {
                warn!("Microphone access failed: {}", e);
                self.notice.send_replace(Some(self.device_error.clone()));
                Err(e)
            }
        }
    }

    /// Stop recording and send the clip, even an empty one
    ///
    /// Returns `None` when nothing was being recorded.
    pub async fn stop_recording(&self) -> Option<ExchangeOutcome> {
        let opened = {
            let mut recorder = self.recorder.lock().await;
            let clip = recorder.stop().await?;
            info!("Handing {}-byte clip to session {}", clip.len(), self.session.id());
            // Opened under the recorder lock so no text exchange can slip in first
            self.session.open_audio(clip)
        };

        match opened {
            Ok(exchange) => Some(self.session.complete(exchange).await),
            Err(reason) => {
                warn!("Voice message could not be sent: {:?}", reason);
                self.notice.send_replace(Some(self.audio_error.clone()));
                Some(ExchangeOutcome::Ignored(reason))
            }
        }
    }

    /// Stop recording without sending anything
    pub async fn cancel_recording(&self) -> bool {
        self.recorder.lock().await.cancel().await
    }

    /// Take the pending notice, if any. Each notice is delivered once.
    pub fn take_notice(&self) -> Option<String> {
        self.notice.send_replace(None)
    }

    /// Render the panel. Delivers (and clears) the pending notice.
    pub fn render(&self) -> PanelView {
        let conversation = self.session.current_state();
        PanelView::build(
            self.session.id(),
            &self.title,
            self.is_minimized(),
            &conversation,
            self.recording_state(),
            self.take_notice(),
        )
    }
}
