pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod panel;
pub mod session;
pub mod transport;

pub use audio::{
    AudioClip, AudioRecorder, CaptureDevice, CaptureDeviceFactory, CaptureEvent, CaptureSource,
    FileCaptureDevice, RecordingState,
};
pub use config::Config;
pub use error::{DeviceAccessError, TransportError};
pub use http::{create_router, AppState};
pub use normalize::normalize;
pub use panel::{ChatPanel, ChatWidget, PanelView, RecordingStart};
pub use session::{Conversation, ExchangeOutcome, Message, Origin, SessionController};
pub use transport::{ExchangeInput, HttpTransport, Transport};
