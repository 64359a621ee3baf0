pub mod clip;
pub mod device;
pub mod file;
pub mod recorder;

pub use clip::AudioClip;
pub use device::{CaptureDevice, CaptureDeviceFactory, CaptureEvent, CaptureSource};
pub use file::FileCaptureDevice;
pub use recorder::{AudioRecorder, RecordingState};
