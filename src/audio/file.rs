use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::device::{CaptureDevice, CaptureEvent};
use crate::error::DeviceAccessError;

/// File-backed capture device
///
/// Replays an existing clip as if it were being recorded: the file's bytes are emitted
/// in `chunk_bytes` segments, one every `chunk_interval`, until the file is exhausted
/// or the device is stopped.
pub struct FileCaptureDevice {
    path: PathBuf,
    name: String,
    chunk_bytes: usize,
    chunk_interval: Duration,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FileCaptureDevice {
    pub fn new(path: impl Into<PathBuf>, chunk_bytes: usize, chunk_interval: Duration) -> Self {
        let path = path.into();
        Self {
            name: format!("file:{}", path.display()),
            path,
            chunk_bytes: chunk_bytes.max(1),
            chunk_interval,
            stop_tx: None,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for FileCaptureDevice {
    async fn acquire(&mut self) -> Result<mpsc::Receiver<CaptureEvent>, DeviceAccessError> {
        if self.task.is_some() {
            return Err(DeviceAccessError::Busy);
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                DeviceAccessError::PermissionDenied(format!("{}: {}", self.path.display(), e))
            }
            _ => DeviceAccessError::Unavailable(format!("{}: {}", self.path.display(), e)),
        })?;

        info!(
            "File capture started: {} ({} bytes, {}-byte segments)",
            self.path.display(),
            bytes.len(),
            self.chunk_bytes
        );

        let (tx, rx) = mpsc::channel(32);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let chunk_bytes = self.chunk_bytes;
        let interval = self.chunk_interval;

        let task = tokio::spawn(async move {
            for segment in bytes.chunks(chunk_bytes) {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                if tx.send(CaptureEvent::Data(segment.to_vec())).await.is_err() {
                    break;
                }
            }
            debug!("File capture stream closed");
        });

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Err means the file was already exhausted
            let _ = stop_tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.await.context("File capture task panicked")?;
        }

        Ok(())
    }

    fn release(&mut self) {
        self.stop_tx = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!("File capture released: {}", self.path.display());
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_streams_file_in_segments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.m4a");
        std::fs::write(&path, b"abcdefghij").unwrap();

        let mut device = FileCaptureDevice::new(&path, 4, Duration::ZERO);
        let mut rx = device.acquire().await.unwrap();

        let mut segments = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                CaptureEvent::Data(bytes) => segments.push(bytes),
                CaptureEvent::Error(e) => panic!("unexpected capture error: {}", e),
            }
        }

        assert_eq!(
            segments,
            vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ij".to_vec()]
        );

        device.stop().await.unwrap();
        device.release();
    }

    #[tokio::test]
    async fn test_stop_ends_the_stream_early() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.m4a");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();

        let mut device = FileCaptureDevice::new(&path, 16, Duration::from_secs(60));
        let mut rx = device.acquire().await.unwrap();

        device.stop().await.unwrap();

        assert!(rx.recv().await.is_none(), "nothing was due before stop");
        device.release();
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let mut device = FileCaptureDevice::new("/nonexistent/clip.m4a", 16, Duration::ZERO);

        let err = device.acquire().await.unwrap_err();

        assert!(matches!(err, DeviceAccessError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_second_acquire_is_busy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.m4a");
        std::fs::write(&path, vec![1u8; 64]).unwrap();

        let mut device = FileCaptureDevice::new(&path, 8, Duration::from_secs(60));
        let _rx = device.acquire().await.unwrap();

        assert_eq!(device.acquire().await.unwrap_err(), DeviceAccessError::Busy);

        device.release();
        assert!(device.acquire().await.is_ok(), "released device can be acquired again");
        device.release();
    }
}
