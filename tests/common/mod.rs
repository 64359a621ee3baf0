// Test doubles for the transport and the capture device.

#![allow(dead_code)]

use anyhow::Result;
use chat_widget::audio::{CaptureDevice, CaptureEvent, RecordingState};
use chat_widget::{DeviceAccessError, ExchangeInput, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch, Notify};

// ============================================================================
// Transport
// ============================================================================

/// Scripted transport: records every input and answers from a queue.
/// An empty queue answers `{"response": "ok"}`.
#[derive(Clone, Default)]
pub struct FakeTransport {
    replies: Arc<Mutex<VecDeque<Result<String, TransportError>>>>,
    calls: Arc<Mutex<Vec<ExchangeInput>>>,
    /// When set, each exchange waits for one notification before answering
    gate: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: &str) -> Self {
        let transport = Self::new();
        transport.push_reply(Ok(reply.to_string()));
        transport
    }

    pub fn failing(error: TransportError) -> Self {
        let transport = Self::new();
        transport.push_reply(Err(error));
        transport
    }

    /// Hold every exchange until `gate.notify_one()`
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_reply(&self, reply: Result<String, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<ExchangeInput> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send(&self, input: ExchangeInput) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push(input);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(r#"{"response": "ok"}"#.to_string()))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Capture device
// ============================================================================

/// Counters shared between a test and the device it handed to a recorder
#[derive(Default)]
pub struct DeviceProbe {
    pub acquired: AtomicUsize,
    pub stopped: AtomicUsize,
    pub released: AtomicUsize,
    /// Recorder state observed while the device was being stopped
    pub state_on_stop: Mutex<Option<RecordingState>>,
    /// Filled by the test once the recorder exists
    pub recorder_state: Mutex<Option<watch::Receiver<RecordingState>>>,
}

impl DeviceProbe {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn state_on_stop(&self) -> Option<RecordingState> {
        *self.state_on_stop.lock().unwrap()
    }
}

/// Device that emits a fixed script of events on acquire and keeps the stream
/// open until stopped.
pub struct FakeDevice {
    script: Vec<CaptureEvent>,
    deny: Option<DeviceAccessError>,
    /// Never close the stream on stop (simulates a device that does not flush)
    hang_on_stop: bool,
    /// `stop` never returns
    stuck_on_stop: bool,
    tx: Option<mpsc::Sender<CaptureEvent>>,
    probe: Arc<DeviceProbe>,
}

impl FakeDevice {
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> (Self, Arc<DeviceProbe>) {
        Self::with_script(chunks.into_iter().map(CaptureEvent::Data).collect())
    }

    pub fn with_script(script: Vec<CaptureEvent>) -> (Self, Arc<DeviceProbe>) {
        let probe = Arc::new(DeviceProbe::default());
        let device = Self {
            script,
            deny: None,
            hang_on_stop: false,
            stuck_on_stop: false,
            tx: None,
            probe: Arc::clone(&probe),
        };
        (device, probe)
    }

    pub fn denied(error: DeviceAccessError) -> (Self, Arc<DeviceProbe>) {
        let (mut device, probe) = Self::with_script(Vec::new());
        device.deny = Some(error);
        (device, probe)
    }

    pub fn hanging(chunks: Vec<Vec<u8>>) -> (Self, Arc<DeviceProbe>) {
        let (mut device, probe) = Self::with_chunks(chunks);
        device.hang_on_stop = true;
        (device, probe)
    }

    pub fn stuck(chunks: Vec<Vec<u8>>) -> (Self, Arc<DeviceProbe>) {
        let (mut device, probe) = Self::with_chunks(chunks);
        device.stuck_on_stop = true;
        (device, probe)
    }
}

#[async_trait::async_trait]
impl CaptureDevice for FakeDevice {
    async fn acquire(&mut self) -> Result<mpsc::Receiver<CaptureEvent>, DeviceAccessError> {
        if let Some(error) = &self.deny {
            return Err(error.clone());
        }

        self.probe.acquired.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(self.script.len().max(1));
        for event in &self.script {
            tx.try_send(event.clone())
                .expect("channel sized for the script");
        }
        self.tx = Some(tx);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.probe.stopped.fetch_add(1, Ordering::SeqCst);

        let observed = self
            .probe
            .recorder_state
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| *rx.borrow());
        *self.probe.state_on_stop.lock().unwrap() = observed;

        if self.stuck_on_stop {
            std::future::pending::<()>().await;
        }

        if !self.hang_on_stop {
            self.tx = None;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.probe.released.fetch_add(1, Ordering::SeqCst);
        self.tx = None;
    }

    fn name(&self) -> &str {
        "fake-mic"
    }
}
