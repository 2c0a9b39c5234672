// In-process audio backend
//
// Frames are pushed by the owner of a `ChannelFeeder`. Device failures can be
// queued up front to exercise the start-up error paths.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::info;

use super::backend::{AudioBackend, AudioFrame, CaptureConstraints, DeviceError};

#[derive(Default)]
struct Shared {
    sender: Option<mpsc::Sender<AudioFrame>>,
    failures: VecDeque<DeviceError>,
    starts: Vec<CaptureConstraints>,
}

/// Backend fed from in-process code
pub struct ChannelBackend {
    shared: Arc<Mutex<Shared>>,
}

/// Handle used to push frames into a running `ChannelBackend`
#[derive(Clone)]
pub struct ChannelFeeder {
    shared: Arc<Mutex<Shared>>,
}

impl ChannelBackend {
    pub fn new() -> (Self, ChannelFeeder) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            ChannelFeeder { shared },
        )
    }
}

impl ChannelFeeder {
    /// Make the next `start` call fail with `error`
    pub fn fail_next_start(&self, error: DeviceError) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.failures.push_back(error);
        }
    }

    /// Push a frame; returns false when capture is not running
    pub async fn push(&self, frame: AudioFrame) -> bool {
        let sender = self.shared.lock().ok().and_then(|s| s.sender.clone());
        match sender {
            Some(sender) => sender.send(frame).await.is_ok(),
            None => false,
        }
    }

    /// Close the frame channel as a failing device would
    pub fn disconnect(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.sender = None;
        }
    }

    /// Constraints passed to every `start` attempt, in order
    pub fn start_attempts(&self) -> Vec<CaptureConstraints> {
        self.shared
            .lock()
            .map(|s| s.starts.clone())
            .unwrap_or_default()
    }

    pub fn is_capturing(&self) -> bool {
        self.shared
            .lock()
            .map(|s| s.sender.is_some())
            .unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl AudioBackend for ChannelBackend {
    async fn start(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<mpsc::Receiver<AudioFrame>, DeviceError> {
        let mut shared = self
            .shared
            .lock()
            .map_err(|_| DeviceError::Other("channel backend poisoned".to_string()))?;

        shared.starts.push(constraints.clone());

        if let Some(error) = shared.failures.pop_front() {
            return Err(error);
        }
        if shared.sender.is_some() {
            return Err(DeviceError::Busy);
        }

        let (tx, rx) = mpsc::channel(100);
        shared.sender = Some(tx);
        info!("Channel backend started");

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Ok(mut shared) = self.shared.lock() {
            // Dropping the sender closes the frame channel
            shared.sender = None;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.shared
            .lock()
            .map(|s| s.sender.is_some())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "channel"
    }
}
