use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::feedback::{FeedbackFrame, LiveFeedback};
use crate::audio::{convert, AudioBackend, AudioBlob, AudioFrame, CaptureConstraints, DeviceError, FrequencyAnalyser};

/// Recording lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Idle,
    RequestingDevice,
    Recording,
    Stopping,
}

/// Result of a stop request
#[derive(Debug)]
pub enum StopOutcome {
    /// Nothing was recording
    NotRecording,
    /// Recording ran but produced no samples
    NoAudio,
    /// Captured audio, ready for transcription
    Captured(AudioBlob),
}

/// Running capture: frame collector task plus its stop signal
struct Capture {
    task: JoinHandle<Vec<AudioFrame>>,
    stop_tx: oneshot::Sender<()>,
}

/// Fires when the device closes the frame channel before stop was requested.
///
/// Resolves to `Err` when the capture ends normally.
pub struct CaptureLost {
    /// Capture the signal belongs to, see [`RecordingController::capture_id`]
    pub capture_id: u64,
    pub signal: oneshot::Receiver<()>,
}

/// Owns the audio backend and drives `Idle -> RequestingDevice -> Recording -> Stopping -> Idle`
pub struct RecordingController {
    backend: Box<dyn AudioBackend>,
    preferred: CaptureConstraints,
    state: RecordingState,
    capture: Option<Capture>,
    capture_id: u64,
    lost: Option<CaptureLost>,
    analyser: Arc<Mutex<FrequencyAnalyser>>,
    feedback: LiveFeedback,
}

impl RecordingController {
    pub fn new(backend: Box<dyn AudioBackend>, preferred: CaptureConstraints, bar_count: usize) -> Self {
        info!("Recording controller using {} backend", backend.name());

        Self {
            backend,
            preferred,
            state: RecordingState::Idle,
            capture: None,
            capture_id: 0,
            lost: None,
            analyser: Arc::new(Mutex::new(FrequencyAnalyser::new())),
            feedback: LiveFeedback::new(bar_count),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Id of the latest capture; bumped on every successful start
    pub fn capture_id(&self) -> u64 {
        self.capture_id
    }

    /// Take the lost-input signal of the running capture (once per capture)
    pub fn take_capture_lost(&mut self) -> Option<CaptureLost> {
        self.lost.take()
    }

    pub fn feedback(&self) -> watch::Receiver<FeedbackFrame> {
        self.feedback.subscribe()
    }

    pub fn feedback_frame(&self) -> FeedbackFrame {
        self.feedback.current()
    }

    /// Acquire the input device and start capturing.
    ///
    /// Returns `Ok(false)` when a recording is already starting or running.
    /// On error the controller is back in `Idle` with nothing acquired.
    pub async fn start(&mut self) -> Result<bool, DeviceError> {
        if self.state != RecordingState::Idle {
            warn!("Recording already active ({:?}), ignoring start", self.state);
            return Ok(false);
        }

        info!("Requesting audio input from {} backend", self.backend.name());
        self.state = RecordingState::RequestingDevice;

        let audio_rx = match self.open_input().await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Failed to acquire audio input: {}", e);
                self.state = RecordingState::Idle;
                return Err(e);
            }
        };

        if let Ok(mut analyser) = self.analyser.lock() {
            analyser.clear();
        }

        self.capture_id += 1;
        let (stop_tx, stop_rx) = oneshot::channel();
        let (lost_tx, lost_rx) = oneshot::channel();
        let task = tokio::spawn(collect_frames(
            audio_rx,
            stop_rx,
            lost_tx,
            Arc::clone(&self.analyser),
            self.preferred.sample_rate,
            self.preferred.channels,
        ));

        self.capture = Some(Capture { task, stop_tx });
        self.lost = Some(CaptureLost {
            capture_id: self.capture_id,
            signal: lost_rx,
        });
        self.feedback.start(Arc::clone(&self.analyser));
        self.state = RecordingState::Recording;

        info!("Recording started");
        Ok(true)
    }

    /// Stop capturing and flush everything captured into one blob
    pub async fn stop(&mut self) -> Result<StopOutcome> {
        if self.state != RecordingState::Recording {
            warn!("Recording not active ({:?}), ignoring stop", self.state);
            return Ok(StopOutcome::NotRecording);
        }

        info!("Stopping recording");
        self.state = RecordingState::Stopping;
        let frames = self.teardown().await;
        self.state = RecordingState::Idle;

        let outcome = match AudioBlob::from_frames(&frames)? {
            Some(blob) => StopOutcome::Captured(blob),
            None => {
                warn!("Recording stopped without any audio data");
                StopOutcome::NoAudio
            }
        };

        Ok(outcome)
    }

    /// Abandon a running recording, discarding its audio
    pub async fn cancel(&mut self) {
        if self.state != RecordingState::Recording {
            return;
        }

        self.state = RecordingState::Stopping;
        let frames = self.teardown().await;
        self.state = RecordingState::Idle;
        info!("Recording cancelled, {} frames discarded", frames.len());
    }

    async fn open_input(&mut self) -> Result<mpsc::Receiver<AudioFrame>, DeviceError> {
        match self.backend.start(&self.preferred).await {
            Err(DeviceError::Constraints(reason)) => {
                warn!(
                    "Preferred capture constraints rejected ({}), retrying with relaxed constraints",
                    reason
                );
                let relaxed = CaptureConstraints {
                    buffer_duration_ms: self.preferred.buffer_duration_ms,
                    ..CaptureConstraints::relaxed()
                };
                self.backend.start(&relaxed).await
            }
            other => other,
        }
    }

    /// Release feedback tasks, the collector and the device; returns captured frames
    async fn teardown(&mut self) -> Vec<AudioFrame> {
        self.feedback.stop();
        self.lost = None;

        // Collector first, so closing the device is not reported as lost input
        let frames = match self.capture.take() {
            Some(capture) => {
                let _ = capture.stop_tx.send(());
                match capture.task.await {
                    Ok(frames) => frames,
                    Err(e) => {
                        error!("Capture task failed: {}", e);
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        if let Err(e) = self.backend.stop().await {
            error!("Failed to stop audio backend: {}", e);
        }

        if let Ok(mut analyser) = self.analyser.lock() {
            analyser.clear();
        }

        frames
    }
}

/// Collect frames until the device closes the channel or stop is signalled
async fn collect_frames(
    mut audio_rx: mpsc::Receiver<AudioFrame>,
    mut stop_rx: oneshot::Receiver<()>,
    lost_tx: oneshot::Sender<()>,
    analyser: Arc<Mutex<FrequencyAnalyser>>,
    target_sample_rate: Option<u32>,
    target_channels: Option<u16>,
) -> Vec<AudioFrame> {
    let mut frames = Vec::new();
    let mut lost_tx = Some(lost_tx);

    let accept = |frame: AudioFrame, frames: &mut Vec<AudioFrame>| {
        let rate = target_sample_rate.unwrap_or(frame.sample_rate);
        let channels = target_channels.unwrap_or(frame.channels);
        let frame = convert::process_frame(frame, rate, channels);

        if let Ok(mut analyser) = analyser.lock() {
            analyser.push_samples(&frame.samples, frame.channels);
        }
        frames.push(frame);
    };

    loop {
        tokio::select! {
            frame = audio_rx.recv() => match frame {
                Some(frame) => accept(frame, &mut frames),
                None => {
                    warn!("Audio input closed while recording");
                    if let Some(lost_tx) = lost_tx.take() {
                        let _ = lost_tx.send(());
                    }
                    break;
                }
            },
            _ = &mut stop_rx => {
                // Keep whatever the device already delivered
                while let Ok(frame) = audio_rx.try_recv() {
                    accept(frame, &mut frames);
                }
                break;
            }
        }
    }

    info!("Capture finished: {} frames", frames.len());
    frames
}
