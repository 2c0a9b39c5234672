// Microphone backend using cpal's default input device
//
// cpal streams are not Send, so each capture owns a dedicated thread that
// builds the stream, reports readiness and parks until stop is requested or
// the stream reports an error. Releasing the stream closes the frame channel.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, SupportedStreamConfig};
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioFrame, CaptureConstraints, DeviceError};

pub struct MicrophoneBackend {
    stop_tx: Option<std_mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new() -> Self {
        Self {
            stop_tx: None,
            thread: None,
        }
    }
}

impl Default for MicrophoneBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MicrophoneBackend {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

/// Stream error callback. A lost device wakes the capture thread so it releases the stream.
fn stream_error_handler(stop_tx: std_mpsc::Sender<()>) -> impl FnMut(cpal::StreamError) + Send + 'static {
    move |e| match e {
        cpal::StreamError::DeviceNotAvailable => {
            error!("Microphone disconnected");
            let _ = stop_tx.send(());
        }
        other => error!("Microphone stream error: {}", other),
    }
}

fn select_config(
    device: &cpal::Device,
    constraints: &CaptureConstraints,
) -> Result<SupportedStreamConfig, DeviceError> {
    let default = device
        .default_input_config()
        .map_err(|e| DeviceError::classify(&e.to_string()))?;

    if constraints.sample_rate.is_none() && constraints.channels.is_none() {
        return Ok(default);
    }

    let ranges = device
        .supported_input_configs()
        .map_err(|e| DeviceError::classify(&e.to_string()))?;

    for range in ranges {
        if let Some(channels) = constraints.channels {
            if range.channels() != channels {
                continue;
            }
        }
        let rate = constraints.sample_rate.unwrap_or(default.sample_rate().0);
        if range.min_sample_rate().0 <= rate && rate <= range.max_sample_rate().0 {
            return Ok(range.with_sample_rate(SampleRate(rate)));
        }
    }

    Err(DeviceError::Constraints(format!(
        "no input config for {:?}Hz / {:?} channels",
        constraints.sample_rate, constraints.channels
    )))
}

fn run_capture(
    constraints: CaptureConstraints,
    frame_tx: mpsc::Sender<AudioFrame>,
    ready_tx: std_mpsc::Sender<Result<(), DeviceError>>,
    stop_tx: std_mpsc::Sender<()>,
    stop_rx: std_mpsc::Receiver<()>,
) {
    let host = cpal::default_host();
    let Some(device) = host.default_input_device() else {
        let _ = ready_tx.send(Err(DeviceError::NotFound));
        return;
    };

    let supported = match select_config(&device, &constraints) {
        Ok(config) => config,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;

    let mut samples_sent: u64 = 0;
    let mut emit = move |samples: Vec<i16>| {
        let timestamp_ms = samples_sent * 1000 / (sample_rate as u64 * channels as u64).max(1);
        samples_sent += samples.len() as u64;
        let frame = AudioFrame {
            samples,
            sample_rate,
            channels,
            timestamp_ms,
        };
        if frame_tx.try_send(frame).is_err() {
            warn!("Microphone frame dropped (consumer lagging or closed)");
        }
    };

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                emit(data.iter().map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).collect())
            },
            stream_error_handler(stop_tx.clone()),
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| emit(data.to_vec()),
            stream_error_handler(stop_tx.clone()),
            None,
        ),
        other => {
            let _ = ready_tx.send(Err(DeviceError::Constraints(format!(
                "unsupported sample format {:?}",
                other
            ))));
            return;
        }
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(DeviceError::classify(&e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(DeviceError::classify(&e.to_string())));
        return;
    }

    info!("Microphone capturing: {}Hz, {} channels", sample_rate, channels);
    let _ = ready_tx.send(Ok(()));

    drop(stop_tx);

    // Park until stop is requested or the stream fails
    let _ = stop_rx.recv();
    drop(stream);
    info!("Microphone stream released");
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<mpsc::Receiver<AudioFrame>, DeviceError> {
        if self.thread.is_some() {
            return Err(DeviceError::Busy);
        }

        let (frame_tx, frame_rx) = mpsc::channel(100);
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel();
        let constraints = constraints.clone();
        let error_tx = stop_tx.clone();

        let thread = std::thread::Builder::new()
            .name("microphone-capture".to_string())
            .spawn(move || run_capture(constraints, frame_tx, ready_tx, error_tx, stop_rx))
            .map_err(|e| DeviceError::Other(e.to_string()))?;

        let ready = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| DeviceError::Other(e.to_string()))?
            .map_err(|_| DeviceError::Other("capture thread exited".to_string()))?;

        match ready {
            Ok(()) => {
                self.stop_tx = Some(stop_tx);
                self.thread = Some(thread);
                Ok(frame_rx)
            }
            Err(e) => {
                let _ = thread.join();
                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await?
                .map_err(|_| anyhow::anyhow!("Microphone capture thread panicked"))?;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.thread.is_some()
    }

    fn name(&self) -> &str {
        "microphone"
    }
}
