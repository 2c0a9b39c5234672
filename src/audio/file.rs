use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{AudioBackend, AudioFrame, CaptureConstraints, DeviceError};

pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)
            .context("Failed to open WAV file")?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds = samples.len() as f64 /
            (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Split the file into capture-sized frames
    pub fn frames(&self, frame_duration_ms: u64) -> Vec<AudioFrame> {
        let samples_per_frame = (self.sample_rate as u64 * frame_duration_ms / 1000) as usize
            * self.channels as usize;
        let samples_per_frame = samples_per_frame.max(self.channels as usize).max(1);

        self.samples
            .chunks(samples_per_frame)
            .enumerate()
            .map(|(i, chunk)| AudioFrame {
                samples: chunk.to_vec(),
                sample_rate: self.sample_rate,
                channels: self.channels,
                timestamp_ms: i as u64 * frame_duration_ms,
            })
            .collect()
    }
}

/// Streams a WAV file as if it were a live input device
pub struct FileBackend {
    path: String,
    realtime: bool,
    task: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            realtime: true,
            task: None,
        }
    }

    /// Deliver frames at wall-clock pace (default) or as fast as consumed
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }
}

#[async_trait::async_trait]
impl AudioBackend for FileBackend {
    async fn start(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<mpsc::Receiver<AudioFrame>, DeviceError> {
        if self.task.is_some() {
            return Err(DeviceError::Busy);
        }

        let path = self.path.clone();
        if !Path::new(&path).exists() {
            return Err(DeviceError::NotFound);
        }

        let audio = tokio::task::spawn_blocking(move || AudioFile::open(path))
            .await
            .map_err(|e| DeviceError::Other(e.to_string()))?
            .map_err(|e| DeviceError::Other(format!("{:#}", e)))?;

        if let Some(rate) = constraints.sample_rate {
            if rate != audio.sample_rate {
                return Err(DeviceError::Constraints(format!(
                    "file is {}Hz, {}Hz requested",
                    audio.sample_rate, rate
                )));
            }
        }
        if let Some(channels) = constraints.channels {
            if channels != audio.channels {
                return Err(DeviceError::Constraints(format!(
                    "file has {} channels, {} requested",
                    audio.channels, channels
                )));
            }
        }

        let frame_ms = constraints.buffer_duration_ms.max(1);
        let frames = audio.frames(frame_ms);
        let realtime = self.realtime;
        let (tx, rx) = mpsc::channel(100);

        info!(
            "File backend streaming {} ({} frames, realtime={})",
            self.path,
            frames.len(),
            realtime
        );

        self.task = Some(tokio::spawn(async move {
            for frame in frames {
                if realtime {
                    tokio::time::sleep(Duration::from_millis(frame_ms)).await;
                }
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            debug!("File backend reached end of input");
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("File backend stopped: {}", self.path);
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    fn name(&self) -> &str {
        "file"
    }
}
