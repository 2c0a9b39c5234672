use anyhow::{Context, Result};
use std::io::Cursor;
use tracing::{info, warn};

use super::backend::AudioFrame;

pub const WAV_MIME_TYPE: &str = "audio/wav";

/// A complete recording, encoded and ready to upload
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_count: usize,
}

impl AudioBlob {
    /// Flush captured frames into a single 16-bit WAV blob.
    ///
    /// Returns `Ok(None)` when no samples were captured. Frames whose format
    /// differs from the first frame are dropped.
    pub fn from_frames(frames: &[AudioFrame]) -> Result<Option<Self>> {
        let Some(first) = frames.iter().find(|f| !f.samples.is_empty()) else {
            return Ok(None);
        };

        let spec = hound::WavSpec {
            channels: first.channels,
            sample_rate: first.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut sample_count = 0;
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV writer")?;

            for frame in frames {
                if frame.sample_rate != spec.sample_rate || frame.channels != spec.channels {
                    warn!(
                        "Dropping frame at {}ms: format {}Hz/{}ch differs from {}Hz/{}ch",
                        frame.timestamp_ms,
                        frame.sample_rate,
                        frame.channels,
                        spec.sample_rate,
                        spec.channels
                    );
                    continue;
                }

                for &sample in &frame.samples {
                    writer
                        .write_sample(sample)
                        .context("Failed to write sample to WAV")?;
                }
                sample_count += frame.samples.len();
            }

            writer.finalize().context("Failed to finalize WAV data")?;
        }

        let bytes = cursor.into_inner();
        info!(
            "Encoded recording: {} samples, {}Hz, {} channels, {} bytes",
            sample_count,
            spec.sample_rate,
            spec.channels,
            bytes.len()
        );

        Ok(Some(Self {
            bytes,
            mime_type: WAV_MIME_TYPE.to_string(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            sample_count,
        }))
    }

    /// Read a WAV file from disk as an upload-ready blob
    pub fn from_wav_file(path: impl AsRef<std::path::Path>) -> Result<Option<Self>> {
        let audio = super::file::AudioFile::open(path)?;
        Self::from_frames(&audio.frames(100))
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.sample_count as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}
