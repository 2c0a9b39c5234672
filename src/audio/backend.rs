use anyhow::Result;
use thiserror::Error;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Constraints requested when opening an input device
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConstraints {
    /// Required sample rate (None = whatever the device delivers)
    pub sample_rate: Option<u32>,
    /// Required channel count (None = whatever the device delivers)
    pub channels: Option<u16>,
    pub noise_suppression: bool,
    pub echo_cancellation: bool,
    /// Frame size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl CaptureConstraints {
    /// Preferred capture format for transcription
    pub fn preferred(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate: Some(sample_rate),
            channels: Some(channels),
            noise_suppression: true,
            echo_cancellation: true,
            buffer_duration_ms: 100,
        }
    }

    /// Fallback when the device rejects the preferred constraints
    pub fn relaxed() -> Self {
        Self {
            sample_rate: None,
            channels: None,
            noise_suppression: false,
            echo_cancellation: false,
            buffer_duration_ms: 100,
        }
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self::preferred(16000, 1) // 16kHz mono
    }
}

/// Why an input device could not be opened
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("permission to use the microphone was denied")]
    PermissionDenied,

    #[error("no audio input device found")]
    NotFound,

    #[error("audio input device is busy")]
    Busy,

    /// The device exists but cannot satisfy the requested constraints
    #[error("constraints not satisfiable: {0}")]
    Constraints(String),

    #[error("{0}")]
    Other(String),
}

impl DeviceError {
    /// Message shown to the user when recording cannot start
    pub fn user_message(&self) -> String {
        match self {
            DeviceError::PermissionDenied => {
                "Microphone permission denied. Please check your system privacy settings and try again."
                    .to_string()
            }
            DeviceError::NotFound => "No microphone found. Please connect a microphone.".to_string(),
            DeviceError::Busy => {
                "Cannot access microphone. It may be in use by another application.".to_string()
            }
            DeviceError::Constraints(detail) | DeviceError::Other(detail) => {
                format!("Error: {}", detail)
            }
        }
    }

    /// Best-effort classification of a platform error message
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("permission") || lower.contains("not allowed") || lower.contains("denied") {
            DeviceError::PermissionDenied
        } else if lower.contains("not found") || lower.contains("no device") || lower.contains("not available") {
            DeviceError::NotFound
        } else if lower.contains("busy") || lower.contains("in use") || lower.contains("not readable") {
            DeviceError::Busy
        } else if lower.contains("not supported") || lower.contains("overconstrained") {
            DeviceError::Constraints(message.to_string())
        } else {
            DeviceError::Other(message.to_string())
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - File: stream a WAV file (CLI / headless use)
/// - Channel: frames pushed in-process (tests, embedding)
/// - Microphone: cpal default input device (`microphone` feature)
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The
    /// channel closes when the backend stops or runs out of input.
    async fn start(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> std::result::Result<mpsc::Receiver<AudioFrame>, DeviceError>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create audio backend for the configured source
    pub fn create(source: AudioSource) -> Result<Box<dyn AudioBackend>> {
        match source {
            AudioSource::Microphone => {
                #[cfg(feature = "microphone")]
                {
                    Ok(Box::new(super::microphone::MicrophoneBackend::new()))
                }

                #[cfg(not(feature = "microphone"))]
                {
                    anyhow::bail!(
                        "Microphone capture requires building with `--features microphone`; \
                         set audio.source = \"file:<path.wav>\" to run without it"
                    )
                }
            }

            AudioSource::File(path) => Ok(Box::new(super::file::FileBackend::new(path))),
        }
    }
}

/// Audio source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Default microphone input
    Microphone,
    /// WAV file input
    File(String),
}

impl AudioSource {
    /// Parse "microphone" or "file:<path>"
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("microphone") || spec.eq_ignore_ascii_case("mic") {
            return Ok(AudioSource::Microphone);
        }

        match spec.strip_prefix("file:") {
            Some(path) if !path.is_empty() => Ok(AudioSource::File(path.to_string())),
            _ => anyhow::bail!("Unknown audio source '{}' (expected 'microphone' or 'file:<path>')", spec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_platform_messages() {
        assert_eq!(DeviceError::classify("Permission denied by user"), DeviceError::PermissionDenied);
        assert_eq!(DeviceError::classify("The requested device is not available"), DeviceError::NotFound);
        assert_eq!(DeviceError::classify("Device or resource busy"), DeviceError::Busy);
        assert!(matches!(DeviceError::classify("stream config not supported"), DeviceError::Constraints(_)));
        assert!(matches!(DeviceError::classify("weird failure"), DeviceError::Other(_)));
    }

    #[test]
    fn user_messages_are_distinct() {
        let messages = [
            DeviceError::PermissionDenied.user_message(),
            DeviceError::NotFound.user_message(),
            DeviceError::Busy.user_message(),
            DeviceError::Other("boom".into()).user_message(),
        ];

        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(messages[3], "Error: boom");
    }

    #[cfg(not(feature = "microphone"))]
    #[test]
    fn microphone_source_needs_feature() {
        let err = AudioBackendFactory::create(AudioSource::Microphone)
            .err()
            .expect("microphone backend is not compiled in");
        assert!(err.to_string().contains("--features microphone"));
    }

    #[test]
    fn file_source_needs_no_feature() {
        let backend = AudioBackendFactory::create(AudioSource::File("note.wav".to_string())).unwrap();
        assert_eq!(backend.name(), "file");
    }

    #[test]
    fn parses_audio_sources() {
        assert_eq!(AudioSource::parse("microphone").unwrap(), AudioSource::Microphone);
        assert_eq!(
            AudioSource::parse("file:tests/a.wav").unwrap(),
            AudioSource::File("tests/a.wav".to_string())
        );
        assert!(AudioSource::parse("file:").is_err());
        assert!(AudioSource::parse("speaker").is_err());
    }
}
