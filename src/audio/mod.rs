pub mod analyser;
pub mod backend;
pub mod blob;
pub mod channel;
pub mod convert;
pub mod file;

#[cfg(feature = "microphone")]
pub mod microphone;

pub use analyser::FrequencyAnalyser;
pub use backend::{
    AudioBackend, AudioBackendFactory, AudioFrame, AudioSource, CaptureConstraints, DeviceError,
};
pub use blob::{AudioBlob, WAV_MIME_TYPE};
pub use channel::{ChannelBackend, ChannelFeeder};
pub use file::{AudioFile, FileBackend};
