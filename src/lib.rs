pub mod ai;
pub mod audio;
pub mod clipboard;
pub mod config;
pub mod http;
pub mod notes;
pub mod recording;
pub mod session;
pub mod storage;

pub use ai::{AiError, AudioPayload, GeminiClient, NoteAi};
pub use audio::{
    AudioBackend, AudioBackendFactory, AudioBlob, AudioFile, AudioFrame, AudioSource,
    CaptureConstraints, ChannelBackend, ChannelFeeder, DeviceError, FileBackend,
};
pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use config::Config;
pub use http::{create_router, AppState};
pub use notes::{infer_title, render_markdown, History, Note};
pub use recording::{FeedbackFrame, RecordingController, RecordingState, StopOutcome};
pub use session::{
    CopyOutcome, HistoryItem, NoteSession, NoteView, Region, RegionContent, SessionConfig,
};
pub use storage::{JsonFileStore, MemoryStore, NoteStore};
