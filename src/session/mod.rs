//! Note session management
//!
//! `NoteSession` owns the open note and ties together:
//! - Recording (via `RecordingController`)
//! - Transcription and enrichment (transcribe, then polish + elaborate)
//! - The editor regions, history and the debounced draft save
//! - The view model rendered by the HTTP API

mod config;
mod draft;
mod editor;
mod pipeline;
mod session;
mod view;

pub use config::SessionConfig;
pub use draft::DraftScheduler;
pub use editor::{Editor, Region, RegionContent};
pub use session::{CopyOutcome, NoteSession};
pub use view::{HistoryItem, NoteView, RegionView};
