use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::notes::{DEFAULT_HISTORY_LIMIT, DEFAULT_TITLE_MAX_CHARS};

/// Configuration for a note-taking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of notes kept in history
    pub history_limit: usize,

    /// Quiet period after the last edit before the draft is saved
    /// Default: 1 second
    pub draft_save_delay: Duration,

    /// Maximum length of a title taken from body text
    pub title_max_chars: usize,

    /// Preferred capture sample rate (transcription works best at 16kHz)
    pub sample_rate: u32,

    /// Preferred number of audio channels (1 = mono)
    pub channels: u16,

    /// Number of visualizer bars
    pub visualizer_bars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            draft_save_delay: Duration::from_secs(1),
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            sample_rate: 16000, // 16kHz
            channels: 1,        // Mono
            visualizer_bars: 32,
        }
    }
}
