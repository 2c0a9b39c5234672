use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::session::SessionConfig;

/// Environment variables override file values, e.g. `VOICE_NOTES__AI__API_KEY`
const ENV_PREFIX: &str = "VOICE_NOTES";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub notes: NotesConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Falls back to `GEMINI_API_KEY` when unset
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    pub history_limit: usize,
    pub draft_save_delay_ms: u64,
    pub title_max_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// "microphone" or "file:<path>"
    pub source: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub visualizer_bars: usize,
}

impl Config {
    /// Load built-in defaults, then `path` (optional), then the environment
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "voice-notes")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8787)?
            .set_default("ai.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("ai.model", "gemini-2.5-flash")?
            .set_default("ai.timeout_secs", 120)?
            .set_default("storage.data_dir", "data")?
            .set_default("notes.history_limit", 20)?
            .set_default("notes.draft_save_delay_ms", 1000)?
            .set_default("notes.title_max_chars", 50)?
            .set_default("audio.source", "microphone")?
            .set_default("audio.sample_rate", 16000)?
            .set_default("audio.channels", 1)?
            .set_default("audio.visualizer_bars", 32)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;

        if cfg.ai.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            cfg.ai.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        Ok(cfg)
    }

    /// Session tuning derived from the `notes` and `audio` sections
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            history_limit: self.notes.history_limit,
            draft_save_delay: Duration::from_millis(self.notes.draft_save_delay_ms),
            title_max_chars: self.notes.title_max_chars,
            sample_rate: self.audio.sample_rate,
            channels: self.audio.channels,
            visualizer_bars: self.audio.visualizer_bars,
        }
    }
}
