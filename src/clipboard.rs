//! Clipboard sinks for the copy action

use anyhow::{Context, Result};
use std::sync::Mutex;

/// Destination for copied note text
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// System clipboard via arboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to open system clipboard")?;
        clipboard
            .set_text(text.to_string())
            .context("Failed to write to system clipboard")
    }
}

/// Keeps the last copied text in memory (headless runs, tests)
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| anyhow::anyhow!("clipboard poisoned"))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
