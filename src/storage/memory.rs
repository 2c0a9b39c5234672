use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::NoteStore;
use crate::notes::Note;

/// In-process note store that counts writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    history: Mutex<Vec<Note>>,
    draft: Mutex<Option<Note>>,
    history_saves: AtomicUsize,
    draft_saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with previously persisted contents
    pub fn with_contents(history: Vec<Note>, draft: Option<Note>) -> Self {
        Self {
            history: Mutex::new(history),
            draft: Mutex::new(draft),
            ..Self::default()
        }
    }

    pub fn history(&self) -> Vec<Note> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn draft(&self) -> Option<Note> {
        self.draft.lock().ok().and_then(|d| d.clone())
    }

    pub fn history_saves(&self) -> usize {
        self.history_saves.load(Ordering::SeqCst)
    }

    pub fn draft_saves(&self) -> usize {
        self.draft_saves.load(Ordering::SeqCst)
    }
}

impl NoteStore for MemoryStore {
    fn load_history(&self) -> Result<Vec<Note>> {
        Ok(self.history())
    }

    fn save_history(&self, history: &[Note]) -> Result<()> {
        let mut slot = self
            .history
            .lock()
            .map_err(|_| anyhow::anyhow!("history slot poisoned"))?;
        *slot = history.to_vec();
        self.history_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_draft(&self) -> Result<Option<Note>> {
        Ok(self.draft())
    }

    fn save_draft(&self, draft: &Note) -> Result<()> {
        let mut slot = self
            .draft
            .lock()
            .map_err(|_| anyhow::anyhow!("draft slot poisoned"))?;
        *slot = Some(draft.clone());
        self.draft_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
