//! Note persistence
//!
//! Two slots: the serialized history array (most-recent-first) and the
//! current draft note. Callers treat every operation as best-effort.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::notes::Note;
use anyhow::Result;

/// Key/value persistence for history and draft
///
/// Implementations:
/// - `JsonFileStore`: `history.json` / `draft.json` in a data directory
/// - `MemoryStore`: in-process, for tests and ephemeral runs
pub trait NoteStore: Send + Sync {
    /// Load persisted history (empty if nothing was saved yet)
    fn load_history(&self) -> Result<Vec<Note>>;

    /// Replace the persisted history
    fn save_history(&self, history: &[Note]) -> Result<()>;

    /// Load the persisted draft, if any
    fn load_draft(&self) -> Result<Option<Note>>;

    /// Replace the persisted draft
    fn save_draft(&self, draft: &Note) -> Result<()>;
}
