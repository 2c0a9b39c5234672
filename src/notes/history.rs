use super::note::Note;
use tracing::debug;

/// Default number of notes kept in history
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Bounded, most-recent-first list of committed notes
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<Note>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Rebuild from persisted entries, dropping empty notes, duplicate IDs
    /// (first occurrence wins) and anything past the limit
    pub fn from_entries(entries: Vec<Note>, limit: usize) -> Self {
        let mut history = Self::new(limit);

        for note in entries {
            if note.is_effectively_empty() || history.get(&note.id).is_some() {
                continue;
            }
            if history.entries.len() == history.limit {
                break;
            }
            history.entries.push(note);
        }

        history
    }

    /// Insert or replace a note at the front.
    ///
    /// Returns `false` (and leaves history untouched) when the note is
    /// effectively empty.
    pub fn commit(&mut self, note: Note) -> bool {
        if note.is_effectively_empty() {
            debug!("Skipping history commit for empty note {}", note.id);
            return false;
        }

        self.entries.retain(|entry| entry.id != note.id);
        self.entries.insert(0, note);
        self.entries.truncate(self.limit);

        true
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[Note] {
        &self.entries
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
