use chrono::{DateTime, Utc};
use serde::Serialize;

use super::editor::{Editor, Region, RegionContent};
use crate::notes::{to_plain_text, Note};
use crate::recording::RecordingState;

const PREVIEW_CHARS: usize = 80;

/// Presentation of one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionView {
    /// "placeholder", "pending", "error" or "content"
    pub state: &'static str,
    /// What the region displays (placeholder hint included)
    pub text: String,
    pub placeholder_active: bool,
}

impl RegionView {
    pub fn new(region: Region, content: &RegionContent) -> Self {
        let (state, text) = match content {
            RegionContent::Placeholder => ("placeholder", region.placeholder().to_string()),
            RegionContent::Pending(message) => ("pending", message.clone()),
            RegionContent::Error(message) => ("error", message.clone()),
            RegionContent::Text(text) => ("content", text.clone()),
        };

        Self {
            state,
            text,
            placeholder_active: content.is_placeholder(),
        }
    }
}

/// Everything the UI renders for the open note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    pub note_id: String,
    pub title: RegionView,
    pub polished: RegionView,
    pub elaborated: RegionView,
    pub raw_transcription: String,
    pub active_region: Region,
    pub recording: RecordingState,
    pub status: String,
    pub history_panel_open: bool,
    pub history_count: usize,
}

impl NoteView {
    pub(crate) fn build(
        note: &Note,
        editor: &Editor,
        recording: RecordingState,
        status: &str,
        history_panel_open: bool,
        history_count: usize,
    ) -> Self {
        Self {
            note_id: note.id.clone(),
            title: RegionView::new(Region::Title, editor.get(Region::Title)),
            polished: RegionView::new(Region::Polished, editor.get(Region::Polished)),
            elaborated: RegionView::new(Region::Elaborated, editor.get(Region::Elaborated)),
            raw_transcription: note.raw_transcription.clone(),
            active_region: editor.active(),
            recording,
            status: status.to_string(),
            history_panel_open,
            history_count,
        }
    }
}

/// One row of the history panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Note> for HistoryItem {
    fn from(note: &Note) -> Self {
        let title = if note.title.trim().is_empty() {
            Region::Title.placeholder().to_string()
        } else {
            note.title.clone()
        };

        let source = if note.polished_note.trim().is_empty() {
            note.raw_transcription.clone()
        } else {
            to_plain_text(&note.polished_note)
        };
        let preview: String = source
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(PREVIEW_CHARS)
            .collect();

        Self {
            id: note.id.clone(),
            title,
            preview,
            timestamp: note.timestamp,
        }
    }
}
