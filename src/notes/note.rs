use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single voice note: the accumulated transcript plus its two AI renderings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Opaque identifier (e.g., "note_1730000000000_1a2b3c4d")
    pub id: String,

    /// Note title (empty = show placeholder)
    #[serde(default)]
    pub title: String,

    /// Raw transcript, appended to by every recording made into this note
    #[serde(default)]
    pub raw_transcription: String,

    /// Polished rendering (HTML)
    #[serde(default)]
    pub polished_note: String,

    /// Elaborated rendering (HTML)
    #[serde(default)]
    pub elaborated_note: String,

    /// Last modification time
    pub timestamp: DateTime<Utc>,
}

impl Note {
    /// Create a new, empty note with a fresh ID
    pub fn new() -> Self {
        Self {
            id: new_note_id(),
            title: String::new(),
            raw_transcription: String::new(),
            polished_note: String::new(),
            elaborated_note: String::new(),
            timestamp: Utc::now(),
        }
    }

    /// True when every textual field is blank. Such notes never enter history.
    pub fn is_effectively_empty(&self) -> bool {
        [
            &self.title,
            &self.raw_transcription,
            &self.polished_note,
            &self.elaborated_note,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Append a transcription result, space-joined with what is already there
    pub fn append_transcription(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if self.raw_transcription.trim().is_empty() {
            self.raw_transcription = text.to_string();
        } else {
            self.raw_transcription.push(' ');
            self.raw_transcription.push_str(text);
        }

        self.touch();
    }

    pub fn touch(&mut self) {
        self.timestamp = Utc::now();
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

fn new_note_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("note_{}_{}", Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_is_effectively_empty() {
        let note = Note::new();
        assert!(note.is_effectively_empty());
        assert!(note.id.starts_with("note_"));
    }

    #[test]
    fn whitespace_only_fields_are_empty() {
        let mut note = Note::new();
        note.title = "   ".to_string();
        note.polished_note = "\n\t".to_string();
        assert!(note.is_effectively_empty());

        note.elaborated_note = "<p>x</p>".to_string();
        assert!(!note.is_effectively_empty());
    }

    #[test]
    fn transcription_is_space_joined() {
        let mut note = Note::new();
        note.append_transcription("hello");
        note.append_transcription("  world ");
        note.append_transcription("   ");
        assert_eq!(note.raw_transcription, "hello world");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Note::new().id, Note::new().id);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut note = Note::new();
        note.raw_transcription = "hi".to_string();
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"rawTranscription\":\"hi\""));
        assert!(json.contains("\"polishedNote\""));
        assert!(json.contains("\"elaboratedNote\""));
    }
}
