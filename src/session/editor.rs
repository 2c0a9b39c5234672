use serde::{Deserialize, Serialize};

use crate::notes::Note;

/// An editable region of the open note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Title,
    Polished,
    Elaborated,
}

impl Region {
    /// Hint text shown while the region is empty
    pub fn placeholder(self) -> &'static str {
        match self {
            Region::Title => "Untitled Note",
            Region::Polished => "Your polished notes will appear here...",
            Region::Elaborated => "Your elaborated notes will appear here...",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "title" => Some(Region::Title),
            "polished" => Some(Region::Polished),
            "elaborated" => Some(Region::Elaborated),
            _ => None,
        }
    }

    /// Only the two note bodies can be the active (copyable) region
    pub fn is_body(self) -> bool {
        matches!(self, Region::Polished | Region::Elaborated)
    }
}

/// What a region currently shows
///
/// Only `Text` and `Placeholder` (empty) say what the note holds. `Pending`
/// and `Error` are transient and leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum RegionContent {
    Placeholder,
    /// A request for this region is in flight
    Pending(String),
    /// Inline error from the call that should have filled this region
    Error(String),
    Text(String),
}

impl RegionContent {
    /// Blank stored values show the placeholder
    pub fn from_stored(value: &str) -> Self {
        if value.trim().is_empty() {
            RegionContent::Placeholder
        } else {
            RegionContent::Text(value.to_string())
        }
    }

    /// Value persisted for this region, `None` to keep what is stored
    pub fn stored(&self) -> Option<&str> {
        match self {
            RegionContent::Text(text) => Some(text),
            RegionContent::Placeholder => Some(""),
            RegionContent::Pending(_) | RegionContent::Error(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RegionContent::Placeholder)
    }
}

/// The three editable regions plus the active body tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    title: RegionContent,
    polished: RegionContent,
    elaborated: RegionContent,
    active: Region,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            title: RegionContent::Placeholder,
            polished: RegionContent::Placeholder,
            elaborated: RegionContent::Placeholder,
            active: Region::Polished,
        }
    }

    pub fn get(&self, region: Region) -> &RegionContent {
        match region {
            Region::Title => &self.title,
            Region::Polished => &self.polished,
            Region::Elaborated => &self.elaborated,
        }
    }

    pub fn set(&mut self, region: Region, content: RegionContent) {
        match region {
            Region::Title => self.title = content,
            Region::Polished => self.polished = content,
            Region::Elaborated => self.elaborated = content,
        }
    }

    /// Apply a direct user edit (an emptied region falls back to its placeholder)
    pub fn edit(&mut self, region: Region, text: &str) {
        self.set(region, RegionContent::from_stored(text));
    }

    pub fn active(&self) -> Region {
        self.active
    }

    /// Returns false for `Region::Title`, which cannot be active
    pub fn set_active(&mut self, region: Region) -> bool {
        if !region.is_body() {
            return false;
        }
        self.active = region;
        true
    }

    /// Reset every region to its placeholder
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Populate the regions from a stored note
    pub fn show(&mut self, note: &Note) {
        self.title = RegionContent::from_stored(&note.title);
        self.polished = RegionContent::from_stored(&note.polished_note);
        self.elaborated = RegionContent::from_stored(&note.elaborated_note);
        self.active = Region::Polished;
    }

    /// Refresh `note` from the regions. Touches the timestamp only on change.
    pub fn refresh(&self, note: &mut Note) -> bool {
        let mut changed = false;
        changed |= sync_field(&mut note.title, &self.title);
        changed |= sync_field(&mut note.polished_note, &self.polished);
        changed |= sync_field(&mut note.elaborated_note, &self.elaborated);

        if changed {
            note.touch();
        }

        changed
    }
}

fn sync_field(field: &mut String, content: &RegionContent) -> bool {
    match content.stored() {
        Some(value) if field.as_str() != value => {
            *field = value.to_string();
            true
        }
        _ => false,
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
