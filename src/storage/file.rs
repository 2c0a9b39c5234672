use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::NoteStore;
use crate::notes::Note;

const HISTORY_FILE: &str = "history.json";
const DRAFT_FILE: &str = "draft.json";

/// Stores history and draft as JSON files in a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        // Create data directory if it doesn't exist
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {:?}", dir))?;

        info!("Note store initialized at {}", dir.display());

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {:?}", path)),
        };

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {:?}", path))?;

        Ok(Some(value))
    }

    /// Write through a temp file so a crash never leaves a half-written slot
    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{}.tmp", name));

        let contents = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp, contents).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {:?}", path))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl NoteStore for JsonFileStore {
    fn load_history(&self) -> Result<Vec<Note>> {
        Ok(self.read(HISTORY_FILE)?.unwrap_or_default())
    }

    fn save_history(&self, history: &[Note]) -> Result<()> {
        self.write(HISTORY_FILE, history)
    }

    fn load_draft(&self) -> Result<Option<Note>> {
        self.read(DRAFT_FILE)
    }

    fn save_draft(&self, draft: &Note) -> Result<()> {
        self.write(DRAFT_FILE, draft)
    }
}
