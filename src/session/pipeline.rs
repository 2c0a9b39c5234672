//! Transcription and enrichment of a finished recording
//!
//! Results are tagged with the id of the note that was open when recording
//! stopped. If the user has moved on to another note by the time a result
//! arrives, the result is dropped.

use tracing::{debug, error, info, warn};

use super::editor::{Region, RegionContent};
use super::session::{NoteSession, SessionState};
use crate::ai::prompts;
use crate::ai::AudioPayload;
use crate::audio::AudioBlob;
use crate::notes::{infer_title, render_markdown};

const STATUS_TRANSCRIBING: &str = "Getting transcription...";
const STATUS_EMPTY_TRANSCRIPTION: &str = "Transcription failed or returned empty.";
const STATUS_ENRICHING: &str = "Polishing and elaborating note...";
const STATUS_NOTE_READY: &str = "Note ready.";
const STATUS_ENRICHMENT_FAILED: &str = "Could not polish or elaborate the note.";

impl NoteSession {
    pub(super) async fn run_pipeline(&self, note_id: String, blob: AudioBlob) {
        info!(
            "Processing {:.1}s of audio ({} bytes) for note {}",
            blob.duration_secs(),
            blob.bytes.len(),
            note_id
        );

        if self
            .with_open_note(&note_id, |s| s.status = STATUS_TRANSCRIBING.to_string())
            .await
            .is_none()
        {
            return;
        }

        let payload = AudioPayload::from_blob(&blob);
        let transcript = match self
            .ai
            .transcribe(&payload, prompts::TRANSCRIPTION_INSTRUCTION)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Transcription returned no text");
                self.with_open_note(&note_id, |s| {
                    s.status = STATUS_EMPTY_TRANSCRIPTION.to_string();
                    show_transcription_error(s, "Could not transcribe audio. Please try again.");
                })
                .await;
                return;
            }
            Err(e) => {
                error!("Transcription failed: {}", e);
                self.with_open_note(&note_id, |s| {
                    s.status = format!("Error getting transcription: {}", e);
                    show_transcription_error(s, &format!("Error during transcription: {}", e));
                })
                .await;
                return;
            }
        };

        info!("Transcribed {} chars", transcript.chars().count());

        let raw = match self
            .with_open_note(&note_id, |s| {
                s.note.append_transcription(&transcript);
                s.editor.set(
                    Region::Polished,
                    RegionContent::Pending("Polishing note...".to_string()),
                );
                s.editor.set(
                    Region::Elaborated,
                    RegionContent::Pending("Elaborating note...".to_string()),
                );
                s.status = STATUS_ENRICHING.to_string();
                s.note.raw_transcription.clone()
            })
            .await
        {
            Some(raw) => raw,
            None => return,
        };

        let (polished, elaborated) =
            tokio::join!(self.polish(&note_id, &raw), self.elaborate(&note_id, &raw));

        let store = &*self.store;
        self.with_open_note(&note_id, |s| {
            s.commit_current(store);
            s.persist_draft(store);
            s.status = if polished || elaborated {
                STATUS_NOTE_READY
            } else {
                STATUS_ENRICHMENT_FAILED
            }
            .to_string();
        })
        .await;

        info!(
            "Note {} processed (polished: {}, elaborated: {})",
            note_id, polished, elaborated
        );
    }

    /// Returns true if the polished region was filled
    async fn polish(&self, note_id: &str, raw: &str) -> bool {
        let max_chars = self.config.title_max_chars;

        match self.ai.generate(&prompts::polish_prompt(raw)).await {
            Ok(markdown) if !markdown.trim().is_empty() => {
                let html = render_markdown(&markdown);
                let title = infer_title(&markdown, max_chars);
                debug!("Inferred title: {:?}", title);

                self.with_open_note(note_id, |s| {
                    s.editor.set(Region::Polished, RegionContent::Text(html));
                    if let Some(title) = title {
                        s.editor.set(Region::Title, RegionContent::Text(title));
                    }
                })
                .await
                .is_some()
            }
            Ok(_) => {
                warn!("Polish returned no text");
                self.show_region_error(
                    note_id,
                    Region::Polished,
                    "Polishing returned no text.".to_string(),
                )
                .await;
                false
            }
            Err(e) => {
                error!("Polish failed: {}", e);
                self.show_region_error(
                    note_id,
                    Region::Polished,
                    format!("Error polishing note: {}", e),
                )
                .await;
                false
            }
        }
    }

    /// Returns true if the elaborated region was filled
    async fn elaborate(&self, note_id: &str, raw: &str) -> bool {
        match self.ai.generate(&prompts::elaborate_prompt(raw)).await {
            Ok(markdown) if !markdown.trim().is_empty() => {
                let html = render_markdown(&markdown);
                self.with_open_note(note_id, |s| {
                    s.editor.set(Region::Elaborated, RegionContent::Text(html));
                })
                .await
                .is_some()
            }
            Ok(_) => {
                warn!("Elaboration returned no text");
                self.show_region_error(
                    note_id,
                    Region::Elaborated,
                    "Elaboration returned no text.".to_string(),
                )
                .await;
                false
            }
            Err(e) => {
                error!("Elaboration failed: {}", e);
                self.show_region_error(
                    note_id,
                    Region::Elaborated,
                    format!("Error elaborating note: {}", e),
                )
                .await;
                false
            }
        }
    }

    async fn show_region_error(&self, note_id: &str, region: Region, message: String) {
        self.with_open_note(note_id, |s| {
            s.editor.set(region, RegionContent::Error(message));
        })
        .await;
    }

    /// Run `f` against the session only if `note_id` is still the open note
    async fn with_open_note<R, F>(&self, note_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut state = self.state.lock().await;

        if state.note.id != note_id {
            debug!("Discarding result for note {} (no longer open)", note_id);
            return None;
        }

        Some(f(&mut *state))
    }
}

/// Inline transcription error, unless the polished region already holds text
fn show_transcription_error(state: &mut SessionState, message: &str) {
    if matches!(state.editor.get(Region::Polished), RegionContent::Text(_)) {
        return;
    }
    state
        .editor
        .set(Region::Polished, RegionContent::Error(message.to_string()));
}
