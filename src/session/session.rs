use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::draft::DraftScheduler;
use super::editor::{Editor, Region, RegionContent};
use super::view::{HistoryItem, NoteView};
use crate::ai::NoteAi;
use crate::audio::{AudioBackend, AudioBlob, CaptureConstraints};
use crate::clipboard::ClipboardSink;
use crate::notes::{to_plain_text, History, Note};
use crate::recording::{
    CaptureLost, FeedbackFrame, RecordingController, RecordingState, StopOutcome,
};
use crate::storage::NoteStore;

pub(super) const STATUS_READY: &str = "Ready to record";
pub(super) const STATUS_RECORDING: &str = "Recording... Stop when you're done.";
pub(super) const STATUS_PROCESSING: &str = "Processing audio...";
pub(super) const STATUS_NO_AUDIO: &str = "No audio data captured. Please try again.";
pub(super) const STATUS_INPUT_LOST: &str = "Recording stopped: the audio input was lost.";

/// Result of the copy action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CopyOutcome {
    Copied { region: Region, chars: usize },
    NothingToCopy,
    Failed { message: String },
}

/// Mutable state of the open note. Only ever touched under the session lock.
pub(super) struct SessionState {
    pub(super) note: Note,
    pub(super) editor: Editor,
    pub(super) history: History,
    pub(super) recorder: RecordingController,
    pub(super) status: String,
    pub(super) history_panel_open: bool,
    pub(super) drafts: DraftScheduler,
}

impl SessionState {
    /// Show `note` in the editor and make it the open note
    fn open(&mut self, note: Note) {
        self.editor.show(&note);
        self.note = note;
    }

    /// Commit the open note to history (skipped when effectively empty)
    pub(super) fn commit_current(&mut self, store: &dyn NoteStore) -> bool {
        self.editor.refresh(&mut self.note);

        if !self.history.commit(self.note.clone()) {
            return false;
        }

        if let Err(e) = store.save_history(self.history.entries()) {
            warn!("Failed to save history: {:#}", e);
        }

        info!(
            "Committed note {} to history ({} entries)",
            self.note.id,
            self.history.len()
        );
        true
    }

    pub(super) fn persist_draft(&mut self, store: &dyn NoteStore) {
        self.editor.refresh(&mut self.note);

        match store.save_draft(&self.note) {
            Ok(()) => debug!("Draft saved for note {}", self.note.id),
            Err(e) => warn!("Failed to save draft: {:#}", e),
        }
    }

    fn view(&self) -> NoteView {
        NoteView::build(
            &self.note,
            &self.editor,
            self.recorder.state(),
            &self.status,
            self.history_panel_open,
            self.history.len(),
        )
    }
}

/// The note-taking session: recording, AI enrichment and note persistence
///
/// Cheap to clone; all clones drive the same open note.
#[derive(Clone)]
pub struct NoteSession {
    pub(super) state: Arc<Mutex<SessionState>>,
    pub(super) ai: Arc<dyn NoteAi>,
    pub(super) store: Arc<dyn NoteStore>,
    pub(super) clipboard: Arc<dyn ClipboardSink>,
    pub(super) config: Arc<SessionConfig>,
}

impl NoteSession {
    /// Create a session, restoring history and the saved draft from `store`
    pub fn new(
        config: SessionConfig,
        backend: Box<dyn AudioBackend>,
        ai: Arc<dyn NoteAi>,
        store: Arc<dyn NoteStore>,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Self {
        let history = match store.load_history() {
            Ok(entries) => History::from_entries(entries, config.history_limit),
            Err(e) => {
                warn!("Failed to load history, starting empty: {:#}", e);
                History::new(config.history_limit)
            }
        };

        let recorder = RecordingController::new(
            backend,
            CaptureConstraints::preferred(config.sample_rate, config.channels),
            config.visualizer_bars,
        );

        let mut state = SessionState {
            note: Note::new(),
            editor: Editor::new(),
            history,
            recorder,
            status: STATUS_READY.to_string(),
            history_panel_open: false,
            drafts: DraftScheduler::new(config.draft_save_delay),
        };

        match store.load_draft() {
            Ok(Some(draft)) => {
                info!("Restoring draft {}", draft.id);
                state.open(draft);
            }
            Ok(None) => info!("No saved draft, starting note {}", state.note.id),
            Err(e) => warn!("Failed to load draft, starting a new note: {:#}", e),
        }
        state.persist_draft(&*store);

        info!("Note session ready ({} notes in history)", state.history.len());

        Self {
            state: Arc::new(Mutex::new(state)),
            ai,
            store,
            clipboard,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn view(&self) -> NoteView {
        self.state.lock().await.view()
    }

    /// Snapshot of the open note as it would be persisted now
    pub async fn current_note(&self) -> Note {
        let state = self.state.lock().await;
        let mut note = state.note.clone();
        state.editor.refresh(&mut note);
        note
    }

    pub async fn history(&self) -> Vec<Note> {
        self.state.lock().await.history.entries().to_vec()
    }

    pub async fn history_items(&self) -> Vec<HistoryItem> {
        let state = self.state.lock().await;
        state.history.entries().iter().map(HistoryItem::from).collect()
    }

    pub async fn feedback(&self) -> watch::Receiver<FeedbackFrame> {
        self.state.lock().await.recorder.feedback()
    }

    pub async fn feedback_frame(&self) -> FeedbackFrame {
        self.state.lock().await.recorder.feedback_frame()
    }

    /// Commit the open note and start an empty one
    pub async fn new_note(&self) -> NoteView {
        let mut state = self.state.lock().await;

        state.recorder.cancel().await;
        state.drafts.cancel();
        state.commit_current(&*self.store);

        state.note = Note::new();
        state.editor.clear();
        state.persist_draft(&*self.store);
        state.status = STATUS_READY.to_string();

        info!("Started new note {}", state.note.id);
        state.view()
    }

    /// Apply a direct edit and schedule a debounced draft save
    pub async fn edit(&self, region: Region, text: &str) -> NoteView {
        let mut state = self.state.lock().await;
        state.editor.edit(region, text);

        let session = self.clone();
        state.drafts.schedule(async move {
            session.save_draft_now().await;
        });

        state.view()
    }

    /// Persist the open note as the draft immediately
    pub async fn save_draft_now(&self) {
        let mut state = self.state.lock().await;
        state.persist_draft(&*self.store);
    }

    /// Choose which body region the copy action uses
    pub async fn set_active_region(&self, region: Region) -> Option<NoteView> {
        let mut state = self.state.lock().await;
        if !state.editor.set_active(region) {
            return None;
        }
        Some(state.view())
    }

    pub async fn set_history_panel(&self, open: bool) -> NoteView {
        let mut state = self.state.lock().await;
        state.history_panel_open = open;
        state.view()
    }

    /// Copy the active region as plain text
    pub async fn copy_active(&self) -> CopyOutcome {
        let (region, text) = {
            let state = self.state.lock().await;
            let region = state.editor.active();
            match state.editor.get(region) {
                RegionContent::Text(html) => (region, to_plain_text(html)),
                _ => return CopyOutcome::NothingToCopy,
            }
        };

        if text.trim().is_empty() {
            return CopyOutcome::NothingToCopy;
        }

        let clipboard = Arc::clone(&self.clipboard);
        let chars = text.chars().count();
        let result = tokio::task::spawn_blocking(move || clipboard.set_text(&text)).await;

        match result {
            Ok(Ok(())) => {
                info!("Copied {} chars from {:?} region", chars, region);
                CopyOutcome::Copied { region, chars }
            }
            Ok(Err(e)) => {
                error!("Failed to copy text: {:#}", e);
                CopyOutcome::Failed {
                    message: "Copy failed".to_string(),
                }
            }
            Err(e) => {
                error!("Clipboard task failed: {}", e);
                CopyOutcome::Failed {
                    message: "Copy failed".to_string(),
                }
            }
        }
    }

    /// Start recording into the open note
    pub async fn start_recording(&self) -> NoteView {
        let mut state = self.state.lock().await;

        if state.recorder.state() != RecordingState::Idle {
            warn!("Start requested while {:?}", state.recorder.state());
            return state.view();
        }

        match state.recorder.start().await {
            Ok(true) => {
                state.status = STATUS_RECORDING.to_string();
                if let Some(lost) = state.recorder.take_capture_lost() {
                    self.watch_capture(lost);
                }
            }
            Ok(false) => {}
            Err(e) => state.status = e.user_message(),
        }

        state.view()
    }

    /// Stop recording and hand the audio to the transcription pipeline.
    ///
    /// Returns the pipeline task when audio was captured.
    pub async fn stop_recording(&self) -> Option<JoinHandle<()>> {
        let mut state = self.state.lock().await;
        self.finish_recording(&mut state, STATUS_NO_AUDIO).await
    }

    /// Stop the recorder and spawn the pipeline for whatever it captured
    async fn finish_recording(
        &self,
        state: &mut SessionState,
        no_audio_status: &str,
    ) -> Option<JoinHandle<()>> {
        let blob = match state.recorder.stop().await {
            Ok(StopOutcome::Captured(blob)) => blob,
            Ok(StopOutcome::NoAudio) => {
                state.status = no_audio_status.to_string();
                return None;
            }
            Ok(StopOutcome::NotRecording) => return None,
            Err(e) => {
                error!("Failed to process recording: {:#}", e);
                state.status = format!("Error processing recording: {}", e);
                return None;
            }
        };

        state.status = STATUS_PROCESSING.to_string();
        let note_id = state.note.id.clone();
        let session = self.clone();
        Some(tokio::spawn(async move {
            session.run_pipeline(note_id, blob).await;
        }))
    }

    fn watch_capture(&self, lost: CaptureLost) {
        let session = self.clone();
        tokio::spawn(async move {
            // Err: the capture ended through stop or cancel
            if lost.signal.await.is_ok() {
                session.handle_capture_lost(lost.capture_id).await;
            }
        });
    }

    /// The device went away mid-recording: stop and keep what was captured
    async fn handle_capture_lost(&self, capture_id: u64) {
        let mut state = self.state.lock().await;

        if state.recorder.capture_id() != capture_id || !state.recorder.is_recording() {
            debug!("Ignoring lost input for finished capture {}", capture_id);
            return;
        }

        warn!("Audio input lost, stopping recording");
        self.finish_recording(&mut state, STATUS_INPUT_LOST).await;
    }

    /// Record button: start when idle, stop when recording
    pub async fn toggle_recording(&self) -> Option<JoinHandle<()>> {
        let recording = self.state.lock().await.recorder.is_recording();
        if recording {
            self.stop_recording().await
        } else {
            self.start_recording().await;
            None
        }
    }

    /// Run an already captured recording through transcription and enrichment
    pub async fn process_audio(&self, blob: AudioBlob) {
        let note_id = {
            let mut state = self.state.lock().await;
            state.status = STATUS_PROCESSING.to_string();
            state.note.id.clone()
        };
        self.run_pipeline(note_id, blob).await;
    }

    /// Commit the open note, then open a history entry in its place
    pub async fn load_history_entry(&self, id: &str) -> Option<NoteView> {
        let mut state = self.state.lock().await;

        if state.history.get(id).is_none() {
            warn!("History entry {} not found", id);
            return None;
        }

        state.recorder.cancel().await;
        state.drafts.cancel();
        state.commit_current(&*self.store);

        // Re-read after the commit, which may have just replaced this entry
        let note = state.history.get(id).cloned()?;
        state.open(note);
        state.persist_draft(&*self.store);
        state.history_panel_open = false;
        state.status = STATUS_READY.to_string();

        info!("Loaded note {} from history", id);
        Some(state.view())
    }

    /// Re-open the persisted draft (without committing the open note).
    ///
    /// A running recording is cancelled and its audio discarded.
    pub async fn reload_draft(&self) -> NoteView {
        let mut state = self.state.lock().await;
        state.recorder.cancel().await;
        state.drafts.cancel();

        match self.store.load_draft() {
            Ok(Some(draft)) => state.open(draft),
            Ok(None) => debug!("No saved draft to reload"),
            Err(e) => warn!("Failed to load draft: {:#}", e),
        }
        state.persist_draft(&*self.store);
        state.status = STATUS_READY.to_string();

        state.view()
    }

    /// Release the recording (if any) and flush the draft
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.recorder.cancel().await;
        state.drafts.cancel();
        state.persist_draft(&*self.store);
        info!("Note session shut down");
    }
}
