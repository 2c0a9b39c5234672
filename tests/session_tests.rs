// Integration tests for the note session
//
// A scripted AI service and an in-process audio backend drive the full
// record -> transcribe -> enrich -> commit flow.

mod common;

use common::{harness, harness_with, speech_frame, FakeAi};
use std::time::Duration;
use voice_notes::audio::DeviceError;
use voice_notes::notes::Note;
use voice_notes::recording::RecordingState;
use voice_notes::session::{CopyOutcome, NoteView, Region, SessionConfig};
use voice_notes::storage::MemoryStore;

async fn record_one_frame(h: &common::Harness) -> tokio::task::JoinHandle<()> {
    let view = h.session.start_recording().await;
    assert_eq!(view.recording, RecordingState::Recording);
    assert!(h.feeder.push(speech_frame(0)).await);

    h.session
        .stop_recording()
        .await
        .expect("captured audio should start processing")
}

async fn wait_for_status(h: &common::Harness, status: &str) -> NoteView {
    for _ in 0..200 {
        let view = h.session.view().await;
        if view.status == status {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("status never became {:?}", status);
}

#[tokio::test]
async fn test_recording_is_transcribed_enriched_and_committed() {
    let h = harness(FakeAi::new(
        "hello",
        "# Greeting\n\nHello there.",
        "Someone said **hello**.",
    ));

    record_one_frame(&h).await.await.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.status, "Note ready.");
    assert_eq!(view.raw_transcription, "hello");
    assert_eq!(view.title.text, "Greeting");
    assert_eq!(view.polished.state, "content");
    assert!(view.polished.text.contains("<h1>Greeting</h1>"));
    assert_eq!(view.elaborated.state, "content");
    assert!(view.elaborated.text.contains("<strong>hello</strong>"));
    assert_eq!(view.recording, RecordingState::Idle);

    // Exactly one commit, holding the processed note
    assert_eq!(h.store.history_saves(), 1);
    let history = h.store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, view.note_id);
    assert_eq!(history[0].raw_transcription, "hello");
    assert!(!history[0].polished_note.is_empty());
    assert!(!history[0].elaborated_note.is_empty());

    // The draft follows the committed note
    assert_eq!(h.store.draft().unwrap(), history[0]);
}

#[tokio::test]
async fn test_second_recording_appends_to_transcript() {
    let h = harness(FakeAi::new("more", "Polished", "Elaborated"));

    record_one_frame(&h).await.await.unwrap();
    record_one_frame(&h).await.await.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.raw_transcription, "more more");

    // Re-committing the same note replaces its entry
    assert_eq!(h.store.history().len(), 1);
    assert_eq!(h.store.history_saves(), 2);
}

#[tokio::test]
async fn test_polish_failure_shows_inline_error() {
    let h = harness(FakeAi::new("hello", "", "Expanded note.").failing_polish("quota exceeded"));

    record_one_frame(&h).await.await.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.polished.state, "error");
    assert!(view.polished.text.contains("quota exceeded"));
    assert_eq!(view.elaborated.state, "content");
    assert_eq!(view.title.text, "Untitled Note");
    assert!(view.title.placeholder_active);

    assert_eq!(h.store.history_saves(), 1);
    let committed = &h.store.history()[0];
    assert_eq!(committed.polished_note, "");
    assert_eq!(committed.raw_transcription, "hello");
}

#[tokio::test]
async fn test_failed_polish_keeps_earlier_rendering() {
    let h = harness(
        FakeAi::new("hello", "", "Expanded.")
            .with_polish_sequence(vec![Ok("# First\n\nfirst polish"), Err("quota exceeded")]),
    );

    record_one_frame(&h).await.await.unwrap();
    let first = h.store.history()[0].polished_note.clone();
    assert!(first.contains("<h1>First</h1>"));

    record_one_frame(&h).await.await.unwrap();

    // The region shows the failure, the stored note keeps the earlier text
    let view = h.session.view().await;
    assert_eq!(view.polished.state, "error");
    assert!(view.polished.text.contains("quota exceeded"));

    let history = h.store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].raw_transcription, "hello hello");
    assert_eq!(history[0].polished_note, first);
    assert_eq!(history[0].title, "First");
    assert_eq!(h.store.draft().unwrap().polished_note, first);
    assert_eq!(h.session.current_note().await.polished_note, first);
}

#[tokio::test]
async fn test_both_enrichments_failing_still_commits_transcript() {
    let h = harness(
        FakeAi::new("hello", "", "")
            .failing_polish("down")
            .failing_elaboration("down"),
    );

    record_one_frame(&h).await.await.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.status, "Could not polish or elaborate the note.");
    assert_eq!(view.polished.state, "error");
    assert_eq!(view.elaborated.state, "error");
    assert_eq!(h.store.history().len(), 1);
}

#[tokio::test]
async fn test_zero_audio_skips_transcription() {
    let h = harness(FakeAi::new("hello", "p", "e"));

    h.session.start_recording().await;
    assert!(h.session.stop_recording().await.is_none());

    let view = h.session.view().await;
    assert_eq!(view.status, "No audio data captured. Please try again.");
    assert_eq!(view.recording, RecordingState::Idle);
    assert_eq!(h.ai.transcribe_calls(), 0);
    assert_eq!(h.store.history_saves(), 0);
}

#[tokio::test]
async fn test_empty_transcription_reports_failure() {
    let h = harness(FakeAi::new("   ", "p", "e"));

    record_one_frame(&h).await.await.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.status, "Transcription failed or returned empty.");
    assert_eq!(view.polished.state, "error");
    assert_eq!(h.ai.generate_calls(), 0);
    assert!(h.store.history().is_empty());
}

#[tokio::test]
async fn test_transcription_error_keeps_existing_polished_text() {
    let h = harness(FakeAi::new("", "p", "e").failing_transcription("offline"));
    h.session.edit(Region::Polished, "<p>keep me</p>").await;

    record_one_frame(&h).await.await.unwrap();

    let view = h.session.view().await;
    assert!(view.status.contains("offline"));
    assert_eq!(view.polished.state, "content");
    assert_eq!(view.polished.text, "<p>keep me</p>");
}

#[tokio::test]
async fn test_device_error_sets_status_and_stays_idle() {
    let h = harness(FakeAi::new("hello", "p", "e"));
    h.feeder.fail_next_start(DeviceError::PermissionDenied);

    let view = h.session.start_recording().await;
    assert_eq!(view.recording, RecordingState::Idle);
    assert_eq!(
        view.status,
        "Microphone permission denied. Please check your system privacy settings and try again."
    );
    assert!(!h.feeder.is_capturing());

    // The next attempt succeeds
    let view = h.session.start_recording().await;
    assert_eq!(view.recording, RecordingState::Recording);
    h.session.shutdown().await;
}

#[tokio::test]
async fn test_toggle_starts_then_stops() {
    let h = harness(FakeAi::new("hello", "p", "e"));

    assert!(h.session.toggle_recording().await.is_none());
    assert!(h.session.view().await.recording == RecordingState::Recording);
    assert!(h.feeder.push(speech_frame(0)).await);

    let handle = h.session.toggle_recording().await.expect("pipeline task");
    handle.await.unwrap();
    assert_eq!(h.session.view().await.status, "Note ready.");
}

#[tokio::test]
async fn test_lost_input_stops_and_processes_captured_audio() {
    let h = harness(FakeAi::new("hello", "# Cut short\n\nhello", "e"));

    h.session.start_recording().await;
    assert!(h.feeder.push(speech_frame(0)).await);
    h.feeder.disconnect();

    let view = wait_for_status(&h, "Note ready.").await;
    assert_eq!(view.recording, RecordingState::Idle);
    assert_eq!(view.title.text, "Cut short");
    assert!(!h.session.feedback_frame().await.active);

    assert_eq!(h.ai.transcribe_calls(), 1);
    assert_eq!(h.store.history().len(), 1);
    assert_eq!(h.store.history()[0].raw_transcription, "hello");
}

#[tokio::test]
async fn test_lost_input_without_audio_reports_error() {
    let h = harness(FakeAi::new("hello", "p", "e"));

    h.session.start_recording().await;
    h.feeder.disconnect();

    let view = wait_for_status(&h, "Recording stopped: the audio input was lost.").await;
    assert_eq!(view.recording, RecordingState::Idle);
    assert!(!h.session.feedback_frame().await.active);
    assert_eq!(h.ai.transcribe_calls(), 0);

    // The device can be opened again
    let view = h.session.start_recording().await;
    assert_eq!(view.recording, RecordingState::Recording);
    assert!(h.feeder.is_capturing());
    h.session.shutdown().await;
}

#[tokio::test]
async fn test_new_note_while_recording_discards_audio() {
    let h = harness(FakeAi::new("hello", "p", "e"));

    h.session.start_recording().await;
    h.feeder.push(speech_frame(0)).await;

    let view = h.session.new_note().await;
    assert_eq!(view.recording, RecordingState::Idle);
    assert_eq!(view.status, "Ready to record");
    assert!(!h.feeder.is_capturing());
    assert_eq!(h.ai.transcribe_calls(), 0);
}

#[tokio::test]
async fn test_stale_enrichment_does_not_touch_new_note() {
    let (ai, gate) = FakeAi::new("hello", "# Old\n\nold polish", "old elaboration").gated();
    let h = harness(ai);

    let pipeline = record_one_frame(&h).await;
    let recorded_id = h.session.view().await.note_id;

    // Wait until both enrichment calls are in flight
    while h.ai.generate_calls() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let fresh = h.session.new_note().await;
    assert_ne!(fresh.note_id, recorded_id);

    gate.add_permits(2);
    pipeline.await.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.note_id, fresh.note_id);
    assert!(view.title.placeholder_active);
    assert!(view.polished.placeholder_active);
    assert!(view.elaborated.placeholder_active);
    assert_eq!(view.raw_transcription, "");
    assert_eq!(view.status, "Ready to record");

    // The abandoned note was committed once, with its transcript only
    let history = h.store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, recorded_id);
    assert_eq!(history[0].raw_transcription, "hello");
    assert_eq!(history[0].polished_note, "");
    assert_eq!(h.store.history_saves(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_title_edits_are_debounced() {
    let h = harness(FakeAi::new("", "", ""));
    // Startup persists the initial draft
    assert_eq!(h.store.draft_saves(), 1);

    h.session.edit(Region::Title, "Sh").await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    h.session.edit(Region::Title, "Shopping").await;

    // 900ms after the second edit: still nothing
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(h.store.draft_saves(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.store.draft_saves(), 2);
    assert_eq!(h.store.draft().unwrap().title, "Shopping");
}

#[tokio::test]
async fn test_empty_note_is_not_committed() {
    let h = harness(FakeAi::new("", "", ""));

    h.session.edit(Region::Title, "   ").await;
    let view = h.session.new_note().await;

    assert_eq!(view.history_count, 0);
    assert_eq!(h.store.history_saves(), 0);
}

#[tokio::test]
async fn test_history_is_capped() {
    let config = SessionConfig {
        history_limit: 3,
        ..SessionConfig::default()
    };
    let h = harness_with(FakeAi::new("", "", ""), MemoryStore::new(), config);

    for i in 0..5 {
        h.session.edit(Region::Title, &format!("Note {}", i)).await;
        h.session.new_note().await;
    }

    let history = h.session.history().await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].title, "Note 4");
    assert_eq!(history[2].title, "Note 2");
    assert_eq!(h.store.history().len(), 3);
}

#[tokio::test]
async fn test_loading_history_entry_twice_is_idempotent() {
    let mut stored = Note::new();
    stored.title = "Groceries".to_string();
    stored.polished_note = "<p>milk</p>".to_string();

    let h = harness_with(
        FakeAi::new("", "", ""),
        MemoryStore::with_contents(vec![stored.clone()], None),
        SessionConfig::default(),
    );

    let first = h.session.load_history_entry(&stored.id).await.unwrap();
    let second = h.session.load_history_entry(&stored.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.title.text, "Groceries");
    assert_eq!(first.polished.text, "<p>milk</p>");
    assert!(first.elaborated.placeholder_active);
    assert_eq!(h.session.history().await, vec![stored.clone()]);
    assert_eq!(h.store.draft().unwrap(), stored);

    assert!(h.session.load_history_entry("note_missing").await.is_none());
}

#[tokio::test]
async fn test_loading_history_commits_open_note_first() {
    let stored = {
        let mut note = Note::new();
        note.title = "Older".to_string();
        note
    };
    let h = harness_with(
        FakeAi::new("", "", ""),
        MemoryStore::with_contents(vec![stored.clone()], None),
        SessionConfig::default(),
    );

    h.session.edit(Region::Title, "Current").await;
    let open_id = h.session.view().await.note_id;

    let view = h.session.load_history_entry(&stored.id).await.unwrap();
    assert_eq!(view.note_id, stored.id);
    assert!(!view.history_panel_open);

    let history = h.session.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, open_id);
    assert_eq!(history[0].title, "Current");
}

#[tokio::test]
async fn test_draft_is_restored_on_startup() {
    let mut draft = Note::new();
    draft.title = "Unfinished".to_string();
    draft.raw_transcription = "half a thought".to_string();

    let h = harness_with(
        FakeAi::new("", "", ""),
        MemoryStore::with_contents(Vec::new(), Some(draft.clone())),
        SessionConfig::default(),
    );

    let view = h.session.view().await;
    assert_eq!(view.note_id, draft.id);
    assert_eq!(view.title.text, "Unfinished");
    assert_eq!(view.raw_transcription, "half a thought");

    // Reloading twice yields the same view
    let first = h.session.reload_draft().await;
    let second = h.session.reload_draft().await;
    assert_eq!(first, second);
    assert_eq!(first, view);
}

#[tokio::test]
async fn test_reloading_draft_cancels_recording() {
    let h = harness(FakeAi::new("hello", "p", "e"));
    h.session.edit(Region::Title, "Saved").await;
    h.session.save_draft_now().await;

    h.session.start_recording().await;
    assert!(h.feeder.push(speech_frame(0)).await);

    let view = h.session.reload_draft().await;
    assert_eq!(view.recording, RecordingState::Idle);
    assert_eq!(view.title.text, "Saved");
    assert_eq!(view.status, "Ready to record");
    assert!(!h.feeder.is_capturing());
    assert!(!h.session.feedback_frame().await.active);

    // Stopping afterwards has nothing to process
    assert!(h.session.stop_recording().await.is_none());
    assert_eq!(h.ai.transcribe_calls(), 0);
}

#[tokio::test]
async fn test_copy_uses_active_region_as_plain_text() {
    let h = harness(FakeAi::new("", "", ""));

    assert_eq!(h.session.copy_active().await, CopyOutcome::NothingToCopy);

    h.session
        .edit(Region::Polished, "<p>Hello <strong>world</strong></p>")
        .await;
    h.session
        .edit(Region::Elaborated, "<ul><li>one</li><li>two</li></ul>")
        .await;

    let outcome = h.session.copy_active().await;
    assert_eq!(
        outcome,
        CopyOutcome::Copied {
            region: Region::Polished,
            chars: 11
        }
    );
    assert_eq!(h.clipboard.contents().as_deref(), Some("Hello world"));

    assert!(h.session.set_active_region(Region::Elaborated).await.is_some());
    h.session.copy_active().await;
    assert_eq!(h.clipboard.contents().as_deref(), Some("one\ntwo"));

    assert!(h.session.set_active_region(Region::Title).await.is_none());
}

#[tokio::test]
async fn test_history_panel_flag() {
    let h = harness(FakeAi::new("", "", ""));

    assert!(h.session.set_history_panel(true).await.history_panel_open);
    assert!(!h.session.set_history_panel(false).await.history_panel_open);
}
