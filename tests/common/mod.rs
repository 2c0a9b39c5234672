// Shared fakes for the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use voice_notes::ai::{AiError, AudioPayload, NoteAi};
use voice_notes::audio::{AudioFrame, ChannelBackend, ChannelFeeder};
use voice_notes::clipboard::MemoryClipboard;
use voice_notes::session::{NoteSession, SessionConfig};
use voice_notes::storage::MemoryStore;

/// Scripted AI service
pub struct FakeAi {
    transcript: Result<String, String>,
    polished: Result<String, String>,
    elaborated: Result<String, String>,
    /// Polish replies used (in order) before falling back to `polished`
    polish_sequence: Mutex<VecDeque<Result<String, String>>>,
    /// When set, each enrichment call waits for a permit
    gate: Option<Arc<Semaphore>>,
    transcribe_calls: AtomicUsize,
    generate_calls: AtomicUsize,
}

impl FakeAi {
    pub fn new(transcript: &str, polished: &str, elaborated: &str) -> Self {
        Self {
            transcript: Ok(transcript.to_string()),
            polished: Ok(polished.to_string()),
            elaborated: Ok(elaborated.to_string()),
            polish_sequence: Mutex::new(VecDeque::new()),
            gate: None,
            transcribe_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_transcription(mut self, error: &str) -> Self {
        self.transcript = Err(error.to_string());
        self
    }

    pub fn failing_polish(mut self, error: &str) -> Self {
        self.polished = Err(error.to_string());
        self
    }

    pub fn failing_elaboration(mut self, error: &str) -> Self {
        self.elaborated = Err(error.to_string());
        self
    }

    /// Script the first polish replies; `Err` entries fail that call
    pub fn with_polish_sequence(self, replies: Vec<Result<&str, &str>>) -> Self {
        *self.polish_sequence.lock().unwrap() = replies
            .into_iter()
            .map(|reply| reply.map(str::to_string).map_err(str::to_string))
            .collect();
        self
    }

    /// Hold enrichment calls until permits are added to the returned semaphore
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn transcribe_calls(&self) -> usize {
        self.transcribe_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NoteAi for FakeAi {
    async fn transcribe(&self, audio: &AudioPayload, _instruction: &str) -> Result<String, AiError> {
        assert_eq!(audio.mime_type, "audio/wav");
        assert!(!audio.data.is_empty());
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        self.transcript.clone().map_err(AiError::Other)
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if prompt.contains("polished, well-formatted") {
            let scripted = self.polish_sequence.lock().unwrap().pop_front();
            scripted
                .unwrap_or_else(|| self.polished.clone())
                .map_err(AiError::Other)
        } else {
            self.elaborated.clone().map_err(AiError::Other)
        }
    }
}

pub struct Harness {
    pub session: NoteSession,
    pub feeder: ChannelFeeder,
    pub ai: Arc<FakeAi>,
    pub store: Arc<MemoryStore>,
    pub clipboard: Arc<MemoryClipboard>,
}

pub fn harness(ai: FakeAi) -> Harness {
    harness_with(ai, MemoryStore::new(), SessionConfig::default())
}

pub fn harness_with(ai: FakeAi, store: MemoryStore, config: SessionConfig) -> Harness {
    let (backend, feeder) = ChannelBackend::new();
    let ai = Arc::new(ai);
    let store = Arc::new(store);
    let clipboard = Arc::new(MemoryClipboard::new());

    let session = NoteSession::new(
        config,
        Box::new(backend),
        ai.clone(),
        store.clone(),
        clipboard.clone(),
    );

    Harness {
        session,
        feeder,
        ai,
        store,
        clipboard,
    }
}

/// 100ms of a 440Hz tone at 16kHz mono
pub fn speech_frame(timestamp_ms: u64) -> AudioFrame {
    let samples = (0..1600)
        .map(|i| {
            let t = i as f32 / 16000.0;
            ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 8000.0) as i16
        })
        .collect();

    AudioFrame {
        samples,
        sample_rate: 16000,
        channels: 1,
        timestamp_ms,
    }
}
