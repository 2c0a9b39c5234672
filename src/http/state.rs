use crate::session::NoteSession;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single note session driven by the API
    pub session: NoteSession,
}

impl AppState {
    pub fn new(session: NoteSession) -> Self {
        Self { session }
    }
}
