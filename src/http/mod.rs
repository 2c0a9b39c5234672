//! HTTP API for driving the note session
//!
//! - GET /note, POST /note/new, PUT /note/:region, POST /note/active, POST /note/copy
//! - POST /record/start, /record/stop, /record/toggle; GET /record/feedback
//! - GET /history, POST /history/panel, POST /history/:id/load
//! - GET /health

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
