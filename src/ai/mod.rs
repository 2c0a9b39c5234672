pub mod client;
pub mod messages;
pub mod prompts;

pub use client::{AiError, AudioPayload, GeminiClient, NoteAi};
pub use messages::{GenerateContentRequest, GenerateContentResponse};
