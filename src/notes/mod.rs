//! Note data model
//!
//! - `Note`: one recording session's transcript plus its polished and
//!   elaborated renderings
//! - `History`: bounded, most-recent-first log of committed notes
//! - Title inference and markdown rendering for AI output

mod history;
mod markdown;
mod note;
mod title;

pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use markdown::{render_markdown, to_plain_text};
pub use note::Note;
pub use title::{infer_title, strip_markdown, DEFAULT_TITLE_MAX_CHARS};
