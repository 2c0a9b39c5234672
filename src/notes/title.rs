use regex::Regex;
use std::sync::OnceLock;

/// Default maximum title length (in characters) for titles taken from body text
pub const DEFAULT_TITLE_MAX_CHARS: usize = 50;

/// Lines this short (after stripping) never become a title
const MIN_TITLE_CHARS: usize = 3;

const ELLIPSIS: &str = "...";

fn leading_decoration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[#>*_~`+\-]+\s*|\d+[.)]\s+|\[[ xX]\]\s+)+").expect("valid regex")
    })
}

fn inline_emphasis() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*|__|~~|`").expect("valid regex"))
}

fn trailing_decoration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s#*_~`]+$").expect("valid regex"))
}

/// Infer a note title from polished markdown.
///
/// The first `#` heading wins. Otherwise the first line longer than three
/// characters once its markdown decoration is stripped is used, truncated to
/// `max_chars` with an ellipsis. `None` means keep the placeholder.
pub fn infer_title(markdown: &str, max_chars: usize) -> Option<String> {
    for line in markdown.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('#') {
            continue;
        }

        let heading = strip_markdown(trimmed);
        if !heading.is_empty() {
            return Some(heading);
        }
    }

    markdown
        .lines()
        .map(strip_markdown)
        .find(|line| line.chars().count() > MIN_TITLE_CHARS)
        .map(|line| truncate(&line, max_chars))
}

/// Strip leading block markers (headings, list bullets, quotes, numbering)
/// and inline emphasis from a single line
pub fn strip_markdown(line: &str) -> String {
    let line = leading_decoration().replace(line.trim(), "");
    let line = inline_emphasis().replace_all(&line, "");
    trailing_decoration().replace(&line, "").trim().to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    format!("{}{}", cut.trim_end(), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_becomes_title() {
        let md = "Some intro\n# My Title\nbody";
        assert_eq!(infer_title(md, 50).as_deref(), Some("My Title"));
    }

    #[test]
    fn deeper_headings_count() {
        assert_eq!(
            infer_title("## **Weekly sync** ##", 50).as_deref(),
            Some("Weekly sync")
        );
    }

    #[test]
    fn list_item_is_stripped() {
        let md = "\n- some note here\n- another";
        assert_eq!(infer_title(md, 50).as_deref(), Some("some note here"));
    }

    #[test]
    fn numbered_and_quoted_lines_are_stripped() {
        assert_eq!(strip_markdown("1. first step"), "first step");
        assert_eq!(strip_markdown("> quoted text"), "quoted text");
        assert_eq!(strip_markdown("**Bold** lead"), "Bold lead");
        assert_eq!(strip_markdown("- [x] done item"), "done item");
    }

    #[test]
    fn long_lines_are_truncated_with_ellipsis() {
        let md = "This is a rather long first line that keeps going well past the limit";
        let title = infer_title(md, 20).unwrap();
        assert_eq!(title, "This is a rather lon...");
    }

    #[test]
    fn short_lines_leave_placeholder() {
        assert_eq!(infer_title("- ab\n\n***\n#\n", 50), None);
        assert_eq!(infer_title("", 50), None);
    }

    #[test]
    fn short_lines_are_skipped_for_a_later_candidate() {
        assert_eq!(
            infer_title("ok\n- real content", 50).as_deref(),
            Some("real content")
        );
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = infer_title("ééééééééééé", 5).unwrap();
        assert_eq!(title, "ééééé...");
    }
}
