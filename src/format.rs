use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Message, MessageRole};

/// Footnote markers of the form `[^1]`, `[^23]` left behind by the chat UI.
static FOOTNOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^\d+\]").expect("footnote regex is valid"));

/// Renders a labeled block for the case comments, or nothing when the content
/// is absent/blank. Whitespace-only content counts as absent.
pub fn format_item(label: &str, content: Option<&str>) -> String {
    match content {
        Some(text) if !text.trim().is_empty() => format!("{label}:\n{text}\n"),
        _ => String::new(),
    }
}

/// Flattens the chat transcript into the case comments, preserving message
/// order. User turns are labeled "Question:", everything else "Answer:".
pub fn format_chat_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let mut formatted = String::from("Chat History\n");
    for message in messages {
        formatted.push_str(match message.role {
            MessageRole::User => "Question:\n",
            _ => "Answer:\n",
        });
        formatted.push_str(&FOOTNOTE_RE.replace_all(&message.content, ""));
        formatted.push('\n');
    }
    formatted
}
