//! History search and match highlighting.

use std::borrow::Cow;

use medbridge_types::message::Message;
use regex::{Captures, RegexBuilder};

/// Markers wrapped around each highlighted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightStyle<'a> {
    pub open: &'a str,
    pub close: &'a str,
}

impl HighlightStyle<'static> {
    /// Markdown bold.
    pub const MARKDOWN: Self = Self {
        open: "**",
        close: "**",
    };
}

/// Case-insensitive substring match on either text of the message.
///
/// A blank query matches everything; any other query is matched as given,
/// surrounding whitespace included.
pub fn matches(message: &Message, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    message.original_text.to_lowercase().contains(&needle)
        || message.translated_text.to_lowercase().contains(&needle)
}

/// Keep the messages matching `query`, preserving their order.
pub fn filter(messages: Vec<Message>, query: Option<&str>) -> Vec<Message> {
    match query {
        Some(q) if !q.trim().is_empty() => messages.into_iter().filter(|m| matches(m, q)).collect(),
        _ => messages,
    }
}

/// Wrap every case-insensitive occurrence of `query` in `text` with the
/// style's markers. The query is matched literally.
pub fn highlight<'t>(text: &'t str, query: &str, style: HighlightStyle<'_>) -> Cow<'t, str> {
    if query.trim().is_empty() {
        return Cow::Borrowed(text);
    }

    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return Cow::Borrowed(text);
    };

    pattern.replace_all(text, |caps: &Captures<'_>| {
        format!("{}{}{}", style.open, &caps[0], style.close)
    })
}
