//! Terminal rendering for conversation turns and summaries.
//!
//! `ChatRenderer` prints each turn as a speaker line plus its translation,
//! and renders summaries (markdown headers and lists) through `termimad`.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use termimad::MadSkin;

use medbridge_core::conversation::search::{self, HighlightStyle};
use medbridge_types::message::{Message, SpeakerRole};

/// Reverse-video yellow, used for search matches when colours are enabled.
const TERMINAL_HIGHLIGHT: HighlightStyle<'static> = HighlightStyle {
    open: "\u{1b}[1;30;43m",
    close: "\u{1b}[0m",
};

/// Terminal renderer for the conversation log.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        skin.headers[0].set_fg(termimad::crossterm::style::Color::Cyan);
        skin.headers[1].set_fg(termimad::crossterm::style::Color::Cyan);
        Self { skin }
    }

    /// Print one turn. Matches of `query` are highlighted in both texts.
    pub fn print_message(&self, message: &Message, query: Option<&str>) {
        let time = message.timestamp.format("%H:%M:%S");
        let speaker = match message.role {
            SpeakerRole::Doctor => style(message.role.to_string()).cyan().bold(),
            SpeakerRole::Patient => style(message.role.to_string()).magenta().bold(),
        };

        let original = if message.is_audio_only() {
            style(message.original_text.clone()).dim().italic().to_string()
        } else {
            self.mark(&message.original_text, query)
        };

        println!("  {} {} {}", style(time).dim(), speaker, original);
        println!(
            "           {} {}",
            style(format!("({})", message.target_language)).dim(),
            self.mark(&message.translated_text, query)
        );
        if message.has_playable_audio() {
            let bytes = message.audio_bytes.as_ref().map_or(0, Vec::len);
            println!(
                "           {} {}",
                style("♪").yellow(),
                style(format!("audio clip, {}", human_bytes(bytes))).dim()
            );
        }
    }

    /// Print a whole log, or a hint when it is empty.
    pub fn print_log(&self, messages: &[Message], query: Option<&str>) {
        if messages.is_empty() {
            let hint = if query.is_some() {
                "No matching messages."
            } else {
                "No messages in this room yet."
            };
            println!("  {}", style(hint).dim());
            return;
        }
        for message in messages {
            self.print_message(message, query);
        }
    }

    /// Render a markdown summary for the terminal.
    pub fn render_summary(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    fn mark(&self, text: &str, query: Option<&str>) -> String {
        match query {
            Some(q) => {
                let style = if console::colors_enabled() {
                    TERMINAL_HIGHLIGHT
                } else {
                    HighlightStyle::MARKDOWN
                };
                search::highlight(text, q, style).into_owned()
            }
            None => text.to_string(),
        }
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A steady-ticking spinner shown while an oracle call is in flight.
pub fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn human_bytes(bytes: usize) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        b if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{b} B"),
    }
}
