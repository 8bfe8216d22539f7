//! Async readline input for the chat loop.
//!
//! Wraps `rustyline_async::Readline` so the loop can await a line while
//! also listening for room events.

use console::style;
use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

use medbridge_core::conversation::SessionContext;

/// Events produced by the input handler.
#[derive(Debug)]
pub enum InputEvent {
    /// User submitted a line, as typed (possibly blank).
    Line(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Create the input handler with a prompt for `ctx`.
    ///
    /// The returned `SharedWriter` prints without corrupting the prompt line.
    pub fn new(ctx: &SessionContext) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt_for(ctx))?;
        Ok((Self { rl }, stdout))
    }

    /// Refresh the prompt after the speaker, language, or room changed.
    pub fn refresh_prompt(&mut self, ctx: &SessionContext) {
        let _ = self.rl.update_prompt(&prompt_for(ctx));
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => InputEvent::Line(line),
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(_) => InputEvent::Eof,
        }
    }

    pub fn clear(&mut self) {
        let _ = self.rl.clear();
    }
}

/// `  Doctor@Room-1 → Spanish > `
pub fn prompt_for(ctx: &SessionContext) -> String {
    format!(
        "  {}{}{} {} {} ",
        style(ctx.role).green().bold(),
        style("@").dim(),
        style(&ctx.room).bold(),
        style(format!("→ {}", ctx.target_language)).dim(),
        style(">").green().bold()
    )
}
