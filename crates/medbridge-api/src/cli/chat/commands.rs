//! Slash command parsing and help for the chat loop.
//!
//! Commands start with `/` and switch the speaker, language, or room,
//! attach audio, and query the log.

use std::path::PathBuf;

use console::style;

use medbridge_types::message::SpeakerRole;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Switch who is speaking.
    Role(SpeakerRole),
    /// Switch the target language (validated against config by the loop).
    Lang(String),
    /// Move to another room.
    Room(String),
    /// Submit a recorded clip, optionally with typed text.
    Audio { path: PathBuf, text: Option<String> },
    Summary,
    History,
    Search(String),
    /// Unknown command or bad arguments; carries the message to show.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd.to_lowercase(), Some(rest.trim()).filter(|a| !a.is_empty())),
        None => (trimmed.to_lowercase(), None),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/summary" | "/sum" => ChatCommand::Summary,
        "/history" => ChatCommand::History,
        "/role" => match arg.map(str::parse::<SpeakerRole>) {
            Some(Ok(role)) => ChatCommand::Role(role),
            _ => ChatCommand::Unknown("/role expects doctor or patient".to_string()),
        },
        "/lang" | "/language" => match arg {
            Some(lang) => ChatCommand::Lang(lang.to_string()),
            None => ChatCommand::Unknown("/lang requires a language".to_string()),
        },
        "/room" => match arg {
            Some(room) => ChatCommand::Room(room.to_string()),
            None => ChatCommand::Unknown("/room requires a room id".to_string()),
        },
        "/audio" => match arg {
            Some(rest) => {
                let (path, text) = match rest.split_once(char::is_whitespace) {
                    Some((path, text)) => (path, Some(text.trim().to_string())),
                    None => (rest, None),
                };
                ChatCommand::Audio {
                    path: PathBuf::from(path),
                    text: text.filter(|t| !t.is_empty()),
                }
            }
            None => ChatCommand::Unknown("/audio requires a file path".to_string()),
        },
        "/search" | "/find" => match arg {
            Some(query) => ChatCommand::Search(query.to_string()),
            None => ChatCommand::Unknown("/search requires a query".to_string()),
        },
        other => ChatCommand::Unknown(format!("unknown command {other}")),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help(languages: &[String]) {
    let rows = [
        ("/role <doctor|patient>", "Switch who is speaking"),
        ("/lang <language>", "Switch the target language"),
        ("/room <id>", "Join another room"),
        ("/audio <file> [text]", "Send a recorded clip, optionally with text"),
        ("/summary", "Summarize this room's conversation"),
        ("/history", "Show the full log of this room"),
        ("/search <text>", "Show turns containing text"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the session"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (cmd, desc) in rows {
        println!("  {:<24} {}", style(cmd).cyan(), desc);
    }
    println!();
    println!(
        "  {} {}",
        style("Languages:").dim(),
        style(languages.join(", ")).dim()
    );
    println!(
        "  {}",
        style("Anything else you type is translated and added to the log.").dim()
    );
    println!();
}
