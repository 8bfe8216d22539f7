//! One-shot room commands: send, history, rooms, summary.

use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use medbridge_core::conversation::search::HighlightStyle;
use medbridge_core::conversation::{
    ControllerError, IgnoreReason, Intake, IntakeOutcome, SessionContext, SummaryOutcome,
};
use medbridge_types::message::{RoomId, SpeakerRole};

use crate::cli::chat::renderer::{ChatRenderer, spinner};
use crate::state::AppState;
use crate::view::{IntakeView, MessageView, SummaryView};

const MISSING_CREDENTIAL_HINT: &str =
    "no API token configured. Export HF_API_KEY or run `medbridge credential set`";

/// Room from the flag, or the configured default.
pub fn room_or_default(state: &AppState, room: Option<String>) -> RoomId {
    RoomId::from(room.unwrap_or_else(|| state.config.default_room.clone()))
}

/// Submit one intake built from typed text and/or an audio file.
#[allow(clippy::too_many_arguments)]
pub async fn send_message(
    state: &AppState,
    room: RoomId,
    role: SpeakerRole,
    language: String,
    audio: Option<&Path>,
    text: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut intake = Intake {
        typed_text: text,
        audio: None,
    };
    if let Some(path) = audio {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read audio file {}", path.display()))?;
        intake = intake.with_audio(bytes);
    }

    let mut ctx = SessionContext::new(room, role, language);
    let progress = (!json && !quiet).then(|| spinner("translating..."));
    let result = state.controller.submit(&mut ctx, intake).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(ControllerError::MissingCredential) => bail!(MISSING_CREDENTIAL_HINT),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&IntakeView::new(outcome, false))?
        );
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    match outcome {
        IntakeOutcome::Persisted(message) => {
            ChatRenderer::new().print_message(&message, None);
        }
        IntakeOutcome::Ignored(IgnoreReason::NoInput) => {
            println!(
                "  {} Nothing to send: provide text or --audio.",
                style("i").blue().bold()
            );
        }
        IntakeOutcome::Ignored(IgnoreReason::DuplicateAudio) => {
            println!("  {} Audio already processed.", style("i").blue().bold());
        }
    }
    Ok(())
}

/// Print a room's log, optionally filtered by `search`.
pub async fn show_history(
    state: &AppState,
    room: RoomId,
    search: Option<String>,
    json: bool,
) -> Result<()> {
    let messages = state.controller.history(&room, search.as_deref()).await?;

    if json {
        let views: Vec<MessageView> = messages
            .into_iter()
            .map(|m| {
                let view = MessageView::new(m, false);
                match search.as_deref() {
                    Some(q) => view.highlighted(q, HighlightStyle::MARKDOWN),
                    None => view,
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("── room").dim(), style(&room).cyan().bold());
    ChatRenderer::new().print_log(&messages, search.as_deref());
    println!();
    Ok(())
}

/// List every room with stored history.
pub async fn list_rooms(state: &AppState, json: bool) -> Result<()> {
    let rooms = state.controller.rooms().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rooms)?);
        return Ok(());
    }

    if rooms.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style("medbridge chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Room").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Last activity").fg(Color::White),
    ]);

    for room in &rooms {
        table.add_row(vec![
            Cell::new(&room.room_id).fg(Color::Cyan),
            Cell::new(room.message_count),
            Cell::new(
                room.last_activity
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
            .fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} room{}",
        style(rooms.len()).bold(),
        if rooms.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Print the structured clinical summary of a room.
pub async fn show_summary(state: &AppState, room: RoomId, json: bool) -> Result<()> {
    let progress = (!json).then(|| spinner("summarizing..."));
    let result = state.controller.summarize(&room).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(ControllerError::MissingCredential) => bail!(MISSING_CREDENTIAL_HINT),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&SummaryView::from(outcome))?);
        return Ok(());
    }

    match outcome {
        SummaryOutcome::NoHistory => {
            println!(
                "  {} No conversation history to summarize in {}.",
                style("i").blue().bold(),
                style(&room).bold()
            );
        }
        SummaryOutcome::Summary(summary) => {
            println!();
            println!("  {} {}", style("Summary of").bold(), style(&room).cyan().bold());
            println!("{}", ChatRenderer::new().render_summary(&summary));
        }
    }
    Ok(())
}
