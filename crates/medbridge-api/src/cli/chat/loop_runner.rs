//! Main chat loop orchestration.
//!
//! Shows the room log, then reads typed lines and slash commands while
//! listening for room events. Every persisted turn, whether from this
//! loop or another task sharing the controller, is printed from the
//! `MessageAppended` event.

use console::style;
use dialoguer::Password;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use medbridge_core::conversation::{
    ControllerError, IgnoreReason, Intake, IntakeOutcome, SessionContext, SummaryOutcome,
};
use medbridge_core::service::credential::Credential;
use medbridge_types::event::RoomEvent;
use medbridge_types::message::{Message, RoomId};

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{ChatRenderer, spinner};

/// What woke the loop up.
enum Step {
    Input(InputEvent),
    Event(Result<RoomEvent, RecvError>),
}

/// Run the interactive session until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState, mut ctx: SessionContext) -> anyhow::Result<()> {
    let controller = &state.controller;
    let renderer = ChatRenderer::new();

    if !controller.has_credential() {
        prompt_for_credential(state)?;
    }

    let source = controller.credential_source().map(ToString::to_string);
    print_welcome_banner(&ctx, &state.config.model, source.as_deref());

    let mut last_shown = show_room(state, &renderer, &ctx.room).await;
    let mut events = controller.events().subscribe();

    let (mut input, _writer) =
        ChatInput::new(&ctx).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let step = tokio::select! {
            event = input.read_line() => Step::Input(event),
            received = events.recv() => Step::Event(received),
        };

        match step {
            Step::Event(Ok(RoomEvent::MessageAppended { room_id, message_id })) => {
                if room_id == ctx.room && message_id > last_shown {
                    last_shown = print_new(state, &renderer, &ctx.room, last_shown).await;
                }
            }
            Step::Event(Err(RecvError::Lagged(skipped))) => {
                debug!(skipped, "room events lagged, reloading log");
                last_shown = print_new(state, &renderer, &ctx.room, last_shown).await;
            }
            Step::Event(Err(RecvError::Closed)) => break,

            Step::Input(InputEvent::Eof) => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            Step::Input(InputEvent::Interrupted) => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep typing.").dim());
            }
            Step::Input(InputEvent::Line(text)) => {
                if text.trim().is_empty() {
                    continue;
                }

                let Some(cmd) = commands::parse(&text) else {
                    submit(state, &mut ctx, Intake::text(text)).await;
                    continue;
                };

                match cmd {
                    ChatCommand::Help => commands::print_help(&state.config.languages),
                    ChatCommand::Clear => input.clear(),
                    ChatCommand::Exit => {
                        println!("\n  {}", style("Session ended.").dim());
                        break;
                    }
                    ChatCommand::Role(role) => {
                        ctx.role = role;
                        input.refresh_prompt(&ctx);
                        println!("  {} Now speaking as {}", style("*").cyan(), style(role).bold());
                    }
                    ChatCommand::Lang(lang) => match state.config.canonical_language(&lang) {
                        Some(canonical) => {
                            ctx.target_language = canonical.to_string();
                            input.refresh_prompt(&ctx);
                            println!(
                                "  {} Translating into {}",
                                style("*").cyan(),
                                style(canonical).bold()
                            );
                        }
                        None => println!(
                            "  {} Unsupported language '{}'. Choose one of: {}",
                            style("?").yellow().bold(),
                            lang,
                            state.config.languages.join(", ")
                        ),
                    },
                    ChatCommand::Room(room) => {
                        ctx.room = RoomId::from(room);
                        input.refresh_prompt(&ctx);
                        last_shown = show_room(state, &renderer, &ctx.room).await;
                    }
                    ChatCommand::Audio { path, text } => match tokio::fs::read(&path).await {
                        Ok(bytes) => {
                            let intake = match text {
                                Some(text) => Intake::text(text).with_audio(bytes),
                                None => Intake::audio(bytes),
                            };
                            submit(state, &mut ctx, intake).await;
                        }
                        Err(e) => println!(
                            "  {} Could not read {}: {e}",
                            style("!").red().bold(),
                            path.display()
                        ),
                    },
                    ChatCommand::Summary => summarize(state, &renderer, &ctx.room).await,
                    ChatCommand::History => {
                        if let Some(messages) = load_log(state, &ctx.room, None).await {
                            println!();
                            renderer.print_log(&messages, None);
                            println!();
                        }
                    }
                    ChatCommand::Search(query) => {
                        let search = Some(query.as_str());
                        if let Some(messages) = load_log(state, &ctx.room, search).await {
                            println!();
                            renderer.print_log(&messages, search);
                            println!();
                        }
                    }
                    ChatCommand::Unknown(msg) => println!(
                        "  {} {}. Type /help for available commands.",
                        style("?").yellow().bold(),
                        style(msg).dim()
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Ask for a token when none was found in the environment or keychain.
///
/// The entered token is used for this session only.
fn prompt_for_credential(state: &AppState) -> anyhow::Result<()> {
    if !console::user_attended() {
        return Ok(());
    }

    println!(
        "\n  {} No API token found in HF_API_KEY or the keychain.",
        style("!").yellow().bold()
    );
    let value = Password::new()
        .with_prompt("  Hugging Face API token (Enter to skip)")
        .allow_empty_password(true)
        .interact()?;

    match Credential::direct(value) {
        Some(credential) => {
            state.controller.attach_credential(&credential)?;
            println!(
                "  {} Token accepted for this session ({}). Use {} to keep it.",
                style("*").cyan(),
                credential.masked(),
                style("medbridge credential set").yellow()
            );
        }
        None => println!(
            "  {} Continuing without a token; messages cannot be sent.",
            style("!").yellow().bold()
        ),
    }
    Ok(())
}

/// Submit one intake and report anything that will not show up as an event.
async fn submit(state: &AppState, ctx: &mut SessionContext, intake: Intake) {
    let progress = spinner("translating...");
    let result = state.controller.submit(ctx, intake).await;
    progress.finish_and_clear();

    match result {
        // Printed when the room event arrives.
        Ok(IntakeOutcome::Persisted(_)) => {}
        Ok(IntakeOutcome::Ignored(IgnoreReason::DuplicateAudio)) => println!(
            "  {}",
            style("That audio clip was already sent; nothing new to add.").dim()
        ),
        Ok(IntakeOutcome::Ignored(IgnoreReason::NoInput)) => {}
        Err(ControllerError::MissingCredential) => println!(
            "  {} Please provide a Hugging Face API token (set HF_API_KEY or run {}).",
            style("!").yellow().bold(),
            style("medbridge credential set").yellow()
        ),
        Err(e) => println!("  {} {e}", style("!").red().bold()),
    }
}

async fn summarize(state: &AppState, renderer: &ChatRenderer, room: &RoomId) {
    let progress = spinner("summarizing...");
    let result = state.controller.summarize(room).await;
    progress.finish_and_clear();

    match result {
        Ok(SummaryOutcome::NoHistory) => {
            println!("  {}", style("No conversation history to summarize.").dim())
        }
        Ok(SummaryOutcome::Summary(summary)) => {
            println!();
            println!("  {} {}", style("Summary of").bold(), style(room).cyan().bold());
            println!("{}", renderer.render_summary(&summary));
        }
        Err(ControllerError::MissingCredential) => println!(
            "  {} Please provide a Hugging Face API token to generate a summary.",
            style("!").yellow().bold()
        ),
        Err(e) => println!("  {} {e}", style("!").red().bold()),
    }
}

/// Read a room's log, printing the error instead when the store fails.
async fn load_log(state: &AppState, room: &RoomId, search: Option<&str>) -> Option<Vec<Message>> {
    match state.controller.history(room, search).await {
        Ok(messages) => Some(messages),
        Err(e) => {
            warn!(error = %e, room = %room, "failed to read room log");
            println!("  {} {e}", style("!").red().bold());
            None
        }
    }
}

/// Print a room header and its full log. Returns the last shown message id.
///
/// Returns 0 when the log could not be read, so the next event replays it.
async fn show_room(state: &AppState, renderer: &ChatRenderer, room: &RoomId) -> i64 {
    println!("  {} {}", style("── room").dim(), style(room).cyan().bold());
    let Some(messages) = load_log(state, room, None).await else {
        return 0;
    };
    renderer.print_log(&messages, None);
    println!();
    messages.last().map_or(0, |m| m.id)
}

/// Print the room's turns newer than `after`. Returns the new last id.
async fn print_new(state: &AppState, renderer: &ChatRenderer, room: &RoomId, after: i64) -> i64 {
    let Some(messages) = load_log(state, room, None).await else {
        return after;
    };
    let mut last = after;
    for message in messages.iter().filter(|m| m.id > after) {
        renderer.print_message(message, None);
        last = last.max(message.id);
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbridge_core::service::credential::{Credential, CredentialService};
    use medbridge_infra::sqlite::pool::DatabasePool;
    use medbridge_types::config::GlobalConfig;
    use medbridge_types::message::SpeakerRole;
    use tempfile::TempDir;

    async fn state_in(dir: &TempDir) -> AppState {
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("chat.db").display());
        let state = AppState::from_parts(
            GlobalConfig::default(),
            dir.path().to_path_buf(),
            db_url,
            CredentialService::new(Vec::new()),
        )
        .await
        .unwrap();
        state
            .controller
            .attach_credential(&Credential::direct("hf_test_token").unwrap())
            .unwrap();
        state
    }

    #[tokio::test]
    async fn test_log_readers_track_last_id() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir).await;
        let renderer = ChatRenderer::new();
        let room = RoomId::from("Room-1");

        assert_eq!(show_room(&state, &renderer, &room).await, 0);

        let mut ctx = SessionContext::new(room.clone(), SpeakerRole::Patient, "English");
        state
            .controller
            .submit(&mut ctx, Intake::audio(vec![1, 2, 3]))
            .await
            .unwrap();

        assert_eq!(print_new(&state, &renderer, &room, 0).await, 1);
        assert_eq!(show_room(&state, &renderer, &room).await, 1);
    }

    #[tokio::test]
    async fn test_store_read_failure_does_not_end_session() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir).await;
        let renderer = ChatRenderer::new();
        let room = RoomId::from("Room-1");

        let pool = DatabasePool::new(&state.database_url).await.unwrap();
        sqlx::query("DROP TABLE messages")
            .execute(&pool.writer)
            .await
            .unwrap();

        assert!(load_log(&state, &room, Some("pain")).await.is_none());
        assert_eq!(print_new(&state, &renderer, &room, 7).await, 7);
        assert_eq!(show_room(&state, &renderer, &room).await, 0);
    }
}
