//! MedBridge CLI and REST API entry point.
//!
//! Binary name: `medbridge`
//!
//! Parses CLI arguments, initializes the database and services, then
//! dispatches to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;
mod view;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, CredentialCommand};
use medbridge_core::conversation::SessionContext;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,medbridge=debug",
        _ => "trace",
    };
    medbridge_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "medbridge", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.database.as_deref()).await?;
    let result = run(cli, state).await;

    medbridge_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat { room, role, lang } => {
            let ctx = SessionContext::new(
                cli::room::room_or_default(&state, room),
                role,
                state.language(lang.as_deref())?,
            );
            cli::chat::loop_runner::run_chat_loop(&state, ctx).await?;
        }

        Commands::Send {
            room,
            role,
            lang,
            audio,
            text,
        } => {
            let room = cli::room::room_or_default(&state, room);
            let language = state.language(lang.as_deref())?;
            cli::room::send_message(
                &state,
                room,
                role,
                language,
                audio.as_deref(),
                text,
                cli.json,
                cli.quiet,
            )
            .await?;
        }

        Commands::History { room, search } => {
            let room = cli::room::room_or_default(&state, room);
            cli::room::show_history(&state, room, search, cli.json).await?;
        }

        Commands::Rooms => {
            cli::room::list_rooms(&state, cli.json).await?;
        }

        Commands::Summary { room } => {
            let room = cli::room::room_or_default(&state, room);
            cli::room::show_summary(&state, room, cli.json).await?;
        }

        Commands::Credential { action } => match action {
            CredentialCommand::Set { value } => {
                cli::credential::set_credential(&state, value.as_deref(), cli.json).await?;
            }
            CredentialCommand::Status => {
                cli::credential::credential_status(&state, cli.json).await?;
            }
            CredentialCommand::Delete => {
                cli::credential::delete_credential(&state, cli.json).await?;
            }
        },

        Commands::Serve { port, host } => {
            if !state.controller.has_credential() {
                println!(
                    "  {} No API token found; POST requests will be rejected until HF_API_KEY is set.",
                    console::style("!").yellow().bold()
                );
            }

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} MedBridge API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
