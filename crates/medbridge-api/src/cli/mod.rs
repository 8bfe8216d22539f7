//! CLI command definitions for the `medbridge` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod credential;
pub mod room;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use medbridge_types::message::SpeakerRole;

/// Doctor/Patient translation log with shared rooms.
#[derive(Parser)]
#[command(name = "medbridge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Database file or sqlite: URL (default: ~/.medbridge/medbridge.db).
    #[arg(long, global = true, env = "MEDBRIDGE_DATABASE")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive translation session in a room.
    Chat {
        /// Room to join (default from config.toml).
        #[arg(long, env = "MEDBRIDGE_ROOM")]
        room: Option<String>,

        /// Who is speaking: doctor or patient.
        #[arg(long, default_value = "doctor")]
        role: SpeakerRole,

        /// Target language for translations.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Submit a single message (text, audio clip, or both).
    Send {
        #[arg(long, env = "MEDBRIDGE_ROOM")]
        room: Option<String>,

        #[arg(long, default_value = "doctor")]
        role: SpeakerRole,

        #[arg(long)]
        lang: Option<String>,

        /// Recorded audio clip to attach.
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Typed text.
        text: Option<String>,
    },

    /// Show a room's conversation log.
    History {
        #[arg(long, env = "MEDBRIDGE_ROOM")]
        room: Option<String>,

        /// Only show turns containing this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
    },

    /// List rooms with stored history.
    #[command(alias = "ls")]
    Rooms,

    /// Generate a structured clinical summary of a room.
    Summary {
        #[arg(long, env = "MEDBRIDGE_ROOM")]
        room: Option<String>,
    },

    /// Manage the API credential (HF_API_KEY).
    Credential {
        #[command(subcommand)]
        action: CredentialCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CredentialCommand {
    /// Store the credential in the OS keychain.
    Set {
        /// Value to store (prompted with hidden input when omitted).
        #[arg(long)]
        value: Option<String>,
    },

    /// Show which providers hold a credential.
    Status,

    /// Remove the credential from the OS keychain.
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send_with_audio() {
        let cli = Cli::try_parse_from([
            "medbridge",
            "send",
            "--room",
            "Room-2",
            "--role",
            "patient",
            "--lang",
            "Hindi",
            "--audio",
            "clip.wav",
            "My stomach is upset",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                room,
                role,
                lang,
                audio,
                text,
            } => {
                assert_eq!(room.as_deref(), Some("Room-2"));
                assert_eq!(role, SpeakerRole::Patient);
                assert_eq!(lang.as_deref(), Some("Hindi"));
                assert_eq!(audio, Some(PathBuf::from("clip.wav")));
                assert_eq!(text.as_deref(), Some("My stomach is upset"));
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let result = Cli::try_parse_from(["medbridge", "chat", "--role", "nurse"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["medbridge", "rooms", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
