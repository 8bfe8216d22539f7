//! Interactive CLI chat experience for MedBridge.
//!
//! This module implements the conversation loop: the room log, typed and
//! audio intake, slash commands, summaries, and live refresh from room
//! events. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
