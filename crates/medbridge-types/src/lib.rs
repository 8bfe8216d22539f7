//! Shared domain types for MedBridge.
//!
//! This crate contains the domain types used across the MedBridge workspace:
//! conversation messages, rooms, speaker roles, LLM request/response shapes,
//! room events, global configuration, and their associated error types.
//!
//! No I/O lives here.

pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod message;
