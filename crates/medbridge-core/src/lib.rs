//! Business logic and port definitions for MedBridge.
//!
//! This crate defines the "ports" (repository and transport traits) that the
//! infrastructure layer implements, plus the oracles and the conversation
//! controller built on them. It depends only on `medbridge-types` -- never
//! on `medbridge-infra` or any database/IO crate.

pub mod conversation;
pub mod event;
pub mod llm;
pub mod oracle;
pub mod repository;
pub mod service;
