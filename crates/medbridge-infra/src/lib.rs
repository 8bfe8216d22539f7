//! Infrastructure layer for MedBridge.
//!
//! Contains implementations of the ports defined in `medbridge-core`:
//! SQLite message storage, credential providers (environment and OS
//! keychain), the hosted text-generation transports, and config loading.

pub mod config;
pub mod keychain;
pub mod llm;
pub mod secret;
pub mod sqlite;
