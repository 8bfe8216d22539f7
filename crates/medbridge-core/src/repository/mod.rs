//! Storage ports.
//!
//! `MessageRepository` is the conversation log; `SecretProvider` is one link
//! of the credential chain. Adapters live in medbridge-infra.

pub mod message;
pub mod secret;
