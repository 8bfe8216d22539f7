//! Credential lookup: the environment provider and the chain that orders it
//! ahead of the OS keychain ([`crate::keychain`]).

pub mod chain;
pub mod env;
