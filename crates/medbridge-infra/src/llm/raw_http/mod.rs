//! Raw HTTP chat-completions transport.
//!
//! Fallback transport of the chain: a bare `reqwest` POST to the
//! per-model inference endpoint, used when the client-library transport
//! fails.

pub mod client;
pub mod types;

pub use client::RawHttpProvider;
