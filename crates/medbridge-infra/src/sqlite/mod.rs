//! SQLite message store: connection pools and the `MessageRepository` adapter.

pub mod message;
pub mod pool;
