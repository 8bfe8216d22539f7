//! Message repository trait definition.
//!
//! Defines the append-only storage interface for conversation turns. The
//! infrastructure layer (medbridge-infra) implements this trait with SQLite
//! persistence.

use medbridge_types::error::RepositoryError;
use medbridge_types::message::{Message, NewMessage, RoomId, RoomSummary};

/// Repository trait for room-scoped conversation history.
///
/// Rows are written once and never updated or deleted. Every read is scoped
/// by room; no operation returns rows from more than one room.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageRepository: Send + Sync {
    /// Persist one row atomically and return it with the store-assigned
    /// `id` and `timestamp`.
    fn append(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// All rows of a room, ordered by timestamp ASC then id ASC.
    ///
    /// An unknown room yields an empty vector.
    fn list_by_room(
        &self,
        room_id: &RoomId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Every room with at least one row, most recently active first.
    fn list_rooms(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<RoomSummary>, RepositoryError>> + Send;
}
