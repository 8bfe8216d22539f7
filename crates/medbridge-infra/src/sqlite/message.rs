//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `medbridge-core` using sqlx with split
//! read/write pools. Rows are append-only and always read back scoped to a
//! single room.

use chrono::{DateTime, NaiveDateTime, Utc};
use medbridge_core::repository::message::MessageRepository;
use medbridge_types::error::RepositoryError;
use medbridge_types::message::{Message, NewMessage, RoomId, RoomSummary, SpeakerRole};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

/// Columns are nullable in the stored schema, so every field is optional here.
struct MessageRow {
    id: i64,
    room_id: Option<String>,
    role: Option<String>,
    original_text: Option<String>,
    translated_text: Option<String>,
    target_lang: Option<String>,
    has_audio: Option<bool>,
    audio_bytes: Option<Vec<u8>>,
    timestamp: Option<String>,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            role: row.try_get("role")?,
            original_text: row.try_get("original_text")?,
            translated_text: row.try_get("translated_text")?,
            target_lang: row.try_get("target_lang")?,
            has_audio: row.try_get("has_audio")?,
            audio_bytes: row.try_get("audio_bytes")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let role = self
            .role
            .as_deref()
            .ok_or_else(|| RepositoryError::Query(format!("message {} has no role", self.id)))?
            .parse::<SpeakerRole>()
            .map_err(RepositoryError::Query)?;

        let timestamp = self
            .timestamp
            .as_deref()
            .map(parse_timestamp)
            .transpose()?
            .unwrap_or_default();

        let has_audio = self.has_audio.unwrap_or(false);

        Ok(Message {
            id: self.id,
            room_id: RoomId::new(self.room_id.unwrap_or_default()),
            role,
            original_text: self.original_text.unwrap_or_default(),
            translated_text: self.translated_text.unwrap_or_default(),
            target_language: self.target_lang.unwrap_or_default(),
            has_audio,
            audio_bytes: if has_audio { self.audio_bytes } else { None },
            timestamp,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a stored timestamp.
///
/// `CURRENT_TIMESTAMP` writes `YYYY-MM-DD HH:MM:SS` in UTC; RFC 3339 is
/// accepted for rows written by other tools.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid timestamp '{s}': {e}")))
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

const SELECT_COLUMNS: &str = "id, room_id, role, original_text, translated_text, target_lang, \
     has_audio, audio_bytes, CAST(timestamp AS TEXT) AS timestamp";

// ---------------------------------------------------------------------------
// MessageRepository impl
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    #[tracing::instrument(skip(self, message), fields(room = %message.room_id, role = %message.role))]
    async fn append(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let audio_bytes = if message.has_audio {
            message.audio_bytes.as_deref()
        } else {
            None
        };

        let row = sqlx::query(
            r#"INSERT INTO messages
               (room_id, role, original_text, translated_text, target_lang, has_audio, audio_bytes)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING id, CAST(timestamp AS TEXT) AS timestamp"#,
        )
        .bind(message.room_id.as_str())
        .bind(message.role.to_string())
        .bind(&message.original_text)
        .bind(&message.translated_text)
        .bind(&message.target_language)
        .bind(message.has_audio)
        .bind(audio_bytes)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_error)?;

        let id: i64 = row.try_get("id").map_err(query_error)?;
        let timestamp: String = row.try_get("timestamp").map_err(query_error)?;

        Ok(Message {
            id,
            room_id: message.room_id.clone(),
            role: message.role,
            original_text: message.original_text.clone(),
            translated_text: message.translated_text.clone(),
            target_language: message.target_language.clone(),
            has_audio: message.has_audio,
            audio_bytes: audio_bytes.map(<[u8]>::to_vec),
            timestamp: parse_timestamp(&timestamp)?,
        })
    }

    async fn list_by_room(&self, room_id: &RoomId) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM messages WHERE room_id = ? ORDER BY timestamp ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(room_id.as_str())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(r.into_message()?);
        }
        Ok(messages)
    }

    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT room_id,
                      COUNT(*) AS message_count,
                      CAST(MAX(timestamp) AS TEXT) AS last_activity
               FROM messages
               WHERE room_id IS NOT NULL
               GROUP BY room_id
               ORDER BY MAX(timestamp) DESC, room_id ASC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut rooms = Vec::with_capacity(rows.len());
        for row in &rows {
            let room_id: String = row.try_get("room_id").map_err(query_error)?;
            let message_count: i64 = row.try_get("message_count").map_err(query_error)?;
            let last_activity: Option<String> =
                row.try_get("last_activity").map_err(query_error)?;
            rooms.push(RoomSummary {
                room_id: RoomId::new(room_id),
                message_count: message_count as u64,
                last_activity: last_activity.as_deref().map(parse_timestamp).transpose()?,
            });
        }
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::{DatabasePool, database_url_in};
    use medbridge_types::message::AUDIO_PLACEHOLDER;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url_in(dir.path());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_message(room: &str, role: SpeakerRole, text: &str) -> NewMessage {
        NewMessage {
            room_id: RoomId::from(room),
            role,
            original_text: text.to_string(),
            translated_text: format!("[es] {text}"),
            target_language: "Spanish".to_string(),
            has_audio: false,
            audio_bytes: None,
        }
    }

    #[tokio::test]
    async fn test_append_then_list_returns_row() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let new = NewMessage {
            room_id: RoomId::from("Room-1"),
            role: SpeakerRole::Doctor,
            original_text: "My stomach hurts".to_string(),
            translated_text: "Me duele el estómago".to_string(),
            target_language: "Spanish".to_string(),
            has_audio: false,
            audio_bytes: None,
        };

        let appended = repo.append(&new).await.unwrap();
        let rows = repo.list_by_room(&RoomId::from("Room-1")).await.unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row, &appended);
        assert!(row.id > 0);
        assert_eq!(row.room_id.as_str(), "Room-1");
        assert_eq!(row.role, SpeakerRole::Doctor);
        assert_eq!(row.original_text, "My stomach hurts");
        assert_eq!(row.translated_text, "Me duele el estómago");
        assert_eq!(row.target_language, "Spanish");
        assert!(!row.has_audio);
        assert!(row.audio_bytes.is_none());
        assert!((Utc::now() - row.timestamp).num_minutes().abs() < 5);
    }

    #[tokio::test]
    async fn test_rooms_are_isolated_and_ordered() {
        let repo = SqliteMessageRepository::new(test_pool().await);

        let first = repo
            .append(&make_message("Room-1", SpeakerRole::Doctor, "first"))
            .await
            .unwrap();
        let second = repo
            .append(&make_message("Room-1", SpeakerRole::Patient, "second"))
            .await
            .unwrap();
        repo.append(&make_message("Room-2", SpeakerRole::Doctor, "elsewhere"))
            .await
            .unwrap();

        let room1 = repo.list_by_room(&RoomId::from("Room-1")).await.unwrap();
        let room2 = repo.list_by_room(&RoomId::from("Room-2")).await.unwrap();

        assert_eq!(
            room1.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert!(first.id < second.id);
        assert_eq!(room2.len(), 1);
        assert_eq!(room2[0].original_text, "elsewhere");
    }

    #[tokio::test]
    async fn test_same_second_rows_order_by_id() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        for i in 0..5 {
            repo.append(&make_message("Burst", SpeakerRole::Doctor, &format!("m{i}")))
                .await
                .unwrap();
        }

        let rows = repo.list_by_room(&RoomId::from("Burst")).await.unwrap();
        let texts: Vec<&str> = rows.iter().map(|m| m.original_text.as_str()).collect();
        assert_eq!(texts, vec!["m0", "m1", "m2", "m3", "m4"]);
        assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_unknown_room_is_empty() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let rows = repo.list_by_room(&RoomId::from("nobody")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_audio_bytes_roundtrip() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let new = NewMessage {
            room_id: RoomId::from("Room-1"),
            role: SpeakerRole::Patient,
            original_text: AUDIO_PLACEHOLDER.to_string(),
            translated_text: AUDIO_PLACEHOLDER.to_string(),
            target_language: "English".to_string(),
            has_audio: true,
            audio_bytes: Some(vec![0x01, 0x02, 0xff]),
        };

        repo.append(&new).await.unwrap();
        let rows = repo.list_by_room(&RoomId::from("Room-1")).await.unwrap();

        assert!(rows[0].has_audio);
        assert_eq!(rows[0].audio_bytes, Some(vec![0x01, 0x02, 0xff]));
    }

    #[tokio::test]
    async fn test_list_rooms_counts_rows() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        repo.append(&make_message("A", SpeakerRole::Doctor, "1")).await.unwrap();
        repo.append(&make_message("A", SpeakerRole::Patient, "2")).await.unwrap();
        repo.append(&make_message("B", SpeakerRole::Doctor, "3")).await.unwrap();

        let rooms = repo.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 2);
        let a = rooms.iter().find(|r| r.room_id.as_str() == "A").unwrap();
        assert_eq!(a.message_count, 2);
        assert!(a.last_activity.is_some());
    }

    #[tokio::test]
    async fn test_opens_store_created_without_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url_in(dir.path());

        // A store written before migrations were tracked.
        {
            let legacy = sqlx::SqlitePool::connect(&url).await.unwrap();
            sqlx::query(
                r#"CREATE TABLE messages (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    room_id TEXT, role TEXT, original_text TEXT, translated_text TEXT,
                    target_lang TEXT, has_audio BOOLEAN, audio_bytes BLOB,
                    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP)"#,
            )
            .execute(&legacy)
            .await
            .unwrap();
            sqlx::query(
                "INSERT INTO messages (room_id, role, original_text, translated_text, target_lang, has_audio, audio_bytes) \
                 VALUES ('Room-1', 'Patient', 'Hola', 'Hello', 'English', 0, NULL)",
            )
            .execute(&legacy)
            .await
            .unwrap();
            legacy.close().await;
        }

        let repo = SqliteMessageRepository::new(DatabasePool::new(&url).await.unwrap());
        let rows = repo.list_by_room(&RoomId::from("Room-1")).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].role, SpeakerRole::Patient);
        assert_eq!(rows[0].translated_text, "Hello");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let sqlite = parse_timestamp("2024-03-01 12:30:45").unwrap();
        assert_eq!(sqlite.to_rfc3339(), "2024-03-01T12:30:45+00:00");
        assert!(parse_timestamp("2024-03-01T12:30:45Z").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
