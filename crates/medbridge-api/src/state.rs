//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! The controller is generic over the message repository; AppState pins it to
//! the SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use dashmap::DashMap;
use tokio::sync::Mutex;

use medbridge_core::conversation::{ConversationController, SessionContext};
use medbridge_core::event::RoomEventBus;
use medbridge_core::oracle::OracleSettings;
use medbridge_core::service::credential::{CREDENTIAL_KEY, CredentialService};
use medbridge_infra::config::{load_global_config, resolve_data_dir};
use medbridge_infra::keychain::KeychainProvider;
use medbridge_infra::llm::HostedTransportFactory;
use medbridge_infra::secret::chain::build_secret_chain;
use medbridge_infra::sqlite::message::SqliteMessageRepository;
use medbridge_infra::sqlite::pool::{DatabasePool, database_url_in};
use medbridge_types::config::GlobalConfig;
use medbridge_types::message::{RoomId, SpeakerRole};

/// Controller pinned to the SQLite message store.
pub type ConcreteController = ConversationController<SqliteMessageRepository>;

/// Upper bound on REST sessions kept in memory at once.
const MAX_REST_SESSIONS: usize = 256;

/// A REST room session and when a request last used it.
pub struct RestSession {
    context: Arc<Mutex<SessionContext>>,
    last_used: Instant,
}

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConcreteController>,
    pub credentials: Arc<CredentialService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub database_url: String,
    /// Per-room session state for REST callers (audio fingerprint, last role/language).
    ///
    /// Holds at most `session_capacity` rooms. A fingerprint can be a whole
    /// audio clip, so idle rooms are evicted least recently used first; an
    /// evicted room starts over with the configured defaults and no
    /// fingerprint.
    pub sessions: Arc<DashMap<RoomId, RestSession>>,
    session_capacity: usize,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    ///
    /// `database` overrides the default `{data_dir}/medbridge.db`; it may be a
    /// `sqlite:` URL or a plain file path. A credential found in the
    /// environment or keychain is attached immediately.
    pub async fn init(database: Option<&str>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let db_url = match database {
            Some(db) => database_url(db),
            None => database_url_in(&data_dir),
        };
        let credentials = CredentialService::new(build_secret_chain(Some(KeychainProvider::new())));

        Self::from_parts(config, data_dir, db_url, credentials).await
    }

    /// Wire services from already-resolved parts.
    pub async fn from_parts(
        config: GlobalConfig,
        data_dir: PathBuf,
        database_url: String,
        credentials: CredentialService,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&database_url)
            .await
            .with_context(|| format!("failed to open database {database_url}"))?;

        let controller = ConversationController::new(
            SqliteMessageRepository::new(db_pool),
            HostedTransportFactory::new(config.clone()),
            OracleSettings::from(&config),
            RoomEventBus::default(),
        );

        if let Some(credential) = credentials.resolve(CREDENTIAL_KEY).await {
            controller.attach_credential(&credential)?;
        }

        Ok(Self {
            controller: Arc::new(controller),
            credentials: Arc::new(credentials),
            config: Arc::new(config),
            data_dir,
            database_url,
            sessions: Arc::new(DashMap::new()),
            session_capacity: MAX_REST_SESSIONS,
        })
    }

    /// The REST session for `room`, created on first use with the configured defaults.
    pub fn session_for(&self, room: &RoomId) -> Arc<Mutex<SessionContext>> {
        if let Some(mut session) = self.sessions.get_mut(room) {
            session.last_used = Instant::now();
            return session.context.clone();
        }

        if self.sessions.len() >= self.session_capacity {
            self.evict_idle_session();
        }

        self.sessions
            .entry(room.clone())
            .or_insert_with(|| RestSession {
                context: Arc::new(Mutex::new(SessionContext::new(
                    room.clone(),
                    SpeakerRole::default(),
                    self.config.default_language.clone(),
                ))),
                last_used: Instant::now(),
            })
            .context
            .clone()
    }

    /// Drop the least recently used session no request is holding.
    fn evict_idle_session(&self) {
        let oldest = self
            .sessions
            .iter()
            .filter(|entry| Arc::strong_count(&entry.context) == 1)
            .min_by_key(|entry| entry.last_used)
            .map(|entry| entry.key().clone());

        if let Some(room) = oldest {
            let evicted = self
                .sessions
                .remove_if(&room, |_, session| Arc::strong_count(&session.context) == 1);
            if evicted.is_some() {
                tracing::debug!(%room, "evicted idle REST session");
            }
        }
    }

    /// Resolve a user-supplied language against the configured choices.
    pub fn language(&self, input: Option<&str>) -> anyhow::Result<String> {
        match input {
            None => Ok(self.config.default_language.clone()),
            Some(lang) => self
                .config
                .canonical_language(lang)
                .map(str::to_owned)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "unsupported language '{lang}' (choose one of: {})",
                        self.config.languages.join(", ")
                    )
                }),
        }
    }
}

/// Normalize a `--database` value into a SQLite connection URL.
fn database_url(value: &str) -> String {
    if value.starts_with("sqlite:") {
        value.to_string()
    } else {
        format!("sqlite://{value}?mode=rwc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn state_with_capacity(dir: &TempDir, capacity: usize) -> AppState {
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("state.db").display());
        let mut state = AppState::from_parts(
            GlobalConfig::default(),
            dir.path().to_path_buf(),
            db_url,
            CredentialService::new(Vec::new()),
        )
        .await
        .unwrap();
        state.session_capacity = capacity;
        state
    }

    #[tokio::test]
    async fn test_sessions_are_capped_by_evicting_least_recent() {
        let dir = TempDir::new().unwrap();
        let state = state_with_capacity(&dir, 2).await;
        let (a, b, c) = (RoomId::from("A"), RoomId::from("B"), RoomId::from("C"));

        let first = state.session_for(&a);
        first.lock().await.role = SpeakerRole::Patient;
        drop(first);
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.session_for(&b);
        tokio::time::sleep(Duration::from_millis(5)).await;
        // Touch A so B becomes the oldest.
        assert_eq!(state.session_for(&a).lock().await.role, SpeakerRole::Patient);

        state.session_for(&c);

        assert_eq!(state.sessions.len(), 2);
        assert!(state.sessions.contains_key(&a));
        assert!(!state.sessions.contains_key(&b));
        assert!(state.sessions.contains_key(&c));
    }

    #[tokio::test]
    async fn test_session_in_use_is_not_evicted() {
        let dir = TempDir::new().unwrap();
        let state = state_with_capacity(&dir, 1).await;
        let (a, b) = (RoomId::from("A"), RoomId::from("B"));

        let held = state.session_for(&a);
        state.session_for(&b);

        assert!(state.sessions.contains_key(&a));
        assert!(Arc::ptr_eq(&held, &state.session_for(&a)));
    }

    #[test]
    fn test_database_url_accepts_paths_and_urls() {
        assert_eq!(
            database_url("/tmp/ward.db"),
            "sqlite:///tmp/ward.db?mode=rwc"
        );
        assert_eq!(
            database_url("sqlite:///var/lib/ward.db"),
            "sqlite:///var/lib/ward.db"
        );
    }
}
