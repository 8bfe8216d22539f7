use thiserror::Error;

/// Failures of the message store and the credential backends.
///
/// Ports in medbridge-core return this; adapters in medbridge-infra map their
/// driver errors into it.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backend could not be reached (pool closed, I/O, no keychain daemon).
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    /// The backend does not accept writes, e.g. the process environment.
    #[error("{0} is read-only")]
    ReadOnly(String),
}
