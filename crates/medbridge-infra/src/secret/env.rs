//! Environment variable secret provider.
//!
//! A read-only secret provider that checks environment variables.
//! This is the highest-priority provider in the resolution chain:
//! an exported `HF_API_KEY` overrides the keychain.

use medbridge_core::repository::secret::SecretProvider;
use medbridge_types::error::RepositoryError;

/// Environment variable secret provider.
///
/// Read-only: `set()` and `delete()` return errors because environment
/// variables cannot be persistently modified.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "environment"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        match std::env::var(key) {
            Ok(val) if val.trim().is_empty() => Ok(None),
            Ok(val) => Ok(Some(val)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            // Secrets must be valid strings; treat as absent.
            Err(std::env::VarError::NotUnicode(_)) => Ok(None),
        }
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::ReadOnly(self.name().to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::ReadOnly(self.name().to_string()))
    }
}
