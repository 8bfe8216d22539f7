//! OS keychain adapter for credential storage.
//!
//! Uses the `keyring` crate to store/retrieve secrets via:
//! - macOS Keychain
//! - Linux Secret Service (GNOME Keyring, KDE Wallet)
//! - Windows Credential Manager

use medbridge_core::repository::secret::SecretProvider;
use medbridge_types::error::RepositoryError;

/// OS keychain secret provider using the `keyring` crate.
///
/// Entries are stored under a single service name with the secret key
/// (e.g. "HF_API_KEY") as the account.
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new KeychainProvider with the default service name "medbridge".
    pub fn new() -> Self {
        Self {
            service_name: "medbridge".to_string(),
        }
    }

    /// Create a KeychainProvider with a custom service name (useful for testing).
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, RepositoryError> {
        keyring::Entry::new(&self.service_name, key)
            .map_err(|e| RepositoryError::Query(format!("keychain entry error: {e}")))
    }
}

impl Default for KeychainProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for KeychainProvider {
    fn name(&self) -> &str {
        "keychain"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(RepositoryError::Query(format!("keychain get error: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let entry = self.entry(key)?;

        entry
            .set_password(value)
            .map_err(|e| RepositoryError::Query(format!("keychain set error: {e}")))
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let entry = self.entry(key)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::Query(format!(
                "keychain delete error: {e}"
            ))),
        }
    }
}
