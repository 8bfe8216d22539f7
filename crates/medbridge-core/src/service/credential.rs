//! Credential resolution service.
//!
//! CredentialService resolves the text-generation credential through a chain
//! of providers in priority order (environment > OS keychain). Direct user
//! entry is the last resort and happens in the presentation layer, which
//! wraps the typed value with [`Credential::direct`].
//!
//! The rest of the core only ever observes whether a credential is present.

use std::fmt;

use medbridge_types::error::RepositoryError;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::repository::secret::DynSecretProvider;

/// Key name under which the text-generation credential is stored.
pub const CREDENTIAL_KEY: &str = "HF_API_KEY";

/// Where a resolved credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A named provider from the resolution chain ("environment", "keychain").
    Provider(String),
    /// Typed by the user for this session only.
    DirectEntry,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Provider(name) => f.write_str(name),
            CredentialSource::DirectEntry => f.write_str("direct entry"),
        }
    }
}

/// A resolved, non-empty credential.
///
/// The value is wrapped in a `SecretString` so it never shows up in logs or
/// `Debug` output.
#[derive(Debug, Clone)]
pub struct Credential {
    value: SecretString,
    source: CredentialSource,
}

impl Credential {
    fn new(value: String, source: CredentialSource) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            value: SecretString::from(trimmed.to_string()),
            source,
        })
    }

    /// Wrap a value typed by the user. Returns `None` for blank input.
    pub fn direct(value: impl Into<String>) -> Option<Self> {
        Self::new(value.into(), CredentialSource::DirectEntry)
    }

    pub fn secret(&self) -> &SecretString {
        &self.value
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Masked form for display, e.g. `****wxyz`.
    pub fn masked(&self) -> String {
        CredentialService::mask_secret(self.value.expose_secret())
    }
}

/// Presence of the credential in one provider, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatus {
    pub provider: String,
    pub present: bool,
    /// Set when the provider could not be queried (e.g. no keychain daemon).
    pub error: Option<String>,
}

/// Service for resolving and managing the credential across backends.
///
/// Providers are ordered by precedence (first match wins).
/// Default chain: `[EnvSecretProvider, KeychainProvider]`.
pub struct CredentialService {
    providers: Vec<DynSecretProvider>,
}

impl CredentialService {
    /// Create a new service with the given provider chain.
    ///
    /// Providers should be ordered by precedence (highest priority first).
    pub fn new(providers: Vec<DynSecretProvider>) -> Self {
        Self { providers }
    }

    /// Resolve a credential by iterating through providers in priority order.
    ///
    /// Blank values count as absent. A provider that fails to answer is
    /// skipped with a warning so an unavailable keychain never hides an
    /// environment credential further down the chain.
    pub async fn resolve(&self, key: &str) -> Option<Credential> {
        for provider in &self.providers {
            match provider.get_boxed(key).await {
                Ok(Some(value)) => {
                    if let Some(credential) =
                        Credential::new(value, CredentialSource::Provider(provider.name().to_string()))
                    {
                        debug!(key, source = provider.name(), "credential resolved");
                        return Some(credential);
                    }
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(key, provider = provider.name(), error = %e, "secret provider unavailable");
                }
            }
        }
        None
    }

    /// Store a credential in the first writable provider.
    ///
    /// Read-only providers (e.g., env vars) return an error, which is skipped.
    /// Returns the name of the provider that accepted the write.
    pub async fn store(&self, key: &str, value: &str) -> Result<String, RepositoryError> {
        for provider in &self.providers {
            match provider.set_boxed(key, value).await {
                Ok(()) => return Ok(provider.name().to_string()),
                Err(e) => {
                    debug!(provider = provider.name(), error = %e, "provider rejected write");
                    continue;
                }
            }
        }

        Err(RepositoryError::ReadOnly("every credential provider".to_string()))
    }

    /// Delete a credential from all providers that have it.
    pub async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let mut deleted = false;

        for provider in &self.providers {
            match provider.delete_boxed(key).await {
                Ok(()) => deleted = true,
                Err(RepositoryError::NotFound) => continue,
                Err(_) => continue,
            }
        }

        if !deleted {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Report, for every provider, whether it holds the credential.
    pub async fn status(&self, key: &str) -> Vec<ProviderStatus> {
        let mut statuses = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let status = match provider.get_boxed(key).await {
                Ok(value) => ProviderStatus {
                    provider: provider.name().to_string(),
                    present: value.is_some_and(|v| !v.trim().is_empty()),
                    error: None,
                },
                Err(e) => ProviderStatus {
                    provider: provider.name().to_string(),
                    present: false,
                    error: Some(e.to_string()),
                },
            };
            statuses.push(status);
        }
        statuses
    }

    /// Mask a secret value, showing only the last 4 characters.
    ///
    /// - "hf_abcdefghijklmnop" -> "****mnop"
    /// - "abc" -> "****" (too short to show any chars)
    pub fn mask_secret(value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= 4 {
            "****".to_string()
        } else {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("****{tail}")
        }
    }
}
