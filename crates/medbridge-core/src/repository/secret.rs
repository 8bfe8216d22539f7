//! Secret provider trait definition.
//!
//! `SecretProvider` uses RPITIT, so it cannot be a trait object. The
//! object-safe `SecretProviderDyn` mirror (blanket-implemented for every
//! provider) lets the credential service hold a heterogeneous chain.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use medbridge_types::error::RepositoryError;

/// Trait for credential storage backends (environment, OS keychain).
pub trait SecretProvider: Send + Sync {
    /// Short name used when reporting where a credential came from.
    fn name(&self) -> &str;

    /// Retrieve a secret value by key.
    /// Returns None if the secret does not exist in this provider.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Store a secret value. Read-only providers return an error.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a secret. Returns `NotFound` if this provider does not hold it.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`SecretProvider`] with boxed futures.
pub trait SecretProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, RepositoryError>>;

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), RepositoryError>>;

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), RepositoryError>>;
}

impl<T: SecretProvider> SecretProviderDyn for T {
    fn name(&self) -> &str {
        SecretProvider::name(self)
    }

    fn get_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, RepositoryError>> {
        Box::pin(self.get(key))
    }

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.set(key, value))
    }

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), RepositoryError>> {
        Box::pin(self.delete(key))
    }
}

/// Shared, type-erased secret provider.
pub type DynSecretProvider = Arc<dyn SecretProviderDyn>;
