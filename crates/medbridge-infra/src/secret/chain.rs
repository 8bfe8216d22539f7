//! Secret chain builder -- wires concrete providers in priority order.
//!
//! The resulting chain is passed to `CredentialService` in `medbridge-core`
//! via the `DynSecretProvider` abstraction.
//!
//! Default chain order: `[EnvSecretProvider, KeychainProvider]`

use std::sync::Arc;

use medbridge_core::repository::secret::DynSecretProvider;

use crate::keychain::KeychainProvider;
use crate::secret::env::EnvSecretProvider;

/// Build the credential resolution chain (first match wins).
///
/// `keychain` may be `None` on headless hosts without a secret service;
/// credentials then come from the environment or direct entry only.
pub fn build_secret_chain(keychain: Option<KeychainProvider>) -> Vec<DynSecretProvider> {
    let mut chain: Vec<DynSecretProvider> = vec![Arc::new(EnvSecretProvider::new())];

    if let Some(kc) = keychain {
        chain.push(Arc::new(kc));
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order() {
        let chain = build_secret_chain(Some(KeychainProvider::with_service("medbridge-test")));
        let names: Vec<&str> = chain.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["environment", "keychain"]);
    }

    #[test]
    fn test_chain_without_keychain() {
        let chain = build_secret_chain(None);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name(), "environment");
    }
}
