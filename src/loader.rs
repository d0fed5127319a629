//! Keyring→storage fallback with session-vs-long-lived preference policy.

use crate::config::Realm;
use crate::context::AuthContext;
use crate::credential::{Credentials, CredentialBlob};
use crate::error::{AuthError, ChainError, StoreError};
use crate::traits::{CredentialStore, Identity};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{instrument, warn};

/// Loads cached credentials for a chain step, preferring identity-managed storage
/// over the shared keyring when both are present and the keyring copy isn't a
/// session token, and enforcing that session tokens are never written to the
/// keyring in the first place.
pub struct CredentialLoader {
    store: Arc<dyn CredentialStore>,
    realm: Realm,
    warned_no_realm_mismatch: AtomicBool,
}

impl CredentialLoader {
    pub fn new(store: Arc<dyn CredentialStore>, realm: Realm) -> Self {
        Self {
            store,
            realm,
            warned_no_realm_mismatch: AtomicBool::new(false),
        }
    }

    /// Loads credentials for `alias`. `identity` is `Some` when this alias names an
    /// identity with its own managed storage fallback (providers have none).
    #[instrument(skip(self, identity, ctx), fields(alias))]
    pub async fn load(
        &self,
        alias: &str,
        identity: Option<&dyn Identity>,
        ctx: &AuthContext,
    ) -> Result<Credentials, AuthError> {
        let keyring_result = self.store.retrieve(alias).await;

        match keyring_result {
            Ok(blob) if !blob.is_session_token() => {
                if let Some(identity) = identity {
                    if let Ok(managed) = identity.load_credentials(ctx).await {
                        let managed: Credentials = managed;
                        if !managed.is_expired() {
                            self.maybe_warn_realm_mismatch(alias);
                            return Ok(managed);
                        }
                    }
                }
                Ok(blob)
            }
            Ok(session_blob) => Ok(session_blob),
            Err(e) if e.is_not_found() => {
                if let Some(identity) = identity {
                    return identity.load_credentials(ctx).await.map_err(|_| {
                        AuthError::from(ChainError::NoCredentialsFound(alias.to_string()))
                    });
                }
                Err(StoreError::NotFound {
                    alias: alias.to_string(),
                    backend: self.store.kind(),
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persists `credentials` under `alias`, unless they're a session token (which
    /// must only ever live in identity-managed storage so a future regeneration
    /// doesn't clobber the long-lived credentials needed to mint it).
    #[instrument(skip(self, credentials), fields(alias))]
    pub async fn store(&self, alias: &str, credentials: &Credentials) -> Result<(), AuthError> {
        if credentials.is_session_token() {
            return Ok(());
        }
        self.store.store(alias, credentials).await.map_err(Into::into)
    }

    fn maybe_warn_realm_mismatch(&self, alias: &str) {
        if self.realm.name.is_none() {
            return;
        }
        if self
            .warned_no_realm_mismatch
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            warn!(
                alias,
                realm = ?self.realm.name,
                "credentials for this identity were found outside the configured realm's path"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoOpStore;

    #[tokio::test]
    async fn missing_with_no_identity_surfaces_not_found() {
        let loader = CredentialLoader::new(Arc::new(NoOpStore::default()), Realm::none());
        let err = loader.load("prod-admin", None, &AuthContext::new()).await;
        assert!(err.is_err());
    }
}
