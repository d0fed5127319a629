//! OS keychain / Secret Service / Windows Credential Manager backend.

use crate::credential::Credentials;
use crate::error::StoreError;
use crate::traits::CredentialStore;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

const BACKEND: &str = "keyring";

/// Stores credentials in the platform keyring, namespaced under a fixed service name
/// so entries from this tool don't collide with unrelated keychain items.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, alias: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, alias).map_err(|e| StoreError::Io {
            alias: alias.to_string(),
            backend: BACKEND,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    #[instrument(skip(self, credentials), fields(alias, backend = BACKEND))]
    async fn store(&self, alias: &str, credentials: &Credentials) -> Result<(), StoreError> {
        let payload = serde_json::to_string(credentials).map_err(|e| StoreError::Serialization {
            alias: alias.to_string(),
            message: e.to_string(),
        })?;
        let entry = self.entry(alias)?;
        let alias = alias.to_string();
        tokio::task::spawn_blocking(move || entry.set_password(&payload))
            .await
            .map_err(|e| StoreError::Io {
                alias: alias.clone(),
                backend: BACKEND,
                message: e.to_string(),
            })?
            .map_err(|e| to_store_error(&alias, e))?;
        debug!("stored credentials in keyring");
        Ok(())
    }

    #[instrument(skip(self), fields(alias, backend = BACKEND))]
    async fn retrieve(&self, alias: &str) -> Result<Credentials, StoreError> {
        let entry = self.entry(alias)?;
        let alias_owned = alias.to_string();
        let payload = tokio::task::spawn_blocking(move || entry.get_password())
            .await
            .map_err(|e| StoreError::Io {
                alias: alias_owned.clone(),
                backend: BACKEND,
                message: e.to_string(),
            })?
            .map_err(|e| to_store_error(&alias_owned, e))?;

        serde_json::from_str(&payload).map_err(|e| StoreError::Serialization {
            alias: alias.to_string(),
            message: e.to_string(),
        })
    }

    #[instrument(skip(self), fields(alias, backend = BACKEND))]
    async fn delete(&self, alias: &str) -> Result<(), StoreError> {
        let entry = self.entry(alias)?;
        let alias_owned = alias.to_string();
        match tokio::task::spawn_blocking(move || entry.delete_credential())
            .await
            .map_err(|e| StoreError::Io {
                alias: alias_owned.clone(),
                backend: BACKEND,
                message: e.to_string(),
            })?
        {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                warn!(alias = %alias, "keyring entry already absent, treating delete as success");
                Ok(())
            }
            Err(e) => Err(to_store_error(alias, e)),
        }
    }

    fn kind(&self) -> &'static str {
        BACKEND
    }
}

fn to_store_error(alias: &str, err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoEntry => StoreError::NotFound {
            alias: alias.to_string(),
            backend: BACKEND,
        },
        keyring::Error::NoStorageAccess(_) => StoreError::PermissionDenied {
            alias: alias.to_string(),
            backend: BACKEND,
        },
        other => StoreError::Io {
            alias: alias.to_string(),
            backend: BACKEND,
            message: other.to_string(),
        },
    }
}
