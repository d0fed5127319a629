//! A store that caches nothing, for container/mounted-credentials scenarios where
//! the manager should never attempt to persist a credential blob.

use crate::credential::Credentials;
use crate::error::StoreError;
use crate::traits::CredentialStore;
use async_trait::async_trait;

const BACKEND: &str = "noop";

#[derive(Default)]
pub struct NoOpStore;

#[async_trait]
impl CredentialStore for NoOpStore {
    async fn store(&self, _alias: &str, _credentials: &Credentials) -> Result<(), StoreError> {
        Ok(())
    }

    async fn retrieve(&self, alias: &str) -> Result<Credentials, StoreError> {
        Err(StoreError::NotFound {
            alias: alias.to_string(),
            backend: BACKEND,
        })
    }

    async fn delete(&self, _alias: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        BACKEND
    }
}
