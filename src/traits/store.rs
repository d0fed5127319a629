//! Uniform persistent cache for credential blobs keyed by an opaque alias.

use crate::credential::Credentials;
use crate::error::StoreError;
use async_trait::async_trait;

/// A credential store backend. Implementations must be interchangeable: no
/// backend-specific behavior leaks past this trait into the manager.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists `credentials` under `alias`, overwriting any prior value.
    async fn store(&self, alias: &str, credentials: &Credentials) -> Result<(), StoreError>;

    /// Retrieves the credentials stored under `alias`.
    async fn retrieve(&self, alias: &str) -> Result<Credentials, StoreError>;

    /// Deletes the entry for `alias`. Deleting an absent alias is success, not an error.
    async fn delete(&self, alias: &str) -> Result<(), StoreError>;

    /// Backend identifier, for diagnostics and log fields.
    fn kind(&self) -> &'static str;
}
