//! The identity contract: a principal derived via a provider or another identity.

use crate::chain::Chain;
use crate::context::AuthContext;
use crate::credential::Credentials;
use crate::names::ProviderName;
use crate::traits::provider::NotSupported;
use crate::traits::ManagerView;
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

type BoxError = Box<dyn Error + Send + Sync>;

/// Carried into [`Identity::post_authenticate`] so the hook can see the whole chain
/// it was just derived through, not only its own immediate input.
pub struct PostAuthenticateParams<'a> {
    pub chain: &'a Chain,
    pub root_provider: Option<&'a ProviderName>,
    pub credentials: &'a Credentials,
    pub manager: Arc<dyn ManagerView>,
}

/// A named principal, possibly derived through a chain of transformations. Concrete
/// identity kinds are registered outside this core; the manager only ever holds
/// `Arc<dyn Identity>`.
#[async_trait]
pub trait Identity: Send + Sync {
    /// Opaque kind string, used for diagnostics and log fields.
    fn kind(&self) -> &str;

    /// The name of the provider this identity's chain ultimately authenticates
    /// against, if any (standalone identities return `None`).
    fn provider_name(&self) -> Option<&ProviderName>;

    /// Derives this identity's own credentials from `input_credentials` (the prior
    /// chain step's output). `None` only for a standalone identity with no
    /// predecessor, which mints its own credentials from its own config.
    async fn authenticate(
        &self,
        ctx: &AuthContext,
        input_credentials: Option<&Credentials>,
    ) -> Result<Credentials, BoxError>;

    /// Removes any identity-managed state (a credentials file, a cached device
    /// profile). Default: not supported.
    async fn logout(&self, _ctx: &AuthContext) -> Result<(), BoxError> {
        Err(Box::new(NotSupported("identity logout")))
    }

    /// Loads this identity's credentials from its own managed storage (distinct
    /// from the shared keyring), used by the credential loader's fallback policy.
    /// Default: not supported.
    async fn load_credentials(&self, _ctx: &AuthContext) -> Result<Credentials, BoxError> {
        Err(Box::new(NotSupported("managed credential storage")))
    }

    /// Static environment variables this identity always contributes (e.g. a fixed
    /// region). Default: empty.
    fn environment(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Projects this identity's environment into `existing_env`, adding
    /// identity-scoped variables and removing host-supplied variables that would
    /// conflict with the managed credentials. Default: returns `existing_env`
    /// unchanged, merged with [`Identity::environment`].
    fn prepare_environment(
        &self,
        _ctx: &AuthContext,
        mut existing_env: HashMap<String, String>,
    ) -> HashMap<String, String> {
        existing_env.extend(self.environment());
        existing_env
    }

    /// Invoked once after the final chain step succeeds, before integration
    /// dispatch. Default: no-op.
    async fn post_authenticate(
        &self,
        _ctx: &AuthContext,
        _params: PostAuthenticateParams<'_>,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}
