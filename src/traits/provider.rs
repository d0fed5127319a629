//! The provider contract: a credential source with no predecessor of its own.

use crate::context::AuthContext;
use crate::credential::Credentials;
use crate::names::IdentityName;
use crate::traits::ManagerView;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

/// Returned by default trait-method implementations for capabilities a concrete
/// provider/identity kind does not support; never itself a failure (see
/// `AuthError::LogoutNotSupported`).
#[derive(Debug)]
pub struct NotSupported(pub &'static str);

impl fmt::Display for NotSupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not supported: {}", self.0)
    }
}

impl Error for NotSupported {}

type BoxError = Box<dyn Error + Send + Sync>;

/// A named credential source of a declared kind (e.g. `aws/iam-identity-center`,
/// `github/oidc`, `gcp/adc`). Concrete provider kinds are registered outside this
/// core; the manager only ever holds `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Opaque kind string, used for diagnostics and log fields.
    fn kind(&self) -> &str;

    /// Produces fresh credentials for this provider (e.g. an SSO device-code flow,
    /// an OIDC token exchange). Invoked by the chain executor at step 0.
    async fn authenticate(&self, ctx: &AuthContext) -> Result<Credentials, BoxError>;

    /// Removes this provider's own session state (a cached SSO session, a browser
    /// auth cookie jar). Default: not supported.
    async fn logout(&self, _ctx: &AuthContext) -> Result<(), BoxError> {
        Err(Box::new(NotSupported("provider logout")))
    }

    /// Called once before the chain executor begins, with a read-only view of the
    /// manager; lets a provider inspect the chain it is about to participate in and
    /// record preferences for its own `authenticate` call. Default: no-op.
    async fn pre_authenticate(&self, _manager: &dyn ManagerView) -> Result<(), BoxError> {
        Ok(())
    }

    /// Human-readable path to files this provider manages on disk, for display in
    /// verbose whoami diagnostics. Default: none.
    fn files_display_path(&self) -> Option<String> {
        None
    }

    /// For providers that can enumerate derivable identities (e.g. AWS SSO listing
    /// assignable accounts/roles). Default: not supported.
    async fn provision_identities(
        &self,
        _ctx: &AuthContext,
        _credentials: &Credentials,
    ) -> Result<Vec<IdentityName>, BoxError> {
        Err(Box::new(NotSupported("identity provisioning")))
    }
}
