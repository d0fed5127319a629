//! Polymorphic contracts the manager depends on. Concrete provider/identity kinds
//! (AWS IAM Identity Center, GitHub OIDC, static keys, ...) live outside this core;
//! only the interfaces they honor are specified here.

mod identity;
mod provider;
mod store;

pub use identity::{Identity, PostAuthenticateParams};
pub use provider::Provider;
pub use store::CredentialStore;

use crate::chain::Chain;
use crate::names::{IdentityName, ProviderName};

/// A read-only view of the manager, handed to providers/identities that need to
/// inspect chain state without depending on the manager type directly (which would
/// create a cycle: manager depends on `Provider`/`Identity`, so they cannot depend
/// back on the concrete manager).
pub trait ManagerView: Send + Sync {
    fn chain_for(&self, identity: &IdentityName) -> Option<Chain>;
    fn list_identities(&self) -> Vec<IdentityName>;
    fn list_providers(&self) -> Vec<ProviderName>;
}
