//! Authentication manager core: resolves, executes, and caches credential chains
//! for named identities against pluggable providers.
//!
//! This crate owns chain resolution and execution, credential caching, logout,
//! integration dispatch, and identity selection. It does not know about any
//! concrete cloud provider SDK, configuration file format, or CLI surface — those
//! are supplied by callers through the [`Provider`], [`Identity`], and
//! [`IntegrationHandler`] trait objects registered on an [`AuthManagerBuilder`].

pub mod chain;
pub mod config;
pub mod context;
pub mod credential;
pub mod env_guard;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod integration;
pub mod loader;
pub mod logout;
pub mod manager;
pub mod names;
pub mod select;
pub mod store;
pub mod traits;
pub mod utils;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

/// Commonly used types, re-exported for callers assembling an [`AuthManager`].
pub mod prelude {
    pub use crate::chain::{Chain, ChainStep};
    pub use crate::config::{
        AuthConfig, AuthConfigBuilder, IdentityCaseMap, IdentityConfig, IntegrationConfig,
        KeyringBackend, ProviderConfig, Realm, RealmSource, Via,
    };
    pub use crate::context::{AuthContext, CancellationToken};
    pub use crate::credential::{CredentialBlob, Credentials, WhoamiInfo};
    pub use crate::env_guard::EnvGuard;
    pub use crate::error::{AuthError, ChainError, ConfigError, StoreError};
    pub use crate::hooks::{AuthFacade, ResolvedIdentity};
    pub use crate::integration::IntegrationHandler;
    pub use crate::manager::{AuthManager, AuthManagerBuilder};
    pub use crate::names::{IdentityName, IntegrationName, ProviderName};
    pub use crate::traits::{CredentialStore, Identity, ManagerView, Provider};
}
