//! Error taxonomy for the authentication manager.
//!
//! Three tiers, mirroring how this lineage's storage and credential layers
//! are split: [`AuthError`] is what every public operation returns; it
//! wraps the narrower [`ChainError`], [`StoreError`], and [`ConfigError`]
//! via `#[source]` so callers can match on a stable kind instead of parsing
//! message text.

use std::time::Duration;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Top-level error returned by every public manager operation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required parameter was empty or absent.
    #[error("required parameter '{0}' was not supplied")]
    NilParam(&'static str),

    /// The config failed validation at construction time.
    #[error("invalid auth config: {0}")]
    InvalidAuthConfig(#[from] ConfigError),

    /// Chain resolution or execution failed.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Credential store error surfaced unchanged (not found, I/O, permission).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Identity selection found no default and no TTY to prompt with.
    #[error("no default identity is configured")]
    NoDefaultIdentity,

    /// More than one identity is marked default; non-interactive callers must disambiguate.
    #[error("multiple default identities configured: {}", .0.join(", "))]
    MultipleDefaultIdentities(Vec<String>),

    /// An interactive prompt was required but stdin/stdout is not a TTY (or CI is set).
    #[error("identity selection requires an interactive terminal")]
    IdentitySelectionRequiresTTY,

    /// Config declares no identities at all.
    #[error("no identities are available")]
    NoIdentitiesAvailable,

    /// The user aborted an interactive prompt (Ctrl-C / Esc).
    #[error("selection aborted by user")]
    UserAborted,

    /// Logout failed for every participant in the chain.
    #[error("logout failed for '{identity}': {}", summarize(.errors))]
    LogoutFailed { identity: String, errors: Vec<String> },

    /// Logout succeeded for at least one participant but not all.
    #[error("logout partially succeeded for '{identity}': {}", summarize(.errors))]
    PartialLogout { identity: String, errors: Vec<String> },

    /// A participant had nothing to clean up; never treated as a failure by callers.
    #[error("logout not supported by '{0}'")]
    LogoutNotSupported(String),

    /// Deleting a keyring entry failed for a reason other than absence.
    #[error("keyring deletion failed for '{alias}': {source}")]
    KeyringDeletion {
        alias: String,
        #[source]
        source: StoreError,
    },

    /// A provider's own logout hook failed.
    #[error("provider logout failed for '{provider}': {source}")]
    ProviderLogout {
        provider: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An identity's own logout hook failed.
    #[error("identity logout failed for '{identity}': {source}")]
    IdentityLogout {
        identity: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `execute_integration` was called with an unknown name.
    #[error("integration '{0}' not found")]
    IntegrationNotFound(String),

    /// An explicitly invoked integration failed.
    #[error("integration '{name}' failed: {source}")]
    IntegrationFailed {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `execute_identity_integrations` found nothing linked to the identity.
    #[error("no integrations are linked to identity '{0}'")]
    NoLinkedIntegrations(String),

    /// The selector resolved to the `__DISABLED__` sentinel, or the caller otherwise
    /// chose to treat "no authentication configured" as a soft no-op.
    #[error("authentication is not configured")]
    AuthNotConfigured,

    /// Manager construction failed outright.
    #[error("failed to initialize auth manager: {0}")]
    FailedToInitializeAuthManager(String),

    /// A chain step or provider call was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

fn summarize(errors: &[String]) -> String {
    if errors.is_empty() {
        "no errors recorded".to_string()
    } else {
        errors.join("; ")
    }
}

/// Errors arising while resolving or executing an authentication chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Chain resolution detected a cycle.
    #[error("circular dependency detected while resolving '{identity}': {}", .path.join(" -> "))]
    CircularDependency { identity: String, path: Vec<String> },

    /// The requested identity name has no entry, even case-insensitively.
    #[error("identity '{0}' not found")]
    IdentityNotFound(String),

    /// An identity referenced internally (e.g. by an integration) isn't in config.
    #[error("identity '{0}' is not present in config")]
    IdentityNotInConfig(String),

    /// A provider name referenced by a chain isn't registered with the manager.
    #[error("provider '{0}' not found")]
    ProviderNotFound(String),

    /// A provider referenced by `via.provider` isn't present in config.
    #[error("provider '{0}' is not present in config")]
    ProviderNotInConfig(String),

    /// A chain step failed to authenticate.
    #[error("authentication failed at step {step_index} ('{step_name}'): {source}")]
    AuthenticationFailed {
        step_index: usize,
        step_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No cached credentials exist for the requested alias.
    #[error("no credentials found for '{0}'")]
    NoCredentialsFound(String),

    /// Cached credentials were found but are expired (or within the safety buffer).
    #[error("credentials for '{0}' are expired")]
    ExpiredCredentials(String),

    /// A query operation needed a built chain but none exists yet.
    #[error("authentication chain has not been built for '{0}'")]
    AuthenticationChainNotBuilt(String),

    /// An identity's `authenticate` call failed (distinct from a provider-level failure).
    #[error("identity '{0}' failed to authenticate")]
    IdentityAuthFailed(String),

    /// An identity produced no credentials where some were expected.
    #[error("identity '{0}' produced no credentials")]
    IdentityCredentialsNone(String),
}

/// Errors from the credential store layer (keyring, file, no-op backends).
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("credential '{alias}' not found in {backend}")]
    NotFound { alias: String, backend: &'static str },

    #[error("permission denied accessing '{alias}' in {backend}")]
    PermissionDenied { alias: String, backend: &'static str },

    #[error("I/O error for '{alias}' in {backend}: {message}")]
    Io {
        alias: String,
        backend: &'static str,
        message: String,
    },

    #[error("backend '{backend}' does not support this operation: {reason}")]
    Unsupported { backend: &'static str, reason: String },

    #[error("operation on '{alias}' in {backend} timed out after {duration:?}")]
    Timeout {
        alias: String,
        backend: &'static str,
        duration: Duration,
    },

    #[error("serialization error for '{alias}': {message}")]
    Serialization { alias: String, message: String },
}

impl StoreError {
    /// True for the one `StoreError` variant callers are expected to probe rather than treat
    /// as a hard failure (see the credential loader's keyring→storage fallback policy).
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors from validating and merging the config model.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("identity '{0}' is defined more than once")]
    DuplicateIdentity(String),

    #[error("provider '{0}' is defined more than once")]
    DuplicateProvider(String),

    #[error("integration '{0}' is defined more than once")]
    DuplicateIntegration(String),

    #[error(
        "identity '{identity}' has neither via.provider nor via.identity, and its kind is not a standalone principal"
    )]
    MissingVia { identity: String },

    #[error("integration '{integration}' references unknown identity '{identity}'")]
    DanglingIntegrationIdentity { integration: String, identity: String },

    #[error(
        "identity case map is inconsistent: key '{lower}' maps to '{display}', which does not lowercase back to the key"
    )]
    InconsistentCaseMap { lower: String, display: String },
}
