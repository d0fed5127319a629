//! A thin bridge in front of [`AuthManager`] for callers outside this core (command
//! handlers) that only need one or two call sites instead of poking at manager
//! internals directly. Owns none of the manager's state and is safe to construct
//! freely — it's a cheap `Arc` clone.

use crate::context::AuthContext;
use crate::error::AuthError;
use crate::manager::AuthManager;
use crate::names::IdentityName;
use std::sync::Arc;

const SELECT_SENTINEL: &str = "__SELECT__";
const DISABLED_SENTINEL: &str = "__DISABLED__";

/// The outcome of resolving an identity selector argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// The caller asked for no authentication (`__DISABLED__`); the caller should
    /// defer to ambient credentials and skip authentication entirely.
    Disabled,
    Identity(IdentityName),
}

/// A narrow facade over [`AuthManager`] mirroring the CLI-consumed selector contract.
#[derive(Clone)]
pub struct AuthFacade {
    manager: Arc<AuthManager>,
}

impl AuthFacade {
    pub fn new(manager: Arc<AuthManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<AuthManager> {
        &self.manager
    }
}

/// Interprets an identity selector argument: a literal name; `__SELECT__` meaning
/// "interactively select"; `__DISABLED__` meaning "no authentication"; empty meaning
/// "auto-detect default". `ctx` gates whether auto-detection or `__SELECT__` may fall
/// back to an interactive prompt.
pub fn resolve_selector(
    selector: &str,
    manager: &AuthManager,
    force_select: bool,
    ctx: &AuthContext,
) -> Result<ResolvedIdentity, AuthError> {
    match selector {
        "" => Ok(ResolvedIdentity::Identity(
            manager.get_default_identity(force_select, ctx)?,
        )),
        SELECT_SENTINEL => Ok(ResolvedIdentity::Identity(
            manager.get_default_identity(true, ctx)?,
        )),
        DISABLED_SENTINEL => Ok(ResolvedIdentity::Disabled),
        literal => manager
            .resolve_identity_name(literal)
            .map(ResolvedIdentity::Identity)
            .ok_or_else(|| {
                AuthError::from(crate::error::ChainError::IdentityNotFound(literal.to_string()))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, IdentityConfig, KeyringBackend, Via};

    fn manager() -> Arc<AuthManager> {
        let config = AuthConfig::builder()
            .add_identity(
                IdentityName::new("prod").unwrap(),
                IdentityConfig {
                    kind: "static".to_string(),
                    default: true,
                    alias: None,
                    via: Via::None,
                    principal: None,
                    credentials: None,
                },
            )
            .unwrap()
            .keyring_backend(KeyringBackend::NoOp)
            .build()
            .unwrap();
        AuthManager::builder(config).build().unwrap()
    }

    fn manager_with_mixed_case_identity() -> Arc<AuthManager> {
        let config = AuthConfig::builder()
            .add_identity(
                IdentityName::new("Prod-Admin").unwrap(),
                IdentityConfig {
                    kind: "static".to_string(),
                    default: false,
                    alias: None,
                    via: Via::None,
                    principal: None,
                    credentials: None,
                },
            )
            .unwrap()
            .keyring_backend(KeyringBackend::NoOp)
            .build()
            .unwrap();
        AuthManager::builder(config).build().unwrap()
    }

    #[test]
    fn disabled_sentinel_resolves_to_disabled() {
        let m = manager();
        let resolved = resolve_selector(DISABLED_SENTINEL, &m, false, &AuthContext::new()).unwrap();
        assert_eq!(resolved, ResolvedIdentity::Disabled);
    }

    #[test]
    fn empty_selector_resolves_default() {
        let m = manager();
        let resolved = resolve_selector("", &m, false, &AuthContext::new()).unwrap();
        assert_eq!(resolved, ResolvedIdentity::Identity(IdentityName::new("prod").unwrap()));
    }

    #[test]
    fn literal_selector_rejects_unknown_identity() {
        let m = manager();
        let err = resolve_selector("ghost", &m, false, &AuthContext::new()).unwrap_err();
        assert!(matches!(err, AuthError::Chain(_)));
    }

    #[test]
    fn literal_selector_resolves_known_identity() {
        let m = manager();
        let resolved = resolve_selector("prod", &m, false, &AuthContext::new()).unwrap();
        assert_eq!(resolved, ResolvedIdentity::Identity(IdentityName::new("prod").unwrap()));
    }

    #[test]
    fn literal_selector_resolves_case_insensitively() {
        let m = manager_with_mixed_case_identity();
        let resolved = resolve_selector("prod-admin", &m, false, &AuthContext::new()).unwrap();
        assert_eq!(
            resolved,
            ResolvedIdentity::Identity(IdentityName::new("Prod-Admin").unwrap())
        );
    }

    #[test]
    fn empty_selector_with_prompts_disallowed_surfaces_typed_error() {
        let m = manager_with_mixed_case_identity();
        let err = resolve_selector("", &m, false, &AuthContext::non_interactive()).unwrap_err();
        assert!(matches!(err, AuthError::NoDefaultIdentity));
    }
}
