//! Per-identity, per-provider, and whole-fleet credential removal.

use crate::chain::{self, ChainStep};
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::names::{IdentityName, ProviderName};
use crate::traits::{CredentialStore, Identity, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct LogoutCoordinator {
    config: Arc<AuthConfig>,
    store: Arc<dyn CredentialStore>,
    providers: HashMap<ProviderName, Arc<dyn Provider>>,
    identities: HashMap<IdentityName, Arc<dyn Identity>>,
}

impl LogoutCoordinator {
    pub fn new(
        config: Arc<AuthConfig>,
        store: Arc<dyn CredentialStore>,
        providers: HashMap<ProviderName, Arc<dyn Provider>>,
        identities: HashMap<IdentityName, Arc<dyn Identity>>,
    ) -> Self {
        Self {
            config,
            store,
            providers,
            identities,
        }
    }

    /// Logs out a single identity: deletes every chain member's keyring entry, runs
    /// the root provider's logout hook (unless suppressed), and the identity's own
    /// logout hook. `LogoutNotSupported` from a participant counts as success.
    #[instrument(skip(self, ctx), fields(identity = %identity))]
    pub async fn logout(&self, identity: &IdentityName, ctx: &AuthContext) -> Result<(), AuthError> {
        let chain = chain::build_chain(&self.config, identity)?;
        let mut errors = Vec::new();
        let mut any_success = false;
        let mut any_attempt = false;

        for step in chain.steps() {
            any_attempt = true;
            match self.store.delete(step.name()).await {
                Ok(()) => any_success = true,
                Err(e) => errors.push(format!("deleting '{}': {e}", step.name())),
            }
        }

        if !ctx.skip_provider_logout {
            if let Some(provider_name) = chain.provider() {
                any_attempt = true;
                if let Some(provider) = self.providers.get(provider_name) {
                    match provider.logout(ctx).await {
                        Ok(()) => any_success = true,
                        Err(e) if is_not_supported(&e) => any_success = true,
                        Err(e) => errors.push(format!("provider '{provider_name}' logout: {e}")),
                    }
                }
            }
        }

        if let ChainStep::Identity(_) = chain.steps().last().expect("chain never empty") {
            any_attempt = true;
            if let Some(impl_) = self.identities.get(identity) {
                match impl_.logout(ctx).await {
                    Ok(()) => any_success = true,
                    Err(e) if is_not_supported(&e) => any_success = true,
                    Err(e) => errors.push(format!("identity '{identity}' logout: {e}")),
                }
            }
        }

        if !any_attempt || errors.is_empty() {
            info!(identity = %identity, "logout completed");
            return Ok(());
        }
        if any_success {
            return Err(AuthError::PartialLogout {
                identity: identity.to_string(),
                errors,
            });
        }
        Err(AuthError::LogoutFailed {
            identity: identity.to_string(),
            errors,
        })
    }

    /// Logs out every identity whose chain resolves through `provider`, each with
    /// provider-level logout suppressed, then deletes the provider's own keyring
    /// entry and runs its logout hook exactly once.
    #[instrument(skip(self, ctx), fields(provider = %provider))]
    pub async fn logout_provider(
        &self,
        provider: &ProviderName,
        ctx: &AuthContext,
    ) -> Result<(), AuthError> {
        let member_ctx = ctx.clone().with_skip_provider_logout(true);
        let mut errors = Vec::new();
        let mut any_success = false;

        for name in self.identities_via(provider) {
            match self.logout(&name, &member_ctx).await {
                Ok(()) => any_success = true,
                Err(AuthError::PartialLogout { errors: e, .. }) => {
                    any_success = true;
                    errors.extend(e);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        match self.store.delete(provider.as_str()).await {
            Ok(()) => any_success = true,
            Err(e) => errors.push(format!("deleting provider '{provider}': {e}")),
        }
        if let Some(p) = self.providers.get(provider) {
            match p.logout(ctx).await {
                Ok(()) => any_success = true,
                Err(e) if is_not_supported(&e) => any_success = true,
                Err(e) => errors.push(format!("provider '{provider}' logout: {e}")),
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        if any_success {
            return Err(AuthError::PartialLogout {
                identity: provider.to_string(),
                errors,
            });
        }
        Err(AuthError::LogoutFailed {
            identity: provider.to_string(),
            errors,
        })
    }

    /// Logs out every configured identity, aggregating (but not aborting on) failures.
    #[instrument(skip(self, ctx))]
    pub async fn logout_all(&self, ctx: &AuthContext) -> Result<(), AuthError> {
        let mut errors = Vec::new();
        for name in self.config.identities.keys() {
            if let Err(e) = self.logout(name, ctx).await {
                warn!(identity = %name, error = %e, "logout failed during logout-all");
                errors.push(e.to_string());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::LogoutFailed {
                identity: "<all>".to_string(),
                errors,
            })
        }
    }

    fn identities_via(&self, provider: &ProviderName) -> Vec<IdentityName> {
        self.config
            .identities
            .keys()
            .filter(|name| {
                chain::build_chain(&self.config, name)
                    .map(|c| c.provider() == Some(provider))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

fn is_not_supported(e: &(dyn std::error::Error + Send + Sync)) -> bool {
    e.to_string().contains("not supported")
}
