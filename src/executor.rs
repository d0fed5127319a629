//! Bottom-up cache probe plus top-down re-authentication through a chain.

use crate::chain::{self, Chain, ChainStep};
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::credential::{Credentials, CredentialBlob, WhoamiInfo};
use crate::error::{AuthError, ChainError};
use crate::integration::IntegrationDispatcher;
use crate::loader::CredentialLoader;
use crate::names::{IdentityName, ProviderName};
use crate::traits::identity::PostAuthenticateParams;
use crate::traits::{Identity, ManagerView, Provider};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument, Instrument};

/// Runs the two-pass authentication protocol: probe cached credentials from the
/// bottom of the chain up, then re-authenticate top-down from the first invalid
/// point, always re-executing the final step.
pub struct ChainExecutor {
    config: Arc<AuthConfig>,
    providers: HashMap<ProviderName, Arc<dyn Provider>>,
    identities: HashMap<IdentityName, Arc<dyn Identity>>,
    loader: Arc<CredentialLoader>,
    integrations: Arc<IntegrationDispatcher>,
}

impl ChainExecutor {
    pub fn new(
        config: Arc<AuthConfig>,
        providers: HashMap<ProviderName, Arc<dyn Provider>>,
        identities: HashMap<IdentityName, Arc<dyn Identity>>,
        loader: Arc<CredentialLoader>,
        integrations: Arc<IntegrationDispatcher>,
    ) -> Self {
        Self {
            config,
            providers,
            identities,
            loader,
            integrations,
        }
    }

    fn resolve_name(&self, raw: &str) -> Result<IdentityName, AuthError> {
        self.config
            .resolve_identity_name(raw)
            .ok_or_else(|| AuthError::from(ChainError::IdentityNotFound(raw.to_string())))
    }

    /// Builds the chain for an already-resolved identity name, for read-only queries.
    pub fn chain_for(&self, identity: &IdentityName) -> Result<Chain, AuthError> {
        chain::build_chain(&self.config, identity).map_err(AuthError::from)
    }

    #[instrument(skip(self, ctx, manager_view), fields(identity = raw_name))]
    pub async fn authenticate(
        &self,
        ctx: &AuthContext,
        raw_name: &str,
        manager_view: Arc<dyn ManagerView>,
    ) -> Result<WhoamiInfo, AuthError> {
        let target = self.resolve_name(raw_name)?;
        let chain = chain::build_chain(&self.config, &target)?;
        let n = chain.len() - 1;

        if let Some(provider_name) = chain.provider() {
            if let Some(provider) = self.providers.get(provider_name) {
                provider
                    .pre_authenticate(manager_view.as_ref())
                    .await
                    .map_err(|source| ChainError::AuthenticationFailed {
                        step_index: 0,
                        step_name: provider_name.to_string(),
                        source,
                    })?;
            }
        }

        let highest_cached = self.probe_cache(&chain, ctx, n).await;
        let (exec_start, mut running) = match highest_cached {
            Some((idx, creds)) => (idx + 1, Some(creds)),
            None => (0, None),
        };

        for i in exec_start..=n {
            if ctx.cancellation.is_cancelled() {
                return Err(ChainError::AuthenticationFailed {
                    step_index: i,
                    step_name: chain.steps()[i].name().to_string(),
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::Interrupted,
                        "cancelled",
                    )),
                }
                .into());
            }

            let step = &chain.steps()[i];
            let step_span = info_span!("chain_step", index = i, name = step.name());
            let result = async {
                match step {
                    ChainStep::Provider(name) => {
                        if !self.config.providers.contains_key(name) {
                            return Err(ChainError::ProviderNotInConfig(name.to_string()));
                        }
                        let provider = self.providers.get(name).ok_or_else(|| {
                            ChainError::ProviderNotFound(name.to_string())
                        })?;
                        provider.authenticate(ctx).await.map_err(|source| {
                            ChainError::AuthenticationFailed {
                                step_index: i,
                                step_name: name.to_string(),
                                source,
                            }
                        })
                    }
                    ChainStep::Identity(name) => {
                        let identity = self.identities.get(name).ok_or_else(|| {
                            ChainError::IdentityNotInConfig(name.to_string())
                        })?;
                        identity
                            .authenticate(ctx, running.as_ref())
                            .await
                            .map_err(|source| ChainError::AuthenticationFailed {
                                step_index: i,
                                step_name: name.to_string(),
                                source,
                            })
                    }
                }
            }
            .instrument(step_span)
            .await?;

            self.loader.store(step.name(), &result).await?;
            running = Some(result);
        }

        let final_credentials = running.expect("chain always has at least one step");

        if let Some(identity) = self.identities.get(&target) {
            identity
                .post_authenticate(
                    ctx,
                    PostAuthenticateParams {
                        chain: &chain,
                        root_provider: chain.provider(),
                        credentials: &final_credentials,
                        manager: manager_view,
                    },
                )
                .await
                .map_err(|source| ChainError::AuthenticationFailed {
                    step_index: n,
                    step_name: target.to_string(),
                    source,
                })?;
        }

        if !ctx.skip_auto_integrations {
            self.integrations.dispatch_auto(&target, ctx).await;
        }

        info!(identity = %target, "authentication chain completed");

        Ok(WhoamiInfo {
            provider: chain.provider().map(ProviderName::to_string),
            identity: target.to_string(),
            last_updated: Utc::now(),
            expiration: final_credentials.expiration(),
            env: final_credentials.build_whoami_env(),
        })
    }

    /// Scans the chain from the target identity back toward the provider, returning
    /// the highest index with valid (fresh) cached credentials. The final step never
    /// counts as a cache hit here, since it must always re-execute; a cache at the
    /// final step only tells us it's safe to skip steps strictly before it.
    async fn probe_cache(
        &self,
        chain: &Chain,
        ctx: &AuthContext,
        final_index: usize,
    ) -> Option<(usize, Credentials)> {
        for i in (0..final_index).rev() {
            let step = &chain.steps()[i];
            let identity_impl = match step {
                ChainStep::Identity(name) => self.identities.get(name).map(|a| a.as_ref()),
                ChainStep::Provider(_) => None,
            };
            if let Ok(creds) = self.loader.load(step.name(), identity_impl, ctx).await {
                if creds.is_fresh() {
                    debug!(index = i, name = step.name(), "using cached credentials");
                    return Some((i, creds));
                }
            }
        }
        None
    }
}
