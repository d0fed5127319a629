//! Post-authentication fan-out to linked side effects (e.g. container-registry login).

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::names::{IdentityName, IntegrationName};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tracing::{instrument, warn};

type BoxError = Box<dyn Error + Send + Sync>;

/// A registered integration side effect. Concrete kinds (container-registry login,
/// kubeconfig population, ...) live outside this core.
#[async_trait]
pub trait IntegrationHandler: Send + Sync {
    fn kind(&self) -> &str;
    async fn execute(&self, ctx: &AuthContext, identity: &IdentityName) -> Result<(), BoxError>;
}

/// Dispatches integrations linked to an identity, either automatically after a
/// successful authentication or on explicit request.
pub struct IntegrationDispatcher {
    config: Arc<AuthConfig>,
    handlers: HashMap<IntegrationName, Arc<dyn IntegrationHandler>>,
}

impl IntegrationDispatcher {
    pub fn new(
        config: Arc<AuthConfig>,
        handlers: HashMap<IntegrationName, Arc<dyn IntegrationHandler>>,
    ) -> Self {
        Self { config, handlers }
    }

    fn linked_to(&self, identity: &IdentityName) -> Vec<&IntegrationName> {
        self.config
            .integrations
            .iter()
            .filter(|(_, cfg)| &cfg.via_identity == identity)
            .map(|(name, _)| name)
            .collect()
    }

    /// Runs every integration auto-linked to `identity` whose `auto_provision` is
    /// true, sequentially. Failures are logged at warning level and never propagated:
    /// this path runs after authentication already succeeded.
    #[instrument(skip(self, ctx), fields(identity = %identity))]
    pub async fn dispatch_auto(&self, identity: &IdentityName, ctx: &AuthContext) {
        for name in self.linked_to(identity) {
            let cfg = &self.config.integrations[name];
            if !cfg.auto_provision {
                continue;
            }
            let Some(handler) = self.handlers.get(name) else {
                warn!(integration = %name, "auto-linked integration has no registered handler");
                continue;
            };
            if let Err(e) = handler.execute(ctx, identity).await {
                warn!(integration = %name, error = %e, "auto-triggered integration failed");
            }
        }
    }

    /// Runs a single named integration explicitly, surfacing failure to the caller.
    #[instrument(skip(self, ctx), fields(integration = %name))]
    pub async fn execute_integration(
        &self,
        name: &IntegrationName,
        ctx: &AuthContext,
    ) -> Result<(), AuthError> {
        let cfg = self
            .config
            .integrations
            .get(name)
            .ok_or_else(|| AuthError::IntegrationNotFound(name.to_string()))?;
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| AuthError::IntegrationNotFound(name.to_string()))?;
        handler
            .execute(ctx, &cfg.via_identity)
            .await
            .map_err(|source| AuthError::IntegrationFailed {
                name: name.to_string(),
                source,
            })
    }

    /// Runs every integration linked to `identity`, regardless of `auto_provision`,
    /// surfacing the first failure.
    #[instrument(skip(self, ctx), fields(identity = %identity))]
    pub async fn execute_identity_integrations(
        &self,
        identity: &IdentityName,
        ctx: &AuthContext,
    ) -> Result<(), AuthError> {
        let names: Vec<IntegrationName> = self.linked_to(identity).into_iter().cloned().collect();
        if names.is_empty() {
            return Err(AuthError::NoLinkedIntegrations(identity.to_string()));
        }
        for name in names {
            self.execute_integration(&name, ctx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdentityConfig, IntegrationConfig, Via};
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
        fails: bool,
    }

    #[async_trait]
    impl IntegrationHandler for CountingHandler {
        fn kind(&self) -> &str {
            "test"
        }

        async fn execute(&self, _ctx: &AuthContext, _identity: &IdentityName) -> Result<(), BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err("boom".into())
            } else {
                Ok(())
            }
        }
    }

    fn config_with_integration(auto_provision: bool) -> Arc<AuthConfig> {
        let identity_name = IdentityName::new("prod-admin").unwrap();
        let mut cfg = AuthConfig::builder()
            .add_identity(
                identity_name.clone(),
                IdentityConfig {
                    kind: "static".to_string(),
                    default: false,
                    alias: None,
                    via: Via::None,
                    principal: None,
                    credentials: None,
                },
            )
            .unwrap();
        cfg = cfg
            .add_integration(
                IntegrationName::new("registry-login").unwrap(),
                IntegrationConfig {
                    kind: "docker/login".to_string(),
                    via_identity: identity_name,
                    auto_provision,
                    spec: Map::new(),
                },
            )
            .unwrap();
        Arc::new(cfg.build().unwrap())
    }

    #[tokio::test]
    async fn dispatch_auto_swallows_handler_failure() {
        let config = config_with_integration(true);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handlers: HashMap<IntegrationName, Arc<dyn IntegrationHandler>> = HashMap::new();
        handlers.insert(
            IntegrationName::new("registry-login").unwrap(),
            Arc::new(CountingHandler {
                calls: calls.clone(),
                fails: true,
            }),
        );
        let dispatcher = IntegrationDispatcher::new(config, handlers);
        dispatcher
            .dispatch_auto(&IdentityName::new("prod-admin").unwrap(), &AuthContext::new())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatch_auto_skips_non_auto_provision() {
        let config = config_with_integration(false);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handlers: HashMap<IntegrationName, Arc<dyn IntegrationHandler>> = HashMap::new();
        handlers.insert(
            IntegrationName::new("registry-login").unwrap(),
            Arc::new(CountingHandler {
                calls: calls.clone(),
                fails: false,
            }),
        );
        let dispatcher = IntegrationDispatcher::new(config, handlers);
        dispatcher
            .dispatch_auto(&IdentityName::new("prod-admin").unwrap(), &AuthContext::new())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn execute_identity_integrations_errors_when_none_linked() {
        let config = config_with_integration(true);
        let dispatcher = IntegrationDispatcher::new(config, HashMap::new());
        let err = dispatcher
            .execute_identity_integrations(&IdentityName::new("nobody").unwrap(), &AuthContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoLinkedIntegrations(_)));
    }
}
