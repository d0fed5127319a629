//! End-to-end exercise of the two-pass chain executor protocol through the public
//! `AuthManager` surface: cache probing bottom-up, re-authentication top-down, and
//! the rule that the final chain step always re-executes.

use async_trait::async_trait;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stackauth_core::prelude::*;

type BoxError = Box<dyn Error + Send + Sync>;

struct CountingProvider {
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for CountingProvider {
    fn kind(&self) -> &str {
        "test/sso"
    }

    async fn authenticate(&self, _ctx: &AuthContext) -> Result<Credentials, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Credentials::LongLived {
            access_key_id: "provider-minted".to_string(),
            secret_access_key: stackauth_core::utils::SecretString::new("shh"),
        })
    }
}

struct CountingIdentity {
    provider: ProviderName,
    calls: AtomicUsize,
}

impl CountingIdentity {
    fn new(provider: ProviderName) -> Self {
        Self {
            provider,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Identity for CountingIdentity {
    fn kind(&self) -> &str {
        "test/role"
    }

    fn provider_name(&self) -> Option<&ProviderName> {
        Some(&self.provider)
    }

    async fn authenticate(
        &self,
        _ctx: &AuthContext,
        input_credentials: Option<&Credentials>,
    ) -> Result<Credentials, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input_credentials.expect("role identity always has an upstream provider").clone())
    }
}

fn single_hop_config() -> (ProviderName, IdentityName, AuthConfig) {
    let provider_name = ProviderName::new("sso").unwrap();
    let identity_name = IdentityName::new("prod-admin").unwrap();
    let config = AuthConfig::builder()
        .add_provider(
            provider_name.clone(),
            ProviderConfig {
                kind: "test/sso".to_string(),
                params: Default::default(),
            },
        )
        .unwrap()
        .add_identity(
            identity_name.clone(),
            IdentityConfig {
                kind: "test/role".to_string(),
                default: true,
                alias: None,
                via: Via::Provider(provider_name.clone()),
                principal: None,
                credentials: None,
            },
        )
        .unwrap()
        .keyring_backend(KeyringBackend::NoOp)
        .build()
        .unwrap();
    (provider_name, identity_name, config)
}

#[tokio::test]
async fn final_step_always_reexecutes_even_when_earlier_steps_are_cached() {
    let (provider_name, identity_name, _) = single_hop_config();
    let provider = Arc::new(CountingProvider::new());
    let identity = Arc::new(CountingIdentity::new(provider_name.clone()));

    let dir = tempfile::tempdir().unwrap();
    let config = AuthConfig::builder()
        .add_provider(
            provider_name.clone(),
            ProviderConfig {
                kind: "test/sso".to_string(),
                params: Default::default(),
            },
        )
        .unwrap()
        .add_identity(
            identity_name.clone(),
            IdentityConfig {
                kind: "test/role".to_string(),
                default: true,
                alias: None,
                via: Via::Provider(provider_name.clone()),
                principal: None,
                credentials: None,
            },
        )
        .unwrap()
        .keyring_backend(KeyringBackend::File)
        .build()
        .unwrap();

    let manager = AuthManager::builder(config)
        .with_provider(provider_name, provider.clone())
        .with_identity(identity_name.clone(), identity.clone())
        .with_file_store_base_dir(dir.path())
        .build()
        .unwrap();

    manager
        .authenticate(&AuthContext::new(), identity_name.as_str())
        .await
        .unwrap();
    assert_eq!(provider.calls(), 1);
    assert_eq!(identity.calls(), 1);

    manager
        .authenticate(&AuthContext::new(), identity_name.as_str())
        .await
        .unwrap();
    // The provider's long-lived credential never expires, so the bottom-up cache
    // probe finds it fresh and skips re-running the provider step...
    assert_eq!(provider.calls(), 1);
    // ...but the final step (the requested identity) always re-executes.
    assert_eq!(identity.calls(), 2);
}

#[tokio::test]
async fn multi_hop_chain_skips_cached_steps_strictly_before_the_final_one() {
    let provider_name = ProviderName::new("sso").unwrap();
    let base_name = IdentityName::new("base").unwrap();
    let readonly_name = IdentityName::new("readonly").unwrap();

    let provider = Arc::new(CountingProvider::new());
    let base_identity = Arc::new(CountingIdentity::new(provider_name.clone()));
    let readonly_identity = Arc::new(CountingIdentity::new(provider_name.clone()));

    let config = AuthConfig::builder()
        .add_provider(
            provider_name.clone(),
            ProviderConfig {
                kind: "test/sso".to_string(),
                params: Default::default(),
            },
        )
        .unwrap()
        .add_identity(
            base_name.clone(),
            IdentityConfig {
                kind: "test/role".to_string(),
                default: false,
                alias: None,
                via: Via::Provider(provider_name.clone()),
                principal: None,
                credentials: None,
            },
        )
        .unwrap()
        .add_identity(
            readonly_name.clone(),
            IdentityConfig {
                kind: "test/role".to_string(),
                default: true,
                alias: None,
                via: Via::Identity(base_name.clone()),
                principal: None,
                credentials: None,
            },
        )
        .unwrap()
        .keyring_backend(KeyringBackend::File)
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let manager = AuthManager::builder(config)
        .with_provider(provider_name, provider.clone())
        .with_identity(base_name, base_identity.clone())
        .with_identity(readonly_name.clone(), readonly_identity.clone())
        .with_file_store_base_dir(dir.path())
        .build()
        .unwrap();

    manager
        .authenticate(&AuthContext::new(), readonly_name.as_str())
        .await
        .unwrap();
    manager
        .authenticate(&AuthContext::new(), readonly_name.as_str())
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert_eq!(base_identity.calls(), 1);
    assert_eq!(readonly_identity.calls(), 2);
}

#[tokio::test]
async fn chain_for_reflects_the_last_built_chain() {
    let (provider_name, identity_name, config) = single_hop_config();
    let provider = Arc::new(CountingProvider::new());
    let identity = Arc::new(CountingIdentity::new(provider_name.clone()));
    let manager = AuthManager::builder(config)
        .with_provider(provider_name, provider)
        .with_identity(identity_name.clone(), identity)
        .build()
        .unwrap();

    manager
        .authenticate(&AuthContext::new(), identity_name.as_str())
        .await
        .unwrap();
    let chain = manager.chain_for(&identity_name).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.target(), &identity_name);
}
