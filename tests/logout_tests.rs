//! Exercises the logout coordinator's partial-success aggregation through the
//! public `AuthManager` surface.

use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use stackauth_core::prelude::*;

type BoxError = Box<dyn Error + Send + Sync>;

struct SucceedingProvider;

#[async_trait]
impl Provider for SucceedingProvider {
    fn kind(&self) -> &str {
        "test/sso"
    }

    async fn authenticate(&self, _ctx: &AuthContext) -> Result<Credentials, BoxError> {
        Ok(Credentials::LongLived {
            access_key_id: "AKIA".to_string(),
            secret_access_key: stackauth_core::utils::SecretString::new("shh"),
        })
    }

    async fn logout(&self, _ctx: &AuthContext) -> Result<(), BoxError> {
        Ok(())
    }
}

/// An identity whose logout hook genuinely fails (not the `NotSupported` no-op
/// case), to exercise the "at least one participant failed" path.
struct FailingLogoutIdentity {
    provider: ProviderName,
}

#[async_trait]
impl Identity for FailingLogoutIdentity {
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
        Ok(input_credentials.expect("has upstream provider").clone())
    }

    async fn logout(&self, _ctx: &AuthContext) -> Result<(), BoxError> {
        Err("device profile is locked by another process".into())
    }
}

fn manager_with_failing_identity_logout() -> (Arc<AuthManager>, IdentityName) {
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

    let manager = AuthManager::builder(config)
        .with_provider(provider_name.clone(), Arc::new(SucceedingProvider))
        .with_identity(
            identity_name.clone(),
            Arc::new(FailingLogoutIdentity { provider: provider_name }),
        )
        .build()
        .unwrap();

    (manager, identity_name)
}

#[tokio::test]
async fn logout_is_partial_when_store_deletion_succeeds_but_identity_hook_fails() {
    let (manager, identity_name) = manager_with_failing_identity_logout();
    let err = manager
        .logout(&identity_name, &AuthContext::new())
        .await
        .unwrap_err();
    match err {
        AuthError::PartialLogout { identity, errors } => {
            assert_eq!(identity, identity_name.to_string());
            assert!(errors.iter().any(|e| e.contains("device profile is locked")));
        }
        other => panic!("expected PartialLogout, got {other:?}"),
    }
}

#[tokio::test]
async fn logout_all_aggregates_failures_without_aborting() {
    let (manager, _) = manager_with_failing_identity_logout();
    let err = manager.logout_all(&AuthContext::new()).await.unwrap_err();
    assert!(matches!(err, AuthError::LogoutFailed { .. }));
}
