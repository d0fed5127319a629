//! Case-insensitive identity resolution and shell-environment projection, exercised
//! through the public `AuthManager` surface.

use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use stackauth_core::prelude::*;

type BoxError = Box<dyn Error + Send + Sync>;

struct StaticIdentity;

#[async_trait]
impl Identity for StaticIdentity {
    fn kind(&self) -> &str {
        "static"
    }

    fn provider_name(&self) -> Option<&ProviderName> {
        None
    }

    async fn authenticate(
        &self,
        _ctx: &AuthContext,
        _input_credentials: Option<&Credentials>,
    ) -> Result<Credentials, BoxError> {
        Ok(Credentials::LongLived {
            access_key_id: "AKIA-STATIC".to_string(),
            secret_access_key: stackauth_core::utils::SecretString::new("shh"),
        })
    }

    fn environment(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("REGION".to_string(), "us-east-1".to_string());
        env
    }

    fn prepare_environment(
        &self,
        _ctx: &AuthContext,
        mut existing_env: HashMap<String, String>,
    ) -> HashMap<String, String> {
        existing_env.remove("AWS_ACCESS_KEY_ID");
        existing_env.extend(self.environment());
        existing_env
    }
}

fn manager_with_mixed_case_identity() -> Arc<AuthManager> {
    let identity_name = IdentityName::new("Prod-Admin").unwrap();
    let config = AuthConfig::builder()
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
        .unwrap()
        .keyring_backend(KeyringBackend::NoOp)
        .build()
        .unwrap();

    AuthManager::builder(config)
        .with_identity(identity_name, Arc::new(StaticIdentity))
        .build()
        .unwrap()
}

#[tokio::test]
async fn authenticate_resolves_identity_name_case_insensitively() {
    let manager = manager_with_mixed_case_identity();
    let info = manager
        .authenticate(&AuthContext::new(), "prod-admin")
        .await
        .unwrap();
    assert_eq!(info.identity, "Prod-Admin");
}

#[test]
fn prepare_shell_environment_overrides_host_vars_and_adds_identity_vars() {
    let manager = manager_with_mixed_case_identity();
    let base_env = vec![
        ("AWS_ACCESS_KEY_ID".to_string(), "host-stale-key".to_string()),
        ("PATH".to_string(), "/usr/bin".to_string()),
    ];
    let out = manager
        .prepare_shell_environment(
            &IdentityName::new("Prod-Admin").unwrap(),
            &base_env,
            &AuthContext::new(),
        )
        .unwrap();
    let map: HashMap<String, String> = out.into_iter().collect();
    assert_eq!(map.get("PATH").unwrap(), "/usr/bin");
    assert_eq!(map.get("REGION").unwrap(), "us-east-1");
    assert!(!map.contains_key("AWS_ACCESS_KEY_ID"));
}
