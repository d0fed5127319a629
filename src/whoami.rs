//! Builds the caller-facing authentication view and projects credentials into the
//! environment handed to child processes.

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::credential::{CredentialBlob, WhoamiInfo};
use crate::error::AuthError;
use crate::executor::ChainExecutor;
use crate::loader::CredentialLoader;
use crate::names::IdentityName;
use crate::traits::{Identity, ManagerView};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// A non-interactive probe: prefers cached credentials, falls back to a silent
/// chain authentication (so provider credentials deposited by an external tool can
/// still mint derived credentials), and on failure surfaces the original cache-miss
/// error rather than whatever the fallback attempt produced.
#[instrument(skip(loader, executor, identities, manager_view), fields(identity = %identity))]
pub async fn whoami(
    identity: &IdentityName,
    loader: &CredentialLoader,
    executor: &ChainExecutor,
    identities: &HashMap<IdentityName, Arc<dyn Identity>>,
    manager_view: Arc<dyn ManagerView>,
) -> Result<WhoamiInfo, AuthError> {
    let identity_impl = identities.get(identity).map(Arc::as_ref);
    let cache_miss = match loader
        .load(identity.as_str(), identity_impl, &AuthContext::non_interactive())
        .await
    {
        Ok(creds) => {
            return Ok(WhoamiInfo {
                provider: None,
                identity: identity.to_string(),
                last_updated: Utc::now(),
                expiration: creds.expiration(),
                env: creds.build_whoami_env(),
            });
        }
        Err(e) => e,
    };

    let ctx = AuthContext::non_interactive();
    match executor.authenticate(&ctx, identity.as_str(), manager_view).await {
        Ok(info) => Ok(info),
        Err(_) => Err(cache_miss),
    }
}

/// Parses `base_env`, applies `identity`'s environment projection, and re-serializes
/// to a list suitable for `Command::envs`.
pub fn prepare_shell_environment(
    config: &AuthConfig,
    identity_name: &IdentityName,
    identities: &HashMap<IdentityName, Arc<dyn Identity>>,
    base_env: &[(String, String)],
    ctx: &AuthContext,
) -> Result<Vec<(String, String)>, AuthError> {
    if !config.identities.contains_key(identity_name) {
        return Err(AuthError::from(crate::error::ChainError::IdentityNotInConfig(
            identity_name.to_string(),
        )));
    }
    let env_map: HashMap<String, String> = base_env.iter().cloned().collect();

    let projected = match identities.get(identity_name) {
        Some(identity) => identity.prepare_environment(ctx, env_map),
        None => env_map,
    };

    let mut out: Vec<(String, String)> = projected.into_iter().collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
