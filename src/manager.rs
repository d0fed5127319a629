//! Ties the chain builder, executor, loader, logout coordinator, and integration
//! dispatcher into one entry point.

use crate::chain::Chain;
use crate::config::{AuthConfig, KeyringBackend, Realm};
use crate::context::AuthContext;
use crate::credential::WhoamiInfo;
use crate::error::AuthError;
use crate::executor::ChainExecutor;
use crate::integration::{IntegrationDispatcher, IntegrationHandler};
use crate::loader::CredentialLoader;
use crate::logout::LogoutCoordinator;
use crate::names::{IdentityName, IntegrationName, ProviderName};
use crate::select;
#[cfg(feature = "store-file")]
use crate::store::FileStore;
#[cfg(feature = "store-keyring")]
use crate::store::KeyringStore;
use crate::store::NoOpStore;
use crate::traits::{CredentialStore, Identity, ManagerView, Provider};
use crate::whoami;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::instrument;

/// The authentication manager: resolves, executes, and caches credential chains.
///
/// Mutating operations (`authenticate`, `logout*`) must not be called concurrently
/// on the same instance, because they mutate the manager's last-built-chain cache.
/// Read-only queries may run between mutating calls, not during one.
pub struct AuthManager {
    config: Arc<AuthConfig>,
    providers: HashMap<ProviderName, Arc<dyn Provider>>,
    identities: HashMap<IdentityName, Arc<dyn Identity>>,
    executor: ChainExecutor,
    loader: Arc<CredentialLoader>,
    logout: LogoutCoordinator,
    integrations: Arc<IntegrationDispatcher>,
    last_chain: Mutex<HashMap<IdentityName, Chain>>,
}

impl AuthManager {
    pub fn builder(config: AuthConfig) -> AuthManagerBuilder {
        AuthManagerBuilder::new(config)
    }

    /// Runs the two-pass authentication protocol for `identity_name` (accepted in any
    /// case per the configured case map) and returns the resulting public view.
    #[instrument(skip(self), fields(identity = identity_name))]
    pub async fn authenticate(
        self: &Arc<Self>,
        ctx: &AuthContext,
        identity_name: &str,
    ) -> Result<WhoamiInfo, AuthError> {
        let view: Arc<dyn ManagerView> = self.clone();
        let info = self.executor.authenticate(ctx, identity_name, view).await?;
        if let Ok(name) = IdentityName::new(&info.identity) {
            if let Ok(chain) = self.executor.chain_for(&name) {
                self.last_chain.lock().expect("lock poisoned").insert(name, chain);
            }
        }
        Ok(info)
    }

    /// Non-interactive probe: cached credentials first, silent chain re-auth fallback.
    #[instrument(skip(self), fields(identity = %identity))]
    pub async fn whoami(self: &Arc<Self>, identity: &IdentityName) -> Result<WhoamiInfo, AuthError> {
        let view: Arc<dyn ManagerView> = self.clone();
        whoami::whoami(identity, &self.loader, &self.executor, &self.identities, view).await
    }

    /// Builds the child-process environment for `identity`, layering its projection
    /// over `base_env`.
    pub fn prepare_shell_environment(
        &self,
        identity: &IdentityName,
        base_env: &[(String, String)],
        ctx: &AuthContext,
    ) -> Result<Vec<(String, String)>, AuthError> {
        whoami::prepare_shell_environment(&self.config, identity, &self.identities, base_env, ctx)
    }

    pub async fn logout(&self, identity: &IdentityName, ctx: &AuthContext) -> Result<(), AuthError> {
        self.logout.logout(identity, ctx).await
    }

    pub async fn logout_provider(
        &self,
        provider: &ProviderName,
        ctx: &AuthContext,
    ) -> Result<(), AuthError> {
        self.logout.logout_provider(provider, ctx).await
    }

    pub async fn logout_all(&self, ctx: &AuthContext) -> Result<(), AuthError> {
        self.logout.logout_all(ctx).await
    }

    pub async fn execute_integration(
        &self,
        name: &IntegrationName,
        ctx: &AuthContext,
    ) -> Result<(), AuthError> {
        self.integrations.execute_integration(name, ctx).await
    }

    pub async fn execute_identity_integrations(
        &self,
        identity: &IdentityName,
        ctx: &AuthContext,
    ) -> Result<(), AuthError> {
        self.integrations.execute_identity_integrations(identity, ctx).await
    }

    pub fn get_default_identity(
        &self,
        force_select: bool,
        ctx: &AuthContext,
    ) -> Result<IdentityName, AuthError> {
        select::get_default_identity(&self.config, force_select, ctx)
    }

    pub fn chain_for(&self, identity: &IdentityName) -> Result<Chain, AuthError> {
        if let Some(cached) = self.last_chain.lock().expect("lock poisoned").get(identity) {
            return Ok(cached.clone());
        }
        self.executor.chain_for(identity)
    }

    pub fn list_identities(&self) -> Vec<IdentityName> {
        self.config.identities.keys().cloned().collect()
    }

    /// Resolves `raw` to a configured identity name (exact key, then case-insensitive
    /// case map), mirroring the executor's own identity-resolution contract.
    pub fn resolve_identity_name(&self, raw: &str) -> Option<IdentityName> {
        self.config.resolve_identity_name(raw)
    }

    pub fn list_providers(&self) -> Vec<ProviderName> {
        self.config.providers.keys().cloned().collect()
    }

    pub fn display_name(&self, lowercase: &str) -> Option<String> {
        self.config.identity_case_map.display_name(lowercase).map(String::from)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl ManagerView for AuthManager {
    fn chain_for(&self, identity: &IdentityName) -> Option<Chain> {
        AuthManager::chain_for(self, identity).ok()
    }

    fn list_identities(&self) -> Vec<IdentityName> {
        AuthManager::list_identities(self)
    }

    fn list_providers(&self) -> Vec<ProviderName> {
        AuthManager::list_providers(self)
    }
}

/// Assembles an [`AuthManager`] from a validated [`AuthConfig`] plus the registered
/// provider/identity/integration implementations and the chosen store backend.
pub struct AuthManagerBuilder {
    config: AuthConfig,
    providers: HashMap<ProviderName, Arc<dyn Provider>>,
    identities: HashMap<IdentityName, Arc<dyn Identity>>,
    integration_handlers: HashMap<IntegrationName, Arc<dyn IntegrationHandler>>,
    store: Option<Arc<dyn CredentialStore>>,
    file_store_base_dir: Option<PathBuf>,
    keyring_service: String,
}

impl AuthManagerBuilder {
    fn new(config: AuthConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
            identities: HashMap::new(),
            integration_handlers: HashMap::new(),
            store: None,
            file_store_base_dir: None,
            keyring_service: "stackauth".to_string(),
        }
    }

    pub fn with_provider(mut self, name: ProviderName, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(name, provider);
        self
    }

    pub fn with_identity(mut self, name: IdentityName, identity: Arc<dyn Identity>) -> Self {
        self.identities.insert(name, identity);
        self
    }

    pub fn with_integration_handler(
        mut self,
        name: IntegrationName,
        handler: Arc<dyn IntegrationHandler>,
    ) -> Self {
        self.integration_handlers.insert(name, handler);
        self
    }

    /// Overrides the store backend entirely, bypassing `keyring_backend`/`file_store_base_dir`.
    pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_file_store_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.file_store_base_dir = Some(base_dir.into());
        self
    }

    pub fn with_keyring_service(mut self, service: impl Into<String>) -> Self {
        self.keyring_service = service.into();
        self
    }

    fn build_store(&self) -> Result<Arc<dyn CredentialStore>, AuthError> {
        if let Some(store) = &self.store {
            return Ok(store.clone());
        }
        match self.config.keyring_backend {
            KeyringBackend::Os => build_os_store(&self.keyring_service),
            KeyringBackend::File => {
                build_file_store(self.file_store_base_dir.clone(), &self.config.realm)
            }
            KeyringBackend::NoOp => Ok(Arc::new(NoOpStore)),
        }
    }

    /// Validates and constructs the manager. The config itself was already validated
    /// by `AuthConfigBuilder::build`; this step wires the runtime collaborators.
    pub fn build(self) -> Result<Arc<AuthManager>, AuthError> {
        let store = self.build_store()?;
        let config = Arc::new(self.config);
        let loader = Arc::new(CredentialLoader::new(store.clone(), config.realm.clone()));
        let integrations = Arc::new(IntegrationDispatcher::new(
            config.clone(),
            self.integration_handlers,
        ));
        let executor = ChainExecutor::new(
            config.clone(),
            self.providers.clone(),
            self.identities.clone(),
            loader.clone(),
            integrations.clone(),
        );
        let logout = LogoutCoordinator::new(
            config.clone(),
            store,
            self.providers.clone(),
            self.identities.clone(),
        );

        Ok(Arc::new(AuthManager {
            config,
            providers: self.providers,
            identities: self.identities,
            executor,
            loader,
            logout,
            integrations,
            last_chain: Mutex::new(HashMap::new()),
        }))
    }
}

#[cfg(feature = "store-keyring")]
fn build_os_store(service: &str) -> Result<Arc<dyn CredentialStore>, AuthError> {
    Ok(Arc::new(KeyringStore::new(service.to_string())))
}

#[cfg(not(feature = "store-keyring"))]
fn build_os_store(_service: &str) -> Result<Arc<dyn CredentialStore>, AuthError> {
    Err(AuthError::FailedToInitializeAuthManager(
        "OS keyring backend requested but the `store-keyring` feature is not enabled".to_string(),
    ))
}

#[cfg(feature = "store-file")]
fn build_file_store(
    base_dir: Option<PathBuf>,
    realm: &Realm,
) -> Result<Arc<dyn CredentialStore>, AuthError> {
    let base_dir = base_dir.unwrap_or_else(default_file_store_dir);
    let scoped = scope_by_realm(base_dir, realm);
    Ok(Arc::new(FileStore::new(scoped)))
}

#[cfg(not(feature = "store-file"))]
fn build_file_store(
    _base_dir: Option<PathBuf>,
    _realm: &Realm,
) -> Result<Arc<dyn CredentialStore>, AuthError> {
    Err(AuthError::FailedToInitializeAuthManager(
        "file-based credential store requested but the `store-file` feature is not enabled".to_string(),
    ))
}

#[cfg(feature = "store-file")]
fn default_file_store_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "stackauth")
        .map(|dirs| dirs.data_local_dir().join("credentials"))
        .unwrap_or_else(|| PathBuf::from(".stackauth/credentials"))
}

#[cfg(feature = "store-file")]
fn scope_by_realm(base_dir: PathBuf, realm: &Realm) -> PathBuf {
    match &realm.name {
        Some(name) => base_dir.join(name),
        None => base_dir,
    }
}
