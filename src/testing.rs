//! In-memory fakes for exercising the chain executor, logout coordinator, and
//! integration dispatcher without a real cloud provider SDK. Exposed outside
//! `#[cfg(test)]` behind the `test-util` feature so downstream crates assembling
//! an [`AuthManager`](crate::manager::AuthManager) in their own tests can reuse them.

use crate::context::AuthContext;
use crate::credential::{CredentialBlob, Credentials};
use crate::names::ProviderName;
use crate::traits::provider::NotSupported;
use crate::traits::{Identity, ManagerView, PostAuthenticateParams, Provider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type BoxError = Box<dyn Error + Send + Sync>;

fn fake_long_lived(access_key_id: &str) -> Credentials {
    Credentials::LongLived {
        access_key_id: access_key_id.to_string(),
        secret_access_key: crate::utils::secret_string::SecretString::new("mock-secret"),
    }
}

fn fake_session_token(access_key_id: &str) -> Credentials {
    Credentials::SessionToken {
        access_key_id: access_key_id.to_string(),
        secret_access_key: crate::utils::secret_string::SecretString::new("mock-secret"),
        session_token: crate::utils::secret_string::SecretString::new("mock-session-token"),
        expiration: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
    }
}

/// A [`Provider`] whose behavior is fixed at construction: it either always succeeds
/// with a canned credential, or always fails with a canned message.
pub struct MockProvider {
    kind: String,
    result: Result<Credentials, String>,
    call_count: AtomicUsize,
    supports_logout: bool,
}

impl MockProvider {
    pub fn succeeding(kind: impl Into<String>, access_key_id: impl AsRef<str>) -> Self {
        Self {
            kind: kind.into(),
            result: Ok(fake_long_lived(access_key_id.as_ref())),
            call_count: AtomicUsize::new(0),
            supports_logout: false,
        }
    }

    pub fn failing(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            result: Err(message.into()),
            call_count: AtomicUsize::new(0),
            supports_logout: false,
        }
    }

    /// Like [`Self::succeeding`], but mints a session-marked credential (never cached
    /// to the keyring) instead of a long-lived one.
    pub fn succeeding_with_session_token(kind: impl Into<String>, access_key_id: impl AsRef<str>) -> Self {
        Self {
            kind: kind.into(),
            result: Ok(fake_session_token(access_key_id.as_ref())),
            call_count: AtomicUsize::new(0),
            supports_logout: false,
        }
    }

    pub fn with_logout_support(mut self) -> Self {
        self.supports_logout = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn authenticate(&self, _ctx: &AuthContext) -> Result<Credentials, BoxError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|m| -> BoxError { m.into() })
    }

    async fn logout(&self, _ctx: &AuthContext) -> Result<(), BoxError> {
        if self.supports_logout {
            Ok(())
        } else {
            Err(Box::new(NotSupported("provider logout")))
        }
    }
}

/// An [`Identity`] whose `authenticate` either passes `input_credentials` through
/// unchanged (recording that it ran), or fails with a canned message. Records
/// `post_authenticate` invocations for assertion.
pub struct MockIdentity {
    kind: String,
    provider: Option<ProviderName>,
    fail_with: Option<String>,
    call_count: AtomicUsize,
    post_auth_calls: AtomicUsize,
    last_input: Mutex<Option<Option<Credentials>>>,
}

impl MockIdentity {
    pub fn passthrough(kind: impl Into<String>, provider: Option<ProviderName>) -> Self {
        Self {
            kind: kind.into(),
            provider,
            fail_with: None,
            call_count: AtomicUsize::new(0),
            post_auth_calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn failing(
        kind: impl Into<String>,
        provider: Option<ProviderName>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            provider,
            fail_with: Some(message.into()),
            call_count: AtomicUsize::new(0),
            post_auth_calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn post_authenticate_calls(&self) -> usize {
        self.post_auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Identity for MockIdentity {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn provider_name(&self) -> Option<&ProviderName> {
        self.provider.as_ref()
    }

    async fn authenticate(
        &self,
        _ctx: &AuthContext,
        input_credentials: Option<&Credentials>,
    ) -> Result<Credentials, BoxError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().expect("lock poisoned") = Some(input_credentials.cloned());
        match &self.fail_with {
            Some(message) => Err(message.clone().into()),
            None => match input_credentials {
                Some(creds) => Ok(creds.clone()),
                None => Ok(fake_long_lived("standalone-mock")),
            },
        }
    }

    async fn post_authenticate(
        &self,
        _ctx: &AuthContext,
        _params: PostAuthenticateParams<'_>,
    ) -> Result<(), BoxError> {
        self.post_auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A stub [`ManagerView`] for tests exercising `pre_authenticate`/`post_authenticate`
/// hooks in isolation from a real [`AuthManager`](crate::manager::AuthManager).
pub struct StubManagerView {
    pub identities: Vec<crate::names::IdentityName>,
    pub providers: Vec<ProviderName>,
}

impl ManagerView for StubManagerView {
    fn chain_for(&self, _identity: &crate::names::IdentityName) -> Option<crate::chain::Chain> {
        None
    }

    fn list_identities(&self) -> Vec<crate::names::IdentityName> {
        self.identities.clone()
    }

    fn list_providers(&self) -> Vec<ProviderName> {
        self.providers.clone()
    }
}
