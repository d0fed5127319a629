//! Per-call context threaded through `authenticate`/`logout`/`whoami`.
//!
//! Flags live on the context rather than on the manager so that re-entrant
//! calls (an integration triggering a nested lookup, a facade re-dispatch)
//! can flip a flag for their own sub-call without racing a sibling call
//! mutating shared manager state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheap, clonable cancellation signal. Honored at chain step boundaries; the manager
/// never forcibly terminates an in-flight provider call, it only stops advancing once
/// the token reports cancelled.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Context passed into every chain, logout, and whoami operation.
///
/// Construct via [`AuthContext::new`] for the common case, then use the
/// `with_*` builder methods for the opaque mode switches described in the
/// integration dispatcher and logout coordinator designs.
#[derive(Clone, Default)]
pub struct AuthContext {
    /// Set by `execute_integration`/`execute_identity_integrations` so the
    /// `authenticate` call they trigger does not re-fire the integration about
    /// to run explicitly.
    pub skip_auto_integrations: bool,

    /// When `false`, identity selection and any provider/identity prompts must
    /// fail with a typed error instead of blocking on stdin (used by `whoami`).
    pub allow_prompts: bool,

    /// When set, authentication failures during a non-critical probe (e.g.
    /// `whoami`'s silent re-auth attempt) should not be logged at error level.
    pub suppress_auth_errors: bool,

    /// Set by `LogoutProvider` while iterating member identities, so each
    /// per-identity `Logout` does not also delete the provider's keyring
    /// entry and invoke its logout hook (which `LogoutProvider` does once,
    /// itself, after the loop).
    pub skip_provider_logout: bool,

    pub cancellation: CancellationToken,
}

impl AuthContext {
    /// A context for a normal, interactive-capable top-level call.
    pub fn new() -> Self {
        Self {
            allow_prompts: true,
            ..Self::default()
        }
    }

    /// A context for calls that must never block on a terminal prompt (`whoami`,
    /// automated CI invocations).
    pub fn non_interactive() -> Self {
        Self {
            allow_prompts: false,
            ..Self::default()
        }
    }

    pub fn with_skip_auto_integrations(mut self, skip: bool) -> Self {
        self.skip_auto_integrations = skip;
        self
    }

    pub fn with_suppress_auth_errors(mut self, suppress: bool) -> Self {
        self.suppress_auth_errors = suppress;
        self
    }

    pub fn with_skip_provider_logout(mut self, skip: bool) -> Self {
        self.skip_provider_logout = skip;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}
