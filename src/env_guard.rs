//! Scoped suppression of host credential environment variables during SDK calls.
//!
//! Acquired with guaranteed-release semantics via an RAII guard: the denylisted
//! variables are restored on every exit path, including a panic unwinding through
//! the guard's scope. The permanent process environment is never otherwise mutated
//! by this core.

use std::env;

/// Variables that would otherwise leak stale or conflicting credential state into a
/// fresh SDK initialization. Region-like variables are deliberately excluded: they
/// are not credential material and a provider's own SDK may need them.
const DENYLIST: &[&str] = &[
    "ACCESS_KEY_ID",
    "SECRET_ACCESS_KEY",
    "SESSION_TOKEN",
    "PROFILE",
    "SHARED_CREDENTIALS_FILE",
    "CONFIG_FILE",
];

/// Suppresses [`DENYLIST`] for the lifetime of the returned guard, restoring each
/// variable's prior value (or absence) when it is dropped.
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    pub fn scoped() -> Self {
        Self::scoped_vars(DENYLIST)
    }

    /// Suppresses an explicit variable set instead of the default denylist, for
    /// identity kinds with their own conflicting variable names.
    pub fn scoped_vars(vars: &[&'static str]) -> Self {
        let saved: Vec<(&'static str, Option<String>)> =
            vars.iter().map(|&v| (v, env::var(v).ok())).collect();
        for &(name, _) in &saved {
            // Safety: restoring happens unconditionally in `Drop`, including on panic.
            unsafe { env::remove_var(name) };
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(v) => unsafe { env::set_var(name, v) },
                None => unsafe { env::remove_var(name) },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn suppresses_and_restores_on_drop() {
        unsafe { env::set_var("ACCESS_KEY_ID", "host-value") };
        {
            let _guard = EnvGuard::scoped();
            assert!(env::var("ACCESS_KEY_ID").is_err());
        }
        assert_eq!(env::var("ACCESS_KEY_ID").unwrap(), "host-value");
        unsafe { env::remove_var("ACCESS_KEY_ID") };
    }

    #[test]
    #[serial]
    fn restores_absence_when_host_never_set_it() {
        unsafe { env::remove_var("SESSION_TOKEN") };
        {
            let _guard = EnvGuard::scoped();
        }
        assert!(env::var("SESSION_TOKEN").is_err());
    }

    #[test]
    #[serial]
    fn restores_on_panic_unwind() {
        unsafe { env::set_var("PROFILE", "prod") };
        let result = std::panic::catch_unwind(|| {
            let _guard = EnvGuard::scoped();
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(env::var("PROFILE").unwrap(), "prod");
        unsafe { env::remove_var("PROFILE") };
    }
}
