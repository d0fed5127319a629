//! Credential blobs and the caller-facing `whoami` projection.

use crate::utils::secret_string::SecretString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capability set every concrete credential variant exposes, independent of kind.
pub trait CredentialBlob {
    /// True once `expiration()` has passed (ignoring the safety buffer; callers needing
    /// the buffer use [`Credentials::is_fresh`]).
    fn is_expired(&self) -> bool;

    /// Absolute expiration instant, if this credential kind expires at all.
    fn expiration(&self) -> Option<DateTime<Utc>>;

    /// True if this blob must never be persisted to the keyring (see the credential
    /// loader's session-token policy).
    fn is_session_token(&self) -> bool;

    /// Cheap structural sanity probe (non-empty fields, well-formed values); does not
    /// make network calls.
    fn validate(&self) -> bool;

    /// Builds the environment-variable projection used by `whoami`/`prepare_shell_environment`.
    fn build_whoami_env(&self) -> HashMap<String, String>;
}

/// Polymorphic credential payload. New provider/identity kinds add a variant here rather
/// than a new trait object, since the set of shapes this core must reason about (session
/// vs long-lived vs bearer) is closed.
#[derive(Clone, Serialize, Deserialize)]
pub enum Credentials {
    /// A short-lived token minted by assuming a role or exchanging an identity token.
    /// Never written to the keyring.
    SessionToken {
        access_key_id: String,
        secret_access_key: SecretString,
        session_token: SecretString,
        expiration: Option<DateTime<Utc>>,
    },
    /// A long-lived key/secret pair with no expiration, typically operator-managed.
    LongLived {
        access_key_id: String,
        secret_access_key: SecretString,
    },
    /// A bearer token obtained via an OIDC exchange.
    OidcBearer {
        token: SecretString,
        expiration: Option<DateTime<Utc>>,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::SessionToken { expiration, .. } => f
                .debug_struct("SessionToken")
                .field("access_key_id", &"[REDACTED]")
                .field("expiration", expiration)
                .finish(),
            Credentials::LongLived { .. } => f
                .debug_struct("LongLived")
                .field("access_key_id", &"[REDACTED]")
                .finish(),
            Credentials::OidcBearer { expiration, .. } => f
                .debug_struct("OidcBearer")
                .field("expiration", expiration)
                .finish(),
        }
    }
}

impl CredentialBlob for Credentials {
    fn is_expired(&self) -> bool {
        match self.expiration() {
            Some(exp) => exp <= Utc::now(),
            None => false,
        }
    }

    fn expiration(&self) -> Option<DateTime<Utc>> {
        match self {
            Credentials::SessionToken { expiration, .. } => *expiration,
            Credentials::LongLived { .. } => None,
            Credentials::OidcBearer { expiration, .. } => *expiration,
        }
    }

    fn is_session_token(&self) -> bool {
        matches!(self, Credentials::SessionToken { .. })
    }

    fn validate(&self) -> bool {
        match self {
            Credentials::SessionToken { access_key_id, .. } => !access_key_id.is_empty(),
            Credentials::LongLived { access_key_id, .. } => !access_key_id.is_empty(),
            Credentials::OidcBearer { token, .. } => !token.is_empty(),
        }
    }

    fn build_whoami_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        match self {
            Credentials::SessionToken {
                access_key_id,
                expiration,
                ..
            } => {
                env.insert("ACCESS_KEY_ID".to_string(), access_key_id.clone());
                if let Some(exp) = expiration {
                    env.insert("CREDENTIAL_EXPIRATION".to_string(), exp.to_rfc3339());
                }
            }
            Credentials::LongLived { access_key_id, .. } => {
                env.insert("ACCESS_KEY_ID".to_string(), access_key_id.clone());
            }
            Credentials::OidcBearer { expiration, .. } => {
                if let Some(exp) = expiration {
                    env.insert("CREDENTIAL_EXPIRATION".to_string(), exp.to_rfc3339());
                }
            }
        }
        env
    }
}

/// A credential's freshness relative to the executor's 15-minute safety buffer.
pub const SAFETY_BUFFER_SECONDS: i64 = 15 * 60;

impl Credentials {
    /// True iff this credential has no expiration, or its expiration is far enough in
    /// the future to survive the chain executor's safety buffer.
    pub fn is_fresh(&self) -> bool {
        match self.expiration() {
            None => true,
            Some(exp) => exp > Utc::now() + chrono::Duration::seconds(SAFETY_BUFFER_SECONDS),
        }
    }
}

/// The public projection of a successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoamiInfo {
    pub provider: Option<String>,
    pub identity: String,
    pub last_updated: DateTime<Utc>,
    pub expiration: Option<DateTime<Utc>>,
    pub env: HashMap<String, String>,
}
