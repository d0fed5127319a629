//! Validated name newtypes for providers and identities.
//!
//! Both wrap a plain string under the same validation rule (config map keys:
//! non-empty, no whitespace, no path-separator characters) but are kept as
//! distinct types so a provider name can never be passed where an identity
//! name is expected, and vice versa.

use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_NAME_LENGTH: usize = 255;

fn validate(kind: &'static str, s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err(format!("{kind} name must not be empty"));
    }
    if s.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "{kind} name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    if !s
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(format!(
            "{kind} name contains invalid characters (only alphanumeric, '-', '_', '.' allowed)"
        ));
    }
    Ok(())
}

macro_rules! validated_name {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validates and wraps `s` as a
            #[doc = $kind]
            /// name.
            pub fn new(s: impl Into<String>) -> Result<Self, String> {
                let s = s.into();
                validate($kind, &s)?;
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Lowercased form, used as the key into an `IdentityCaseMap`.
            pub fn to_lowercase(&self) -> String {
                self.0.to_lowercase()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for String {
            fn from(n: $name) -> Self {
                n.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                $name::new(s)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

validated_name!(ProviderName, "provider");
validated_name!(IdentityName, "identity");
validated_name!(IntegrationName, "integration");
