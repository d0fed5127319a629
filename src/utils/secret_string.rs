//! Secret string type with automatic zeroization
//!
//! Provides [`SecretString`] with controlled access via closure API
//! to prevent accidental secret copying and automatic memory zeroization.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret string with automatic memory zeroization
///
/// Secrets are never exposed directly - they must be accessed within
/// a closure scope using [`expose_secret`] to prevent accidental copying.
/// Memory is automatically zeroed when the value is dropped.
///
/// [`expose_secret`]: SecretString::expose_secret
///
/// # Examples
///
/// ```
/// use stackauth_core::utils::SecretString;
///
/// let secret = SecretString::new("my-api-key");
///
/// // Access secret within closure
/// secret.expose_secret(|value| {
///     println!("Secret length: {}", value.len());
///     // Use value here - cannot escape closure scope
/// });
///
/// // Secret is redacted in debug/display output
/// println!("{:?}", secret); // Prints: [REDACTED]
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Creates a new secret from any string-like value
    ///
    /// # Examples
    ///
    /// ```
    /// use stackauth_core::utils::SecretString;
    ///
    /// let secret = SecretString::new("my-password");
    /// let from_string = SecretString::new(String::from("another-password"));
    /// ```
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self { inner: s.into() }
    }

    /// Accesses secret value within a closure scope
    ///
    /// This prevents accidental copying or leaking of the secret.
    /// The secret value cannot escape the closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackauth_core::utils::SecretString;
    ///
    /// let secret = SecretString::new("password");
    /// let len = secret.expose_secret(|s| s.len());
    /// assert_eq!(len, 8);
    ///
    /// // Cannot return &str - won't compile
    /// // let leaked = secret.expose_secret(|s| s); // ERROR: doesn't outlive closure
    /// ```
    pub fn expose_secret<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        f(&self.inner)
    }

    /// Returns the length without exposing content
    ///
    /// # Examples
    ///
    /// ```
    /// use stackauth_core::utils::SecretString;
    ///
    /// let secret = SecretString::new("12345");
    /// assert_eq!(secret.len(), 5);
    /// ```
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if empty without exposing content
    ///
    /// # Examples
    ///
    /// ```
    /// use stackauth_core::utils::SecretString;
    ///
    /// let empty = SecretString::new("");
    /// assert!(empty.is_empty());
    ///
    /// let not_empty = SecretString::new("x");
    /// assert!(!not_empty.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// Prevent accidental secret leakage via Debug/Display
impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// Serialize/deserialize carry the real secret so store round trips survive; the
// redaction lives in Debug/Display only, which nothing persistence-facing calls.
impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}
