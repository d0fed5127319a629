//! Concrete [`CredentialStore`](crate::traits::CredentialStore) backends.
//!
//! Variants are interchangeable from the manager's point of view; no
//! backend-specific behavior leaks past the trait.

#[cfg(feature = "store-file")]
mod file;
#[cfg(feature = "store-keyring")]
mod keyring_store;
mod noop;

#[cfg(feature = "store-file")]
pub use file::FileStore;
#[cfg(feature = "store-keyring")]
pub use keyring_store::KeyringStore;
pub use noop::NoOpStore;
