//! Encrypted-at-rest... actually plain-JSON-at-rest file backend for headless or
//! containerized environments where no OS keyring is available.
//!
//! Each alias becomes one file under `base_dir`, written atomically
//! (temp-file-then-rename) so a crash mid-write never leaves a half-written entry.

use crate::credential::Credentials;
use crate::error::StoreError;
use crate::traits::CredentialStore;
use async_trait::async_trait;
use atomicwrites::{AllowOverwrite, AtomicFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const BACKEND: &str = "file";

pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, alias: &str) -> PathBuf {
        self.base_dir.join(format!("{alias}.json"))
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    #[instrument(skip(self, credentials), fields(alias, backend = BACKEND))]
    async fn store(&self, alias: &str, credentials: &Credentials) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(credentials).map_err(|e| StoreError::Serialization {
            alias: alias.to_string(),
            message: e.to_string(),
        })?;
        let path = self.path_for(alias);
        let alias_owned = alias.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&path, &payload))
            .await
            .map_err(|e| StoreError::Io {
                alias: alias_owned.clone(),
                backend: BACKEND,
                message: e.to_string(),
            })?
            .map_err(|e| StoreError::Io {
                alias: alias_owned,
                backend: BACKEND,
                message: e.to_string(),
            })?;
        debug!("stored credentials to file");
        Ok(())
    }

    #[instrument(skip(self), fields(alias, backend = BACKEND))]
    async fn retrieve(&self, alias: &str) -> Result<Credentials, StoreError> {
        let path = self.path_for(alias);
        let alias_owned = alias.to_string();
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    alias: alias_owned.clone(),
                    backend: BACKEND,
                }
            } else {
                StoreError::Io {
                    alias: alias_owned.clone(),
                    backend: BACKEND,
                    message: e.to_string(),
                }
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
            alias: alias.to_string(),
            message: e.to_string(),
        })
    }

    #[instrument(skip(self), fields(alias, backend = BACKEND))]
    async fn delete(&self, alias: &str) -> Result<(), StoreError> {
        let path = self.path_for(alias);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                alias: alias.to_string(),
                backend: BACKEND,
                message: e.to_string(),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        BACKEND
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let af = AtomicFile::new(path, AllowOverwrite);
    af.write(|f| f.write_all(bytes))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(io) => io,
            atomicwrites::Error::User(io) => io,
        })
}
