//! Exercises the credential loader's session-token persistence policy directly
//! against the file store backend: a session token must never be written to
//! durable storage, while a long-lived credential is cached normally.

use chrono::{Duration, Utc};
use stackauth_core::prelude::*;
use stackauth_core::utils::SecretString;

fn session_token() -> Credentials {
    Credentials::SessionToken {
        access_key_id: "ASIA-SESSION".to_string(),
        secret_access_key: SecretString::new("shh"),
        session_token: SecretString::new("tok"),
        expiration: Some(Utc::now() + Duration::hours(1)),
    }
}

fn long_lived() -> Credentials {
    Credentials::LongLived {
        access_key_id: "AKIA-LONG".to_string(),
        secret_access_key: SecretString::new("shh"),
    }
}

async fn make_loader(dir: &std::path::Path) -> (stackauth_core::store::FileStore, CredentialLoader) {
    let store = stackauth_core::store::FileStore::new(dir);
    let store_arc: std::sync::Arc<dyn CredentialStore> = std::sync::Arc::new(
        stackauth_core::store::FileStore::new(dir),
    );
    let loader = CredentialLoader::new(store_arc, Realm::none());
    (store, loader)
}

#[tokio::test]
async fn session_token_is_never_persisted_to_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let (store, loader) = make_loader(dir.path()).await;

    loader.store("prod-admin", &session_token()).await.unwrap();

    let err = store.retrieve("prod-admin").await.unwrap_err();
    assert!(matches!(err, stackauth_core::error::StoreError::NotFound { .. }));
}

#[tokio::test]
async fn long_lived_credential_is_persisted_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let (_store, loader) = make_loader(dir.path()).await;

    loader.store("prod-admin", &long_lived()).await.unwrap();

    let reloaded = loader
        .load("prod-admin", None, &AuthContext::non_interactive())
        .await
        .unwrap();
    match reloaded {
        Credentials::LongLived { access_key_id, .. } => assert_eq!(access_key_id, "AKIA-LONG"),
        _ => panic!("expected LongLived"),
    }
}
