//! Login, refresh rotation, and token rejection behavior.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use barbearia_server::auth::{AuthManager, Claims, InMemoryTokenStore, TokenStore};
use barbearia_server::config::AppConfig;
use barbearia_server::error::Error;
use barbearia_server::store::QueueStore;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::tempdir;

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url,
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        default_username: "admin".to_string(),
        default_password: "admin-pass".to_string(),
        barbers: vec!["junior".to_string()],
        queue_ttl: Duration::from_secs(780),
    }
}

async fn setup() -> (tempfile::TempDir, Arc<InMemoryTokenStore>, AuthManager, Arc<QueueStore>) {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}/auth.sqlite", dir.path().display());
    let store = Arc::new(QueueStore::connect(&url).await.unwrap());

    let tokens = Arc::new(InMemoryTokenStore::new());
    let config = test_config(url);
    let auth = AuthManager::new(store.clone(), tokens.clone(), &config);

    (dir, tokens, auth, store)
}

#[tokio::test]
async fn default_credentials_login_when_user_absent() {
    let (_dir, _tokens, auth, _store) = setup().await;

    let pair = auth.login("admin", "admin-pass").await.unwrap();
    let claims = auth.verify_access(&pair.access_token).unwrap();
    assert_eq!(claims.username, "admin");

    let err = auth.login("admin", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::LoginFail));
}

#[tokio::test]
async fn stored_credential_login_uses_bcrypt() {
    let (_dir, _tokens, auth, store) = setup().await;

    let hash = bcrypt::hash("s3cret", 4).unwrap();
    store.insert_credential("yago", &hash).await.unwrap();

    let pair = auth.login("yago", "s3cret").await.unwrap();
    let claims = auth.verify_access(&pair.access_token).unwrap();
    assert_eq!(claims.username, "yago");

    let err = auth.login("yago", "not-the-password").await.unwrap_err();
    assert!(matches!(err, Error::LoginFail));

    // A stored user never falls back to the default pair.
    let err = auth.login("yago", "admin-pass").await.unwrap_err();
    assert!(matches!(err, Error::LoginFail));
}

#[tokio::test]
async fn refresh_rotation_invalidates_old_token() {
    let (_dir, _tokens, auth, _store) = setup().await;

    let first = auth.login("admin", "admin-pass").await.unwrap();

    let second = auth.refresh(&first.refresh_token).unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    // The used token must be rejected on a second refresh.
    let err = auth.refresh(&first.refresh_token).unwrap_err();
    assert!(matches!(err, Error::RefreshTokenInvalid));

    // The rotated token keeps working.
    auth.refresh(&second.refresh_token).unwrap();
}

#[tokio::test]
async fn refresh_rejects_foreign_signature() {
    let (_dir, tokens, auth, _store) = setup().await;

    let claims = Claims {
        username: "admin".to_string(),
        exp: (Utc::now() + chrono::Duration::hours(20)).timestamp(),
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    // Even a token present in the store fails signature verification.
    tokens.insert(forged.clone());
    let err = auth.refresh(&forged).unwrap_err();
    assert!(matches!(err, Error::RefreshTokenInvalid));
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let (_dir, _tokens, auth, _store) = setup().await;

    let claims = Claims {
        username: "admin".to_string(),
        exp: (Utc::now() - chrono::Duration::hours(2)).timestamp(),
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-access-secret"),
    )
    .unwrap();

    let err = auth.verify_access(&expired).unwrap_err();
    assert!(matches!(err, Error::AuthFailTokenInvalid));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (_dir, _tokens, auth, _store) = setup().await;

    let pair = auth.login("admin", "admin-pass").await.unwrap();

    auth.logout(&pair.refresh_token);
    auth.logout(&pair.refresh_token);
    auth.logout("never-issued");

    let err = auth.refresh(&pair.refresh_token).unwrap_err();
    assert!(matches!(err, Error::RefreshTokenInvalid));
}
