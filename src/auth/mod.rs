//! Token service
//!
//! Issues and validates the signed tokens that gate the staff surface.
//! Access tokens live one hour, refresh tokens twenty; both carry the staff
//! username as the sole claim. Refresh tokens are tracked in a [`TokenStore`]
//! and rotated on every use.

pub mod handlers;
pub mod middleware;
pub mod token_store;

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::store::QueueStore;
pub use token_store::{InMemoryTokenStore, TokenStore};

const ACCESS_TTL_HOURS: i64 = 1;
const REFRESH_TTL_HOURS: i64 = 20;

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub exp: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthManager {
    store: Arc<QueueStore>,
    tokens: Arc<dyn TokenStore>,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    default_username: String,
    default_password: String,
}

impl AuthManager {
    pub fn new(store: Arc<QueueStore>, tokens: Arc<dyn TokenStore>, config: &AppConfig) -> Self {
        Self {
            store,
            tokens,
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            default_username: config.default_username.clone(),
            default_password: config.default_password.clone(),
        }
    }

    /// Verify staff credentials and issue a token pair.
    ///
    /// Credentials come from the `barbers` table; a username missing there
    /// falls back to the statically configured default pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let credential = self
            .store
            .find_credential(username)
            .await
            .map_err(|e| Error::store("Error looking up user.", e))?;

        match credential {
            Some(credential) => {
                let valid = bcrypt::verify(password, &credential.password_hash)
                    .map_err(|e| Error::Internal(format!("Password verification failed: {e}")))?;
                if !valid {
                    warn!("[Auth] Failed login attempt for {}", username);
                    return Err(Error::LoginFail);
                }
                info!("[Auth] Staff logged in: {}", credential.username);
                self.issue_pair(&credential.username)
            }
            None => {
                if username == self.default_username && password == self.default_password {
                    info!("[Auth] Default credentials login: {}", username);
                    self.issue_pair(username)
                } else {
                    warn!("[Auth] Unknown user or bad credentials: {}", username);
                    Err(Error::LoginFail)
                }
            }
        }
    }

    /// Rotate a refresh token: the old one becomes invalid, a new pair is
    /// issued. Fails if the token is unknown, expired, or badly signed.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        if !self.tokens.contains(refresh_token) {
            return Err(Error::RefreshTokenInvalid);
        }

        let claims = decode::<Claims>(
            refresh_token,
            &self.refresh_decoding,
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("[Auth] Refresh token verification failed: {}", e);
            Error::RefreshTokenInvalid
        })?
        .claims;

        // Remove-then-insert; a concurrent refresh of the same token loses.
        if !self.tokens.remove(refresh_token) {
            return Err(Error::RefreshTokenInvalid);
        }

        info!("[Auth] Refresh token rotated for {}", claims.username);
        self.issue_pair(&claims.username)
    }

    /// Drop a refresh token. Idempotent: logging out an unknown token is
    /// still a success.
    pub fn logout(&self, refresh_token: &str) {
        self.tokens.remove(refresh_token);
        info!("[Auth] Logout");
    }

    /// Validate a bearer access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("[Auth] Access token verification failed: {}", e);
                Error::AuthFailTokenInvalid
            })
    }

    fn issue_pair(&self, username: &str) -> Result<TokenPair> {
        let access_claims = Claims {
            username: username.to_string(),
            exp: (Utc::now() + Duration::hours(ACCESS_TTL_HOURS)).timestamp(),
        };
        let refresh_claims = Claims {
            username: username.to_string(),
            exp: (Utc::now() + Duration::hours(REFRESH_TTL_HOURS)).timestamp(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign access token: {e}")))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign refresh token: {e}")))?;

        self.tokens.insert(refresh_token.clone());

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
