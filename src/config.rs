//! Server configuration

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::auth::AuthManager;
use crate::queue::QueueManager;

/// Barbers that get a queue when none are configured.
pub const DEFAULT_BARBERS: &[&str] = &["junior", "yago", "reine"];

/// Configuration for the queue server, read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// SQLite database URL
    pub database_url: String,
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// HMAC secret for refresh tokens
    pub refresh_secret: String,
    /// Fallback staff credentials when the username is not in the store
    pub default_username: String,
    pub default_password: String,
    /// Barbers whose queues are served
    pub barbers: Vec<String>,
    /// How long a queued client survives before automatic removal
    pub queue_ttl: Duration,
}

impl AppConfig {
    /// Load configuration from the environment. Signing secrets are
    /// required; everything else has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3001)));

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://barbearia.sqlite".to_string());

        let access_secret = std::env::var("ACCESS_SECRET").context("ACCESS_SECRET not set")?;
        let refresh_secret = std::env::var("REFRESH_SECRET").context("REFRESH_SECRET not set")?;

        let default_username =
            std::env::var("DEFAULT_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let default_password =
            std::env::var("DEFAULT_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        let barbers = std::env::var("BARBERS")
            .map(|s| {
                s.split(',')
                    .map(|b| b.trim().to_lowercase())
                    .filter(|b| !b.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let barbers = if barbers.is_empty() {
            DEFAULT_BARBERS.iter().map(|b| b.to_string()).collect()
        } else {
            barbers
        };

        let queue_ttl = std::env::var("QUEUE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(780));

        Ok(Self {
            bind_addr,
            database_url,
            access_secret,
            refresh_secret,
            default_username,
            default_password,
            barbers,
            queue_ttl,
        })
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: Arc<AuthManager>,
    pub queues: Arc<QueueManager>,
}
