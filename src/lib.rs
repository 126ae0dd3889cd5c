//! Barbershop Wait-Queue Server
//!
//! HTTP backend for named barber wait queues: clients join a queue, see
//! their position, leave; staff mark clients as served or add walk-ins.
//! Staff routes are gated by short-lived signed tokens with refresh
//! rotation. Persistence is delegated to a relational store.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod queue;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use auth::{AuthManager, InMemoryTokenStore};
use config::{AppConfig, AppState};
use queue::QueueManager;
use store::QueueStore;

/// Connect the store and build the shared state.
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = Arc::new(QueueStore::connect(&config.database_url).await?);

    let token_store = Arc::new(InMemoryTokenStore::new());
    let auth = Arc::new(AuthManager::new(store.clone(), token_store, &config));

    let queues = Arc::new(QueueManager::new(
        store.clone(),
        config.barbers.clone(),
        config.queue_ttl,
    ));

    Ok(AppState {
        config,
        auth,
        queues,
    })
}

/// Build the full router: public auth and queue groups, bearer-gated staff
/// group, health check, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::handlers::login))
        .route("/refresh", post(auth::handlers::refresh))
        .route("/logout", post(auth::handlers::logout));

    let public_routes = Router::new()
        .route("/join-queue", post(queue::handlers::join_queue))
        .route("/leave-queue", post(queue::handlers::leave_queue))
        .route("/queues", get(queue::handlers::list_queues));

    let staff_routes = Router::new()
        .route("/serve-client", post(queue::handlers::serve_client))
        .route(
            "/adicionar-cliente-manual",
            post(queue::handlers::add_manual_client),
        )
        .route("/queues", get(queue::handlers::list_queues))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::mw_require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .nest("/public", public_routes)
        .nest("/barber", staff_routes)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = AppConfig::from_env()?;
    info!("=== Barbearia Queue Server ===");
    info!("Database: {}", config.database_url);
    info!("Barbers: {:?}", config.barbers);
    info!("Queue TTL: {:?}", config.queue_ttl);

    let addr = config.bind_addr;
    let state = build_state(config).await?;
    let app = app(state);

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
