//! Queue handlers
//!
//! Public group: join, leave, listing. Staff group (bearer gated):
//! serve-client, manual walk-in, listing. Both listings use the same
//! waiting-only semantics.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::queue::QueueEntry;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: Option<String>,
    pub barber: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub message: String,
    pub client_id: String,
    pub position: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdRequest {
    pub client_id: Option<String>,
}

// Staff walk-in request keeps the dashboard's wire field name.
#[derive(Debug, Deserialize)]
pub struct ManualAddRequest {
    pub nome: Option<String>,
    pub barber: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAddResponse {
    pub message: String,
    pub client_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /public/join-queue
pub async fn join_queue(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<(StatusCode, Json<JoinResponse>)> {
    info!("POST /public/join-queue");

    let (name, barber) = match (req.name.as_deref(), req.barber.as_deref()) {
        (Some(n), Some(b)) if !n.is_empty() && !b.is_empty() => (n, b),
        _ => {
            return Err(Error::Validation(
                "Name and barber are required.".to_string(),
            ))
        }
    };

    let receipt = state.queues.join(name, barber).await?;

    Ok((
        StatusCode::CREATED,
        Json(JoinResponse {
            message: "Client added to the queue.".to_string(),
            client_id: receipt.client_id,
            position: receipt.position,
        }),
    ))
}

/// POST /public/leave-queue
pub async fn leave_queue(
    State(state): State<AppState>,
    Json(req): Json<ClientIdRequest>,
) -> Result<Json<MessageResponse>> {
    info!("POST /public/leave-queue");

    let client_id = req
        .client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Validation("Client id is required.".to_string()))?;

    state.queues.remove(client_id).await?;

    Ok(Json(MessageResponse {
        message: "Client removed from the queue.".to_string(),
    }))
}

/// GET /public/queues and GET /barber/queues
pub async fn list_queues(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, Vec<QueueEntry>>> {
    info!("GET /queues");

    Json(state.queues.list_queues().await)
}

/// POST /barber/serve-client
pub async fn serve_client(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<ClientIdRequest>,
) -> Result<Json<MessageResponse>> {
    info!("POST /barber/serve-client by {}", ctx.username());

    let client_id = req
        .client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Validation("Client id is required.".to_string()))?;

    state.queues.remove(client_id).await?;

    Ok(Json(MessageResponse {
        message: "Client served.".to_string(),
    }))
}

/// POST /barber/adicionar-cliente-manual
pub async fn add_manual_client(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<ManualAddRequest>,
) -> Result<(StatusCode, Json<ManualAddResponse>)> {
    info!("POST /barber/adicionar-cliente-manual by {}", ctx.username());

    let (nome, barber) = match (req.nome.as_deref(), req.barber.as_deref()) {
        (Some(n), Some(b)) if !n.is_empty() && !b.is_empty() => (n, b),
        _ => {
            return Err(Error::Validation(
                "Name and barber are required.".to_string(),
            ))
        }
    };

    let client_id = state.queues.add_manual(nome, barber).await?;

    Ok((
        StatusCode::CREATED,
        Json(ManualAddResponse {
            message: "Client added manually.".to_string(),
            client_id,
        }),
    ))
}
