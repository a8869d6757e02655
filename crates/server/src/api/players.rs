//! Player roster handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scorer_core::{AuditEvent, NewPlayer, Player, PlayerRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::response::{not_found, roster_error, ApiError};
use crate::state::AppState;

/// Body for PUT /players/{id}. Omitted fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdatePlayerBody {
    pub name: Option<String>,
    pub role: Option<PlayerRole>,
}

#[derive(Debug, Serialize)]
pub struct PlayerListResponse {
    pub players: Vec<Player>,
    pub count: usize,
}

/// GET /api/v1/players
pub async fn list_players(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlayerListResponse>, ApiError> {
    let players = state.roster().list_players().map_err(roster_error)?;
    let count = players.len();
    Ok(Json(PlayerListResponse { players, count }))
}

/// POST /api/v1/players
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPlayer>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let player = state.roster().create_player(body).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::PlayerCreated {
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role.as_str().to_string(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(player)))
}

/// GET /api/v1/players/{id}
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    match state.roster().get_player(&id).map_err(roster_error)? {
        Some(player) => Ok(Json(player)),
        None => Err(not_found(format!("Player not found: {}", id))),
    }
}

/// PUT /api/v1/players/{id}
pub async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePlayerBody>,
) -> Result<Json<Player>, ApiError> {
    let current = state
        .roster()
        .get_player(&id)
        .map_err(roster_error)?
        .ok_or_else(|| not_found(format!("Player not found: {}", id)))?;

    let changed = Player {
        name: body.name.unwrap_or(current.name),
        role: body.role.unwrap_or(current.role),
        id,
    };
    let player = state.roster().update_player(&changed).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::PlayerUpdated {
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role.as_str().to_string(),
        })
        .await;

    Ok(Json(player))
}

/// DELETE /api/v1/players/{id}
///
/// Also drops the player from every team.
pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let player = state.roster().delete_player(&id).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::PlayerDeleted {
            player_id: player.id.clone(),
            name: player.name.clone(),
        })
        .await;

    Ok(Json(player))
}
