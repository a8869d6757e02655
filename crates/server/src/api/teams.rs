//! Team roster handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scorer_core::{AuditEvent, NewTeam, Team};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::response::{not_found, roster_error, ApiError};
use crate::state::AppState;

/// Body for PUT /teams/{id}. Omitted fields keep their value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamBody {
    pub name: Option<String>,
    pub player_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub teams: Vec<Team>,
    pub count: usize,
}

/// GET /api/v1/teams
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TeamListResponse>, ApiError> {
    let teams = state.roster().list_teams().map_err(roster_error)?;
    let count = teams.len();
    Ok(Json(TeamListResponse { teams, count }))
}

/// POST /api/v1/teams
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTeam>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = state.roster().create_team(body).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::TeamCreated {
            team_id: team.id.clone(),
            name: team.name.clone(),
            players: team.player_ids.len(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /api/v1/teams/{id}
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    match state.roster().get_team(&id).map_err(roster_error)? {
        Some(team) => Ok(Json(team)),
        None => Err(not_found(format!("Team not found: {}", id))),
    }
}

/// PUT /api/v1/teams/{id}
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTeamBody>,
) -> Result<Json<Team>, ApiError> {
    let current = state
        .roster()
        .get_team(&id)
        .map_err(roster_error)?
        .ok_or_else(|| not_found(format!("Team not found: {}", id)))?;

    let changed = Team {
        name: body.name.unwrap_or(current.name),
        player_ids: body.player_ids.unwrap_or(current.player_ids),
        id,
    };
    let team = state.roster().update_team(&changed).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::TeamUpdated {
            team_id: team.id.clone(),
            name: team.name.clone(),
            players: team.player_ids.len(),
        })
        .await;

    Ok(Json(team))
}

/// DELETE /api/v1/teams/{id}
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let team = state.roster().delete_team(&id).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::TeamDeleted {
            team_id: team.id.clone(),
            name: team.name.clone(),
        })
        .await;

    Ok(Json(team))
}
