use axum::{extract::State, Json};
use scorer_core::{aggregate, MatchFilter, MatchStatus, PlayerStats};
use serde::Serialize;
use std::sync::Arc;

use super::response::{match_error, roster_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub players: Vec<PlayerStats>,
    /// Finished matches folded into the figures
    pub matches: usize,
}

/// GET /api/v1/stats
///
/// Career figures across every finished match, most runs first.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let players = state.roster().list_players().map_err(roster_error)?;
    let finished = state
        .matches()
        .list(&MatchFilter::all().with_status(MatchStatus::Finished))
        .map_err(match_error)?;

    Ok(Json(StatsResponse {
        players: aggregate(&players, &finished),
        matches: finished.len(),
    }))
}
