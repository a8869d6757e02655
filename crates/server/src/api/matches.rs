//! Match handlers: creation, listing, scorecards and match files.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use scorer_core::export::{export_match, import_match};
use scorer_core::scoring::derive::Scorecard;
use scorer_core::scoring::{create_match, RebowlRule, TossDecision};
use scorer_core::{
    AuditEvent, Match, MatchBundle, MatchFilter, MatchSettings, MatchStatus, RestoreSummary, Team,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::response::{
    bad_request, export_error, match_error, not_found, roster_error, scoring_error, ApiError,
};
use crate::state::AppState;

/// Maximum allowed limit for match queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for match queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body for POST /matches
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchBody {
    pub team_a_id: String,
    pub team_b_id: String,
    pub team_a_players: Vec<String>,
    pub team_b_players: Vec<String>,
    pub overs: u32,
    pub players_per_team: u32,
    pub toss_winner_team_id: String,
    pub decision: TossDecision,
    #[serde(default)]
    pub wide_rule: RebowlRule,
    #[serde(default)]
    pub no_ball_rule: RebowlRule,
    /// Falls back to `scoring.default_wide_runs`
    pub wide_runs: Option<u32>,
    /// Falls back to `scoring.default_no_ball_runs`
    pub no_ball_runs: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListMatchesParams {
    /// "Upcoming", "In Progress" or "Finished"
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListMatchesResponse {
    pub matches: Vec<Match>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct ImportMatchResponse {
    #[serde(rename = "match")]
    pub match_data: Match,
    pub summary: RestoreSummary,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/matches
///
/// Both teams must exist and every selected player must belong to the side
/// they are picked for.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateMatchBody>,
) -> Result<(StatusCode, Json<Match>), ApiError> {
    for (team_id, squad) in [
        (&body.team_a_id, &body.team_a_players),
        (&body.team_b_id, &body.team_b_players),
    ] {
        let team = load_team(&state, team_id)?;
        if let Some(outsider) = squad.iter().find(|id| !team.has_player(id)) {
            return Err(bad_request(format!(
                "Player {} is not in team {}",
                outsider, team.name
            )));
        }
    }

    let defaults = &state.config().scoring;
    let settings = MatchSettings::new(
        body.overs,
        body.players_per_team,
        body.toss_winner_team_id,
        body.decision,
    )
    .with_wide_rule(body.wide_rule)
    .with_no_ball_rule(body.no_ball_rule)
    .with_penalties(
        body.wide_runs.unwrap_or(defaults.default_wide_runs),
        body.no_ball_runs.unwrap_or(defaults.default_no_ball_runs),
    );

    let m = create_match(
        uuid::Uuid::new_v4().to_string(),
        settings,
        &body.team_a_id,
        &body.team_b_id,
        body.team_a_players,
        body.team_b_players,
    )
    .map_err(scoring_error)?;
    state.matches().create(&m).map_err(match_error)?;

    state
        .audit()
        .emit(AuditEvent::MatchCreated {
            match_id: m.id.clone(),
            team_a_id: m.team_a_id.clone(),
            team_b_id: m.team_b_id.clone(),
            overs: m.settings.overs,
            players_per_team: m.settings.players_per_team,
        })
        .await;

    Ok((StatusCode::CREATED, Json(m)))
}

/// GET /api/v1/matches
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMatchesParams>,
) -> Result<Json<ListMatchesResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = MatchFilter::new().with_limit(limit).with_offset(offset);
    if let Some(ref status) = params.status {
        let status = MatchStatus::parse(status)
            .ok_or_else(|| bad_request(format!("Unknown match status: {}", status)))?;
        filter = filter.with_status(status);
    }

    let matches = state.matches().list(&filter).map_err(match_error)?;
    let total = state.matches().count(&filter).map_err(match_error)?;

    Ok(Json(ListMatchesResponse {
        matches,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/matches/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Match>, ApiError> {
    load_match(&state, &id).map(Json)
}

/// DELETE /api/v1/matches/{id}
///
/// Drops the match and its undo history.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = state.matches().delete(&id).map_err(match_error)?;

    state
        .audit()
        .emit(AuditEvent::MatchDeleted {
            match_id: m.id.clone(),
        })
        .await;

    Ok(Json(m))
}

/// GET /api/v1/matches/{id}/scorecard
pub async fn scorecard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Scorecard>, ApiError> {
    let m = load_match(&state, &id)?;
    let players = state.roster().list_players().map_err(roster_error)?;
    let teams = state.roster().list_teams().map_err(roster_error)?;
    Ok(Json(Scorecard::build(&m, &players, &teams)))
}

/// GET /api/v1/matches/{id}/export
pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MatchBundle>, ApiError> {
    export_match(state.roster(), state.matches(), &id)
        .map(Json)
        .map_err(export_error)
}

/// POST /api/v1/matches/import
///
/// Accepts an export bundle or a bare match document.
pub async fn import(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportMatchResponse>, ApiError> {
    let (match_data, summary) =
        import_match(state.roster(), state.matches(), &body).map_err(export_error)?;

    state
        .audit()
        .emit(AuditEvent::MatchImported {
            match_id: match_data.id.clone(),
            added: summary.matches_added == 1,
        })
        .await;

    Ok(Json(ImportMatchResponse {
        match_data,
        summary,
    }))
}

pub(super) fn load_match(state: &AppState, id: &str) -> Result<Match, ApiError> {
    state
        .matches()
        .get(id)
        .map_err(match_error)?
        .ok_or_else(|| not_found(format!("Match not found: {}", id)))
}

fn load_team(state: &AppState, id: &str) -> Result<Team, ApiError> {
    state
        .roster()
        .get_team(id)
        .map_err(roster_error)?
        .ok_or_else(|| bad_request(format!("Unknown team id: {}", id)))
}
