//! Live scoring commands.
//!
//! Every command follows the same cycle under the scoring lock: load the
//! match, run the lifecycle check, apply the pure transition, store the
//! result (with the previous document on the undo history, for undoable
//! commands) and emit audit events.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scorer_core::scoring::derive::format_overs;
use scorer_core::scoring::{
    check_delivery, declare_innings, retire_batsman, select_next_bowler, start_innings,
    swap_batsmen, update_settings,
};
use scorer_core::{
    apply_delivery, metrics as core_metrics, AuditEvent, DeliveryEvent, Match, MatchSettings,
    MatchStatus,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::matches::load_match;
use super::response::{api_error, match_error, roster_error, scoring_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInningsBody {
    pub striker_id: String,
    pub non_striker_id: String,
    pub bowler_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectBowlerBody {
    pub bowler_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetireBody {
    pub retired_id: String,
    pub replacement_id: String,
    #[serde(default)]
    pub reason: String,
}

fn innings_number(m: &Match) -> u8 {
    if m.is_second_innings() {
        2
    } else {
        1
    }
}

/// Events for innings or the match ending between two versions of a match.
fn transition_events(previous: &Match, next: &Match) -> Vec<AuditEvent> {
    let mut events = Vec::new();

    if !previous.is_second_innings() && next.is_second_innings() {
        events.push(AuditEvent::InningsCompleted {
            match_id: next.id.clone(),
            innings: 1,
            score: next.inning1.score,
            wickets: next.inning1.wickets,
        });
    }

    if previous.status != MatchStatus::Finished && next.status == MatchStatus::Finished {
        let last = next.current_inning();
        events.push(AuditEvent::InningsCompleted {
            match_id: next.id.clone(),
            innings: innings_number(next),
            score: last.score,
            wickets: last.wickets,
        });
        events.push(AuditEvent::MatchFinished {
            match_id: next.id.clone(),
            winner_team_id: next.winner_team_id.clone(),
            result: next.result_text.clone().unwrap_or_default(),
        });
    }

    events
}

/// Store `next`, remembering `previous` for undo when asked to.
fn save(
    state: &AppState,
    previous: &Match,
    next: &Match,
    undoable: bool,
) -> Result<(), ApiError> {
    let store = state.matches();
    let saved = if undoable {
        store.update_with_history(previous, next, state.undo_depth())
    } else {
        store.update(next)
    };
    saved.map_err(match_error)
}

/// POST /api/v1/matches/{id}/start
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StartInningsBody>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    let next = start_innings(&m, &body.striker_id, &body.non_striker_id, &body.bowler_id)
        .map_err(scoring_error)?;
    save(&state, &m, &next, false)?;

    state
        .audit()
        .emit(AuditEvent::InningsStarted {
            match_id: id,
            innings: innings_number(&next),
            striker_id: body.striker_id,
            non_striker_id: body.non_striker_id,
            bowler_id: body.bowler_id,
        })
        .await;

    Ok(Json(next))
}

/// POST /api/v1/matches/{id}/deliveries
///
/// A delivery the processor refuses to apply leaves the match untouched and
/// is answered with 409.
pub async fn record_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(delivery): Json<DeliveryEvent>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    check_delivery(&m, &delivery).map_err(scoring_error)?;

    let teams = state.roster().list_teams().map_err(roster_error)?;
    let next = apply_delivery(&m, &delivery, &teams);
    if next == m {
        warn!(match_id = %id, ?delivery, "Delivery ignored");
        state
            .audit()
            .emit(AuditEvent::DeliveryIgnored {
                match_id: id,
                delivery,
            })
            .await;
        return Err(api_error(StatusCode::CONFLICT, "Delivery ignored"));
    }
    save(&state, &m, &next, true)?;

    // The innings the ball belonged to, even if it just closed
    let (innings, inning) = if m.is_second_innings() {
        (2, next.inning2.as_ref().unwrap_or(&next.inning1))
    } else {
        (1, &next.inning1)
    };
    let mut events = vec![AuditEvent::DeliveryRecorded {
        match_id: id,
        innings,
        delivery,
        score: inning.score,
        wickets: inning.wickets,
        overs: format_overs(inning.overs, inning.balls),
    }];
    events.extend(transition_events(&m, &next));
    state.audit().emit_all(events).await;

    Ok(Json(next))
}

/// POST /api/v1/matches/{id}/bowler
pub async fn select_bowler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SelectBowlerBody>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    let next = select_next_bowler(&m, &body.bowler_id).map_err(scoring_error)?;
    save(&state, &m, &next, false)?;

    state
        .audit()
        .emit(AuditEvent::BowlerChanged {
            match_id: id,
            bowler_id: body.bowler_id,
            over: next.current_inning().overs + 1,
        })
        .await;

    Ok(Json(next))
}

/// POST /api/v1/matches/{id}/swap
pub async fn swap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    let next = swap_batsmen(&m).map_err(scoring_error)?;
    save(&state, &m, &next, true)?;

    state
        .audit()
        .emit(AuditEvent::BatsmenSwapped {
            match_id: id,
            striker_id: next.current_inning().on_strike_batsman_id.clone(),
        })
        .await;

    Ok(Json(next))
}

/// POST /api/v1/matches/{id}/retire
pub async fn retire(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RetireBody>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    let next = retire_batsman(&m, &body.retired_id, &body.replacement_id, &body.reason)
        .map_err(scoring_error)?;
    save(&state, &m, &next, true)?;

    let reason = next
        .current_inning()
        .batsman_stats
        .get(&body.retired_id)
        .and_then(|s| s.retirement_reason.clone())
        .unwrap_or(body.reason);
    state
        .audit()
        .emit(AuditEvent::BatsmanRetired {
            match_id: id,
            retired_id: body.retired_id,
            replacement_id: body.replacement_id,
            reason,
        })
        .await;

    Ok(Json(next))
}

/// POST /api/v1/matches/{id}/declare
pub async fn declare(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    let teams = state.roster().list_teams().map_err(roster_error)?;
    let next = declare_innings(&m, &teams).map_err(scoring_error)?;
    save(&state, &m, &next, true)?;

    info!(match_id = %id, "Innings declared");
    let declared = m.current_inning();
    let mut events = vec![AuditEvent::InningsDeclared {
        match_id: id,
        innings: innings_number(&m),
        score: declared.score,
        wickets: declared.wickets,
    }];
    events.extend(transition_events(&m, &next));
    state.audit().emit_all(events).await;

    Ok(Json(next))
}

/// PUT /api/v1/matches/{id}/settings
///
/// The toss winner and decision always keep their recorded values.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(settings): Json<MatchSettings>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    let m = load_match(&state, &id)?;
    let next = update_settings(&m, &settings).map_err(scoring_error)?;
    save(&state, &m, &next, false)?;

    state
        .audit()
        .emit(AuditEvent::SettingsUpdated {
            match_id: id,
            overs: next.settings.overs,
            players_per_team: next.settings.players_per_team,
        })
        .await;

    Ok(Json(next))
}

/// POST /api/v1/matches/{id}/undo
pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Match>, ApiError> {
    let _guard = state.lock_scoring().await;
    // 404 for an unknown match rather than "nothing to undo"
    load_match(&state, &id)?;

    let previous = state
        .matches()
        .pop_history(&id)
        .map_err(match_error)?
        .ok_or_else(|| api_error(StatusCode::CONFLICT, "Nothing to undo"))?;
    state.matches().update(&previous).map_err(match_error)?;
    core_metrics::UNDO_OPERATIONS.inc();

    let remaining = state.matches().history_len(&id).map_err(match_error)?;
    state
        .audit()
        .emit(AuditEvent::UndoApplied {
            match_id: id,
            remaining,
        })
        .await;

    Ok(Json(previous))
}
