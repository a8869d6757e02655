//! Full backup and restore of rosters and matches.

use axum::{extract::State, Json};
use scorer_core::export::{backup, parse_backup, restore};
use scorer_core::{AuditEvent, Backup, RestoreSummary};
use std::sync::Arc;

use super::response::{export_error, ApiError};
use crate::state::AppState;

/// GET /api/v1/backup
pub async fn get_backup(State(state): State<Arc<AppState>>) -> Result<Json<Backup>, ApiError> {
    backup(state.roster(), state.matches())
        .map(Json)
        .map_err(export_error)
}

/// POST /api/v1/backup/restore
///
/// Adds whatever the file holds that is not already stored.
pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<RestoreSummary>, ApiError> {
    let data = parse_backup(&body).map_err(export_error)?;
    let summary = {
        let _guard = state.lock_scoring().await;
        restore(state.roster(), state.matches(), &data).map_err(export_error)?
    };

    state
        .audit()
        .emit(AuditEvent::BackupRestored {
            players_added: summary.players_added,
            teams_added: summary.teams_added,
            matches_added: summary.matches_added,
        })
        .await;

    Ok(Json(summary))
}
