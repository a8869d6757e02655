//! Bulk roster import from CSV text or a published Google Sheet.

use axum::{extract::State, Json};
use scorer_core::roster::{import_roster, parse_roster_csv};
use scorer_core::{AuditEvent, ImportSummary};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::response::{roster_error, sheet_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SheetImportBody {
    pub url: String,
    /// Tab to read (default "Sheet1")
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

/// POST /api/v1/roster/import
///
/// Body is the CSV text itself, with `player`, `team` and optional `role`
/// columns.
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportSummary>, ApiError> {
    merge_csv(&state, "csv", &body).await.map(Json)
}

/// POST /api/v1/roster/import/sheet
pub async fn import_sheet(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SheetImportBody>,
) -> Result<Json<ImportSummary>, ApiError> {
    info!(url = %body.url, sheet = %body.sheet_name, "Importing roster from sheet");
    let csv = state
        .sheets()
        .fetch_csv(&body.url, &body.sheet_name)
        .await
        .map_err(sheet_error)?;
    merge_csv(&state, &body.url, &csv).await.map(Json)
}

async fn merge_csv(state: &AppState, source: &str, csv: &str) -> Result<ImportSummary, ApiError> {
    let rows = parse_roster_csv(csv).map_err(roster_error)?;
    let summary = import_roster(state.roster(), &rows).map_err(roster_error)?;

    state
        .audit()
        .emit(AuditEvent::RosterImported {
            source: source.to_string(),
            rows: rows.len(),
            players_created: summary.players_created,
            players_updated: summary.players_updated,
            teams_created: summary.teams_created,
            teams_updated: summary.teams_updated,
        })
        .await;

    Ok(summary)
}
