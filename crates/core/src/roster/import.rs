//! Merging a tabular roster (player, team, role) into the store.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::{Player, PlayerRole, RosterError, RosterStore, Team};
use crate::metrics;

/// One data row of a roster sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub player: String,
    pub team: String,
    /// Raw role cell; `None` when the column is absent or the cell is blank.
    pub role: Option<String>,
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub players_created: usize,
    pub players_updated: usize,
    pub teams_created: usize,
    pub teams_updated: usize,
    pub rows_skipped: usize,
}

/// Parse roster CSV text. The header must name `player` and `team` columns
/// (any case); `role` is optional and other columns are ignored.
pub fn parse_roster_csv(text: &str) -> Result<Vec<RosterRow>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| RosterError::Validation(format!("Unreadable header row: {}", e)))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let (Some(player_col), Some(team_col)) = (column("player"), column("team")) else {
        return Err(RosterError::Validation(
            "Sheet header must contain 'player' and 'team' columns".to_string(),
        ));
    };
    let role_col = column("role");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| RosterError::Validation(format!("Malformed roster row: {}", e)))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        rows.push(RosterRow {
            player: cell(player_col),
            team: cell(team_col),
            role: role_col.map(cell).filter(|r| !r.is_empty()),
        });
    }

    if rows.is_empty() {
        return Err(RosterError::Validation(
            "Sheet is empty or contains only a header".to_string(),
        ));
    }
    Ok(rows)
}

/// Merge rows into the store without deleting anything.
///
/// Players and teams are matched by name ignoring case. A listed role
/// replaces the stored one (unrecognised roles become All-Rounder); a blank
/// role leaves an existing player's role alone. Team membership is the union
/// of what was stored and what the sheet lists.
pub fn import_roster(
    store: &dyn RosterStore,
    rows: &[RosterRow],
) -> Result<ImportSummary, RosterError> {
    let mut summary = ImportSummary::default();

    let mut players: Vec<(Player, Change)> = Vec::new();
    let mut player_index: HashMap<String, usize> = HashMap::new();
    for player in store.list_players()? {
        player_index.insert(name_key(&player.name), players.len());
        players.push((player, Change::None));
    }

    let mut teams: Vec<(Team, Change)> = Vec::new();
    let mut team_index: HashMap<String, usize> = HashMap::new();
    for team in store.list_teams()? {
        team_index.insert(name_key(&team.name), teams.len());
        teams.push((team, Change::None));
    }

    for row in rows {
        if row.player.is_empty() || row.team.is_empty() {
            summary.rows_skipped += 1;
            continue;
        }
        let role = row
            .role
            .as_deref()
            .map(|raw| PlayerRole::parse(raw).unwrap_or_default());

        let p = *player_index.entry(name_key(&row.player)).or_insert_with(|| {
            players.push((
                Player {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: row.player.clone(),
                    role: role.unwrap_or_default(),
                },
                Change::Created,
            ));
            players.len() - 1
        });
        let (player, change) = &mut players[p];
        if let Some(role) = role {
            if player.role != role {
                player.role = role;
                change.touch();
            }
        }
        let player_id = player.id.clone();

        let t = *team_index.entry(name_key(&row.team)).or_insert_with(|| {
            teams.push((
                Team {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: row.team.clone(),
                    player_ids: Vec::new(),
                },
                Change::Created,
            ));
            teams.len() - 1
        });
        let (team, change) = &mut teams[t];
        if !team.has_player(&player_id) {
            team.player_ids.push(player_id);
            change.touch();
        }
    }

    for (player, change) in &players {
        match change {
            Change::Created => {
                store.insert_player(player)?;
                summary.players_created += 1;
            }
            Change::Updated => {
                store.update_player(player)?;
                summary.players_updated += 1;
            }
            Change::None => {}
        }
    }
    for (team, change) in &teams {
        match change {
            Change::Created => {
                store.insert_team(team)?;
                summary.teams_created += 1;
            }
            Change::Updated => {
                store.update_team(team)?;
                summary.teams_updated += 1;
            }
            Change::None => {}
        }
    }

    let imported = rows.len() - summary.rows_skipped;
    metrics::ROSTER_ROWS_IMPORTED.inc_by(imported as u64);
    info!(
        rows = imported,
        skipped = summary.rows_skipped,
        players_created = summary.players_created,
        teams_created = summary.teams_created,
        "Imported roster"
    );
    Ok(summary)
}

/// Parse and merge in one step.
pub fn import_roster_csv(
    store: &dyn RosterStore,
    text: &str,
) -> Result<ImportSummary, RosterError> {
    let rows = parse_roster_csv(text)?;
    debug!(rows = rows.len(), "Parsed roster CSV");
    import_roster(store, &rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    None,
    Created,
    Updated,
}

impl Change {
    fn touch(&mut self) {
        if *self == Change::None {
            *self = Change::Updated;
        }
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
