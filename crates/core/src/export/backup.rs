use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::ExportError;
use crate::matches::{MatchFilter, MatchStore};
use crate::roster::{Player, RosterStore, Team};
use crate::scoring::Match;

/// Everything the scorer knows, as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
}

/// Outcome of a non-destructive import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub players_added: usize,
    pub players_skipped: usize,
    pub teams_added: usize,
    pub teams_skipped: usize,
    pub matches_added: usize,
    pub matches_skipped: usize,
}

pub fn backup(roster: &dyn RosterStore, matches: &dyn MatchStore) -> Result<Backup, ExportError> {
    Ok(Backup {
        players: roster.list_players()?,
        teams: roster.list_teams()?,
        matches: matches.list(&MatchFilter::all())?,
    })
}

/// Parse a backup file. All three sections must be present.
pub fn parse_backup(json: &str) -> Result<Backup, ExportError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ExportError::InvalidJson(e.to_string()))?;
    let complete = ["players", "teams", "matches"]
        .iter()
        .all(|section| value.get(section).is_some_and(|v| !v.is_null()));
    if !complete {
        return Err(ExportError::MissingSections);
    }
    serde_json::from_value(value).map_err(|e| ExportError::InvalidJson(e.to_string()))
}

/// Add whatever the backup holds that the stores don't. Nothing is overwritten.
pub fn restore(
    roster: &dyn RosterStore,
    matches: &dyn MatchStore,
    data: &Backup,
) -> Result<RestoreSummary, ExportError> {
    let summary = merge(roster, matches, &data.players, &data.teams, &data.matches)?;
    info!(
        players = summary.players_added,
        teams = summary.teams_added,
        matches = summary.matches_added,
        "Restored backup"
    );
    Ok(summary)
}

/// Players and teams are skipped when one with the same name (ignoring case)
/// or id exists; matches are skipped when the id exists.
pub(super) fn merge(
    roster: &dyn RosterStore,
    store: &dyn MatchStore,
    players: &[Player],
    teams: &[Team],
    matches: &[Match],
) -> Result<RestoreSummary, ExportError> {
    let mut summary = RestoreSummary::default();

    let existing = roster.list_players()?;
    let mut names: HashSet<String> = existing.iter().map(|p| name_key(&p.name)).collect();
    let mut ids: HashSet<String> = existing.into_iter().map(|p| p.id).collect();
    for player in players {
        if names.contains(&name_key(&player.name)) || ids.contains(&player.id) {
            summary.players_skipped += 1;
            continue;
        }
        roster.insert_player(player)?;
        names.insert(name_key(&player.name));
        ids.insert(player.id.clone());
        summary.players_added += 1;
    }

    let existing = roster.list_teams()?;
    let mut names: HashSet<String> = existing.iter().map(|t| name_key(&t.name)).collect();
    let mut ids: HashSet<String> = existing.into_iter().map(|t| t.id).collect();
    for team in teams {
        if names.contains(&name_key(&team.name)) || ids.contains(&team.id) {
            summary.teams_skipped += 1;
            continue;
        }
        roster.insert_team(team)?;
        names.insert(name_key(&team.name));
        ids.insert(team.id.clone());
        summary.teams_added += 1;
    }

    for m in matches {
        if store.get(&m.id)?.is_some() {
            debug!(match_id = %m.id, "Skipping match that already exists");
            summary.matches_skipped += 1;
            continue;
        }
        store.create(m)?;
        summary.matches_added += 1;
    }

    Ok(summary)
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::SqliteMatchStore;
    use crate::roster::{NewPlayer, PlayerRole, SqliteRosterStore};
    use crate::testing::fixtures;

    fn stores() -> (SqliteRosterStore, SqliteMatchStore) {
        (
            SqliteRosterStore::in_memory().unwrap(),
            SqliteMatchStore::in_memory().unwrap(),
        )
    }

    fn sample_backup() -> Backup {
        Backup {
            players: fixtures::players(2),
            teams: fixtures::teams(2),
            matches: vec![fixtures::started_match(6, 2)],
        }
    }

    #[test]
    fn test_parse_backup_requires_every_section() {
        let err = parse_backup(r#"{"players": [], "teams": []}"#).unwrap_err();
        assert!(matches!(err, ExportError::MissingSections));

        let err = parse_backup("not json").unwrap_err();
        assert!(matches!(err, ExportError::InvalidJson(_)));

        let empty = parse_backup(r#"{"players": [], "teams": [], "matches": []}"#).unwrap();
        assert!(empty.players.is_empty());
    }

    #[test]
    fn test_backup_then_restore_into_empty_stores() {
        let (roster, matches) = stores();
        let data = sample_backup();
        let summary = restore(&roster, &matches, &data).unwrap();
        assert_eq!(summary.players_added, 4);
        assert_eq!(summary.teams_added, 2);
        assert_eq!(summary.matches_added, 1);

        let round_trip = backup(&roster, &matches).unwrap();
        assert_eq!(round_trip.matches, data.matches);
        assert_eq!(round_trip.players.len(), 4);

        let json = serde_json::to_string(&round_trip).unwrap();
        assert_eq!(parse_backup(&json).unwrap(), round_trip);
    }

    #[test]
    fn test_restore_is_non_destructive() {
        let (roster, matches) = stores();
        let local = roster
            .create_player(NewPlayer {
                name: "BATTER 1".to_string(),
                role: PlayerRole::Bowler,
            })
            .unwrap();

        let data = sample_backup();
        let first = restore(&roster, &matches, &data).unwrap();
        assert_eq!(first.players_skipped, 1);
        assert_eq!(first.players_added, 3);

        // The local player keeps its id and role
        let kept = roster.find_player_by_name("Batter 1").unwrap().unwrap();
        assert_eq!(kept, local);

        let second = restore(&roster, &matches, &data).unwrap();
        assert_eq!(second.players_added, 0);
        assert_eq!(second.teams_skipped, 2);
        assert_eq!(second.matches_skipped, 1);
    }
}
