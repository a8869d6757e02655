use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::backup::{merge, RestoreSummary};
use super::ExportError;
use crate::matches::MatchStore;
use crate::roster::{Player, RosterStore, Team};
use crate::scoring::Match;

/// Fields a match document must carry to be importable.
const REQUIRED_MATCH_FIELDS: [&str; 5] = ["id", "settings", "inning1", "teamAId", "teamBId"];

/// A single match plus the players and teams needed to display it elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBundle {
    pub match_data: Match,
    pub players_data: Vec<Player>,
    pub teams_data: Vec<Team>,
}

/// Bundle a stored match with both squads and both teams.
pub fn export_match(
    roster: &dyn RosterStore,
    matches: &dyn MatchStore,
    match_id: &str,
) -> Result<MatchBundle, ExportError> {
    let m = matches
        .get(match_id)?
        .ok_or_else(|| ExportError::MatchNotFound(match_id.to_string()))?;

    let mut players_data = Vec::new();
    for id in m.all_players() {
        if let Some(player) = roster.get_player(id)? {
            players_data.push(player);
        }
    }
    let mut teams_data = Vec::new();
    for id in [&m.team_a_id, &m.team_b_id] {
        if let Some(team) = roster.get_team(id)? {
            teams_data.push(team);
        }
    }

    Ok(MatchBundle {
        match_data: m,
        players_data,
        teams_data,
    })
}

/// Read either an export bundle or a bare match document.
///
/// A bare match comes back with empty player and team lists.
pub fn parse_match_import(json: &str) -> Result<MatchBundle, ExportError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ExportError::InvalidJson(e.to_string()))?;

    let is_bundle = ["matchData", "playersData", "teamsData"]
        .iter()
        .all(|key| value.get(key).is_some_and(|v| !v.is_null()));

    let (match_value, players, teams) = if is_bundle {
        (
            value["matchData"].clone(),
            value["playersData"].clone(),
            value["teamsData"].clone(),
        )
    } else {
        (value, Value::Array(Vec::new()), Value::Array(Vec::new()))
    };

    let missing: Vec<&'static str> = REQUIRED_MATCH_FIELDS
        .into_iter()
        .filter(|field| match_value.get(field).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ExportError::MissingMatchFields(missing));
    }

    let invalid = |e: serde_json::Error| ExportError::InvalidJson(e.to_string());
    Ok(MatchBundle {
        match_data: serde_json::from_value(match_value).map_err(invalid)?,
        players_data: serde_json::from_value(players).map_err(invalid)?,
        teams_data: serde_json::from_value(teams).map_err(invalid)?,
    })
}

/// Import a match file without touching anything that already exists.
pub fn import_match(
    roster: &dyn RosterStore,
    matches: &dyn MatchStore,
    json: &str,
) -> Result<(Match, RestoreSummary), ExportError> {
    let bundle = parse_match_import(json)?;
    let summary = merge(
        roster,
        matches,
        &bundle.players_data,
        &bundle.teams_data,
        std::slice::from_ref(&bundle.match_data),
    )?;
    info!(
        match_id = %bundle.match_data.id,
        added = summary.matches_added == 1,
        players = summary.players_added,
        "Imported match file"
    );
    Ok((bundle.match_data, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::SqliteMatchStore;
    use crate::roster::SqliteRosterStore;
    use crate::scoring::DeliveryEvent;
    use crate::testing::fixtures;

    fn seeded() -> (SqliteRosterStore, SqliteMatchStore, Match) {
        let roster = SqliteRosterStore::in_memory().unwrap();
        for player in fixtures::players(4) {
            roster.insert_player(&player).unwrap();
        }
        for team in fixtures::teams(4) {
            roster.insert_team(&team).unwrap();
        }
        let matches = SqliteMatchStore::in_memory().unwrap();
        let m = fixtures::bowl(
            &fixtures::started_match(2, 4),
            &[DeliveryEvent::run(4), DeliveryEvent::run(1)],
        );
        matches.create(&m).unwrap();
        (roster, matches, m)
    }

    #[test]
    fn test_export_collects_squads_and_teams() {
        let (roster, matches, m) = seeded();
        let bundle = export_match(&roster, &matches, &m.id).unwrap();
        assert_eq!(bundle.match_data, m);
        assert_eq!(bundle.players_data.len(), 8);
        assert_eq!(bundle.teams_data.len(), 2);

        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json.get("matchData").is_some());
        assert!(json.get("playersData").is_some());
        assert!(json.get("teamsData").is_some());
    }

    #[test]
    fn test_export_unknown_match() {
        let (roster, matches, _) = seeded();
        assert!(matches!(
            export_match(&roster, &matches, "nope"),
            Err(ExportError::MatchNotFound(_))
        ));
    }

    #[test]
    fn test_bundle_import_into_fresh_stores() {
        let (roster, matches, m) = seeded();
        let json = serde_json::to_string(&export_match(&roster, &matches, &m.id).unwrap()).unwrap();

        let fresh_roster = SqliteRosterStore::in_memory().unwrap();
        let fresh_matches = SqliteMatchStore::in_memory().unwrap();
        let (imported, summary) = import_match(&fresh_roster, &fresh_matches, &json).unwrap();

        assert_eq!(imported, m);
        assert_eq!(summary.players_added, 8);
        assert_eq!(summary.teams_added, 2);
        assert_eq!(fresh_matches.get(&m.id).unwrap().unwrap(), m);
    }

    #[test]
    fn test_bare_match_import() {
        let m = fixtures::started_match(6, 8);
        let json = serde_json::to_string(&m).unwrap();
        let bundle = parse_match_import(&json).unwrap();
        assert_eq!(bundle.match_data, m);
        assert!(bundle.players_data.is_empty());
    }

    #[test]
    fn test_import_reports_missing_fields() {
        let json = r#"{"id": "m1", "settings": {}, "teamAId": "a"}"#;
        let err = parse_match_import(json).unwrap_err();
        match err {
            ExportError::MissingMatchFields(fields) => {
                assert_eq!(fields, vec!["inning1", "teamBId"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_match_import("{oops"),
            Err(ExportError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_existing_match_is_not_overwritten() {
        let (roster, matches, m) = seeded();
        let mut changed = m.clone();
        changed.inning1.score = 99;
        let json = serde_json::to_string(&changed).unwrap();

        let (_, summary) = import_match(&roster, &matches, &json).unwrap();
        assert_eq!(summary.matches_skipped, 1);
        assert_eq!(matches.get(&m.id).unwrap().unwrap().inning1.score, 5);
    }
}
