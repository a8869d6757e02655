//! Match lifecycle commands.
//!
//! Like the delivery processor these take a match by reference and return a
//! new one, but they validate their arguments and report failures instead of
//! ignoring them.

use std::collections::HashSet;

use tracing::info;

use super::event::DeliveryEvent;
use super::processor::{bring_in, close_innings};
use super::settings::MatchSettings;
use super::types::{Inning, Match, MatchStatus, TeamDirectory, TossDecision};
use super::ScoringError;

/// Highest number of runs accepted on a single delivery.
const MAX_RUNS_PER_BALL: u32 = 7;

/// Create a match from the toss and both selected squads.
pub fn create_match(
    id: impl Into<String>,
    settings: MatchSettings,
    team_a_id: &str,
    team_b_id: &str,
    team_a_players: Vec<String>,
    team_b_players: Vec<String>,
) -> Result<Match, ScoringError> {
    settings.validate()?;

    if team_a_id == team_b_id {
        return Err(ScoringError::SameTeam);
    }
    if settings.toss_winner_team_id != team_a_id && settings.toss_winner_team_id != team_b_id {
        return Err(ScoringError::TossWinnerNotInMatch(
            settings.toss_winner_team_id.clone(),
        ));
    }
    for (team_id, squad) in [(team_a_id, &team_a_players), (team_b_id, &team_b_players)] {
        if squad.len() != settings.players_per_team as usize {
            return Err(ScoringError::SquadSize {
                team_id: team_id.to_string(),
                expected: settings.players_per_team,
                actual: squad.len(),
            });
        }
    }

    let mut seen = HashSet::new();
    for player_id in team_a_players.iter().chain(team_b_players.iter()) {
        if !seen.insert(player_id.as_str()) {
            return Err(ScoringError::DuplicatePlayer(player_id.clone()));
        }
    }

    let toss_winner = settings.toss_winner_team_id.clone();
    let toss_winner = toss_winner.as_str();
    let toss_loser = if toss_winner == team_a_id {
        team_b_id
    } else {
        team_a_id
    };
    let (batting, bowling) = match settings.decision {
        TossDecision::Bat => (toss_winner, toss_loser),
        TossDecision::Bowl => (toss_loser, toss_winner),
    };
    let squad_for = |team_id: &str| {
        if team_id == team_a_id {
            &team_a_players
        } else {
            &team_b_players
        }
    };
    let inning1 = Inning::new(batting, bowling, squad_for(batting), squad_for(bowling));

    let m = Match {
        id: id.into(),
        team_a_id: team_a_id.to_string(),
        team_b_id: team_b_id.to_string(),
        team_a_players,
        team_b_players,
        settings,
        status: MatchStatus::Upcoming,
        inning1,
        inning2: None,
        winner_team_id: None,
        result_text: None,
    };

    info!(
        match_id = %m.id,
        batting = %m.inning1.batting_team_id,
        overs = m.settings.overs,
        "Match created"
    );
    Ok(m)
}

/// Choose the openers and opening bowler for the current innings.
pub fn start_innings(
    m: &Match,
    striker_id: &str,
    non_striker_id: &str,
    bowler_id: &str,
) -> Result<Match, ScoringError> {
    require_status(m, MatchStatus::Upcoming)?;
    if striker_id == non_striker_id {
        return Err(ScoringError::SameOpeners);
    }

    let inning = m.current_inning();
    for batsman in [striker_id, non_striker_id] {
        if !in_side(m, &inning.batting_team_id, batsman)
            || !inning.batsman_stats.contains_key(batsman)
        {
            return Err(ScoringError::NotInBattingSide(batsman.to_string()));
        }
    }
    if !in_side(m, &inning.bowling_team_id, bowler_id)
        || !inning.bowler_stats.contains_key(bowler_id)
    {
        return Err(ScoringError::NotInBowlingSide(bowler_id.to_string()));
    }

    let mut next = m.clone();
    next.status = MatchStatus::InProgress;
    let inning = next.current_inning_mut();
    inning.on_strike_batsman_id = striker_id.to_string();
    inning.non_strike_batsman_id = non_striker_id.to_string();
    inning.current_bowler_id = bowler_id.to_string();
    inning.awaiting_next_bowler = false;

    info!(
        match_id = %next.id,
        innings = if next.is_second_innings() { 2 } else { 1 },
        "Innings started"
    );
    Ok(next)
}

/// Hand the ball to a new bowler after an over.
pub fn select_next_bowler(m: &Match, bowler_id: &str) -> Result<Match, ScoringError> {
    require_status(m, MatchStatus::InProgress)?;
    let inning = m.current_inning();
    if !inning.awaiting_next_bowler {
        return Err(ScoringError::NotAwaitingBowler);
    }
    if !in_side(m, &inning.bowling_team_id, bowler_id)
        || !inning.bowler_stats.contains_key(bowler_id)
    {
        return Err(ScoringError::NotInBowlingSide(bowler_id.to_string()));
    }
    if inning.current_bowler_id == bowler_id {
        return Err(ScoringError::ConsecutiveOvers(bowler_id.to_string()));
    }

    let mut next = m.clone();
    let inning = next.current_inning_mut();
    inning.current_bowler_id = bowler_id.to_string();
    inning.awaiting_next_bowler = false;
    Ok(next)
}

pub fn swap_batsmen(m: &Match) -> Result<Match, ScoringError> {
    require_status(m, MatchStatus::InProgress)?;
    let mut next = m.clone();
    next.current_inning_mut().swap_strike();
    Ok(next)
}

/// Retire a batsman at the crease and send in a replacement at that end.
pub fn retire_batsman(
    m: &Match,
    retired_id: &str,
    replacement_id: &str,
    reason: &str,
) -> Result<Match, ScoringError> {
    require_status(m, MatchStatus::InProgress)?;
    let inning = m.current_inning();
    if !inning.at_crease(retired_id) {
        return Err(ScoringError::NotAtCrease(retired_id.to_string()));
    }
    let available = inning
        .batsman_stats
        .get(replacement_id)
        .map(|s| !s.is_out && s.retirement_reason.is_none())
        .unwrap_or(false);
    if !available || inning.at_crease(replacement_id) {
        return Err(ScoringError::BatsmanUnavailable(replacement_id.to_string()));
    }

    let reason = match reason.trim() {
        "" => "retired".to_string(),
        r => r.to_string(),
    };

    let mut next = m.clone();
    let inning = next.current_inning_mut();
    if let Some(stats) = inning.batsman_stats.get_mut(retired_id) {
        stats.retirement_reason = Some(reason);
    }
    bring_in(inning, retired_id, replacement_id);
    Ok(next)
}

/// End the current innings now, whatever the score.
pub fn declare_innings<D>(m: &Match, teams: &D) -> Result<Match, ScoringError>
where
    D: TeamDirectory + ?Sized,
{
    require_status(m, MatchStatus::InProgress)?;
    let mut next = m.clone();
    close_innings(&mut next, teams);
    Ok(next)
}

/// Change format and extras rules. The toss cannot be changed.
pub fn update_settings(m: &Match, settings: &MatchSettings) -> Result<Match, ScoringError> {
    if m.status == MatchStatus::Finished {
        return Err(ScoringError::InvalidStatus {
            expected: "not finished",
            actual: m.status.as_str(),
        });
    }
    settings.validate()?;

    // The innings closes when the last over is completed, so the limit has
    // to leave room for the over in progress.
    let inning = m.current_inning();
    if settings.overs <= inning.overs {
        return Err(ScoringError::InvalidSettings(format!(
            "innings is already into over {}",
            inning.overs + 1
        )));
    }
    if settings.wickets_allowed() <= inning.wickets {
        return Err(ScoringError::InvalidSettings(format!(
            "{} wickets have already fallen",
            inning.wickets
        )));
    }

    let mut next = m.clone();
    next.settings = MatchSettings {
        toss_winner_team_id: m.settings.toss_winner_team_id.clone(),
        decision: m.settings.decision,
        ..settings.clone()
    };
    Ok(next)
}

/// Check a delivery against the state it will be applied to.
pub fn check_delivery(m: &Match, event: &DeliveryEvent) -> Result<(), ScoringError> {
    require_status(m, MatchStatus::InProgress)?;
    let inning = m.current_inning();
    if inning.awaiting_next_bowler {
        return Err(ScoringError::AwaitingBowler);
    }
    if event.reported_runs() > MAX_RUNS_PER_BALL {
        return Err(ScoringError::InvalidDelivery(format!(
            "at most {} runs can be recorded on one ball",
            MAX_RUNS_PER_BALL
        )));
    }

    if let DeliveryEvent::Wicket {
        dismissed_player_id,
        next_batsman_id,
        assisting_player_id,
        second_assisting_player_id,
        ..
    } = event
    {
        if !inning.at_crease(dismissed_player_id) {
            return Err(ScoringError::NotAtCrease(dismissed_player_id.clone()));
        }

        let innings_over = inning.wickets + 1 >= m.settings.wickets_allowed();
        match next_batsman_id.as_deref().filter(|id| !id.is_empty()) {
            Some(incoming) => {
                let available = inning
                    .batsman_stats
                    .get(incoming)
                    .map(|s| !s.is_out)
                    .unwrap_or(false);
                if !available || inning.at_crease(incoming) {
                    return Err(ScoringError::BatsmanUnavailable(incoming.to_string()));
                }
            }
            None if !innings_over => {
                return Err(ScoringError::InvalidDelivery(
                    "the next batsman must be chosen".to_string(),
                ));
            }
            None => {}
        }

        for fielder in [assisting_player_id, second_assisting_player_id]
            .into_iter()
            .flatten()
        {
            if !in_side(m, &inning.bowling_team_id, fielder) {
                return Err(ScoringError::NotInBowlingSide(fielder.clone()));
            }
        }
    }

    Ok(())
}

fn require_status(m: &Match, expected: MatchStatus) -> Result<(), ScoringError> {
    if m.status != expected {
        return Err(ScoringError::InvalidStatus {
            expected: expected.as_str(),
            actual: m.status.as_str(),
        });
    }
    Ok(())
}

fn in_side(m: &Match, team_id: &str, player_id: &str) -> bool {
    m.squad(team_id).iter().any(|id| id == player_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{apply_delivery, DismissalType};
    use crate::testing::fixtures;

    fn squads(n: usize) -> (Vec<String>, Vec<String>) {
        (fixtures::squad("a", n), fixtures::squad("b", n))
    }

    #[test]
    fn test_create_match_toss_decides_batting() {
        let (a, b) = squads(8);
        let settings = MatchSettings::new(6, 8, fixtures::TEAM_A, TossDecision::Bowl);
        let m = create_match("m1", settings, fixtures::TEAM_A, fixtures::TEAM_B, a, b).unwrap();
        assert_eq!(m.status, MatchStatus::Upcoming);
        assert_eq!(m.inning1.batting_team_id, fixtures::TEAM_B);
        assert_eq!(m.inning1.bowling_team_id, fixtures::TEAM_A);
        assert!(m.inning1.batsman_stats.contains_key("b1"));
        assert!(m.inning1.bowler_stats.contains_key("a1"));
        assert!(m.inning2.is_none());
    }

    #[test]
    fn test_create_match_rejects_bad_squads() {
        let (a, b) = squads(8);
        let settings = MatchSettings::new(6, 8, fixtures::TEAM_A, TossDecision::Bat);

        let err = create_match("m", settings.clone(), "x", "x", a.clone(), b.clone()).unwrap_err();
        assert_eq!(err, ScoringError::SameTeam);

        let short = a[..7].to_vec();
        let err = create_match(
            "m",
            settings.clone(),
            fixtures::TEAM_A,
            fixtures::TEAM_B,
            short,
            b.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, ScoringError::SquadSize { actual: 7, .. }));

        let mut overlap = b.clone();
        overlap[0] = "a1".to_string();
        let err = create_match(
            "m",
            settings,
            fixtures::TEAM_A,
            fixtures::TEAM_B,
            a.clone(),
            overlap,
        )
        .unwrap_err();
        assert_eq!(err, ScoringError::DuplicatePlayer("a1".to_string()));

        let stranger = MatchSettings::new(6, 8, "team-z", TossDecision::Bat);
        let err =
            create_match("m", stranger, fixtures::TEAM_A, fixtures::TEAM_B, a, b).unwrap_err();
        assert!(matches!(err, ScoringError::TossWinnerNotInMatch(_)));
    }

    #[test]
    fn test_start_innings_validates_players() {
        let m = fixtures::new_match(6, 8);
        assert_eq!(
            start_innings(&m, "a1", "a1", "b1").unwrap_err(),
            ScoringError::SameOpeners
        );
        assert!(matches!(
            start_innings(&m, "a1", "b2", "b1").unwrap_err(),
            ScoringError::NotInBattingSide(_)
        ));
        assert!(matches!(
            start_innings(&m, "a1", "a2", "a3").unwrap_err(),
            ScoringError::NotInBowlingSide(_)
        ));

        let started = start_innings(&m, "a1", "a2", "b1").unwrap();
        assert_eq!(started.status, MatchStatus::InProgress);
        assert_eq!(m.status, MatchStatus::Upcoming);

        assert!(matches!(
            start_innings(&started, "a1", "a2", "b1").unwrap_err(),
            ScoringError::InvalidStatus { .. }
        ));
    }

    #[test]
    fn test_bowler_cannot_bowl_consecutive_overs() {
        let m = fixtures::started_match(6, 8);
        assert_eq!(
            select_next_bowler(&m, "b2").unwrap_err(),
            ScoringError::NotAwaitingBowler
        );

        let m = fixtures::bowl(&m, &fixtures::dots(6));
        assert_eq!(
            select_next_bowler(&m, "b1").unwrap_err(),
            ScoringError::ConsecutiveOvers("b1".to_string())
        );
        let next = select_next_bowler(&m, "b2").unwrap();
        assert_eq!(next.inning1.current_bowler_id, "b2");
        assert!(!next.inning1.awaiting_next_bowler);
    }

    #[test]
    fn test_swap_and_retire() {
        let m = fixtures::started_match(6, 8);
        let swapped = swap_batsmen(&m).unwrap();
        assert_eq!(swapped.inning1.on_strike_batsman_id, "a2");
        assert_eq!(swapped.inning1.non_strike_batsman_id, "a1");

        let retired = retire_batsman(&m, "a2", "a4", "retired hurt").unwrap();
        assert_eq!(retired.inning1.non_strike_batsman_id, "a4");
        assert_eq!(
            retired.inning1.batsman_stats["a2"].retirement_reason.as_deref(),
            Some("retired hurt")
        );

        assert!(matches!(
            retire_batsman(&m, "a5", "a4", "").unwrap_err(),
            ScoringError::NotAtCrease(_)
        ));
        assert!(matches!(
            retire_batsman(&m, "a2", "a1", "").unwrap_err(),
            ScoringError::BatsmanUnavailable(_)
        ));
        assert!(matches!(
            retire_batsman(&retired, "a4", "a2", "").unwrap_err(),
            ScoringError::BatsmanUnavailable(_)
        ));
    }

    #[test]
    fn test_declare_first_innings_starts_chase() {
        let m = fixtures::started_match(6, 8);
        let m = fixtures::bowl(&m, &[DeliveryEvent::run(4)]);
        let declared = declare_innings(&m, &fixtures::directory()).unwrap();
        assert_eq!(declared.status, MatchStatus::Upcoming);
        assert_eq!(declared.inning1.score, 4);
        assert!(declared.inning2.as_ref().unwrap().awaiting_next_bowler);
    }

    #[test]
    fn test_declare_second_innings_finishes() {
        let m = fixtures::started_match(6, 8);
        let m = fixtures::bowl(&m, &[DeliveryEvent::run(6)]);
        let m = declare_innings(&m, &fixtures::directory()).unwrap();
        let m = fixtures::start_second_innings(&m);
        let m = declare_innings(&m, &fixtures::directory()).unwrap();
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.result_text.as_deref(), Some("Lions won by 6 runs."));
        assert!(declare_innings(&m, &fixtures::directory()).is_err());
    }

    #[test]
    fn test_update_settings_keeps_toss() {
        let m = fixtures::started_match(6, 8);
        let mut changed = m.settings.clone().with_penalties(1, 1);
        changed.overs = 10;
        changed.toss_winner_team_id = fixtures::TEAM_B.to_string();
        let next = update_settings(&m, &changed).unwrap();
        assert_eq!(next.settings.overs, 10);
        assert_eq!(next.settings.wide_runs, 1);
        assert_eq!(next.settings.toss_winner_team_id, fixtures::TEAM_A);

        let mut zero = m.settings.clone();
        zero.overs = 0;
        assert!(matches!(
            update_settings(&m, &zero).unwrap_err(),
            ScoringError::InvalidSettings(_)
        ));
    }

    #[test]
    fn test_update_settings_rejects_overs_already_reached() {
        let m = fixtures::started_match(6, 8);
        let m = fixtures::bowl(&m, &fixtures::dots(6));
        let m = fixtures::next_bowler(&m, "b2");
        let m = fixtures::bowl(&m, &fixtures::dots(3));
        assert_eq!((m.inning1.overs, m.inning1.balls), (1, 3));

        let mut one = m.settings.clone();
        one.overs = 1;
        assert!(matches!(
            update_settings(&m, &one).unwrap_err(),
            ScoringError::InvalidSettings(_)
        ));

        // Cutting to the over in progress ends the innings at its last ball
        let mut two = m.settings.clone();
        two.overs = 2;
        let m = update_settings(&m, &two).unwrap();
        let m = fixtures::bowl(&m, &fixtures::dots(3));
        assert_eq!(m.inning1.overs, 2);
        assert_eq!(m.status, MatchStatus::Upcoming);
        assert!(m.inning2.is_some());
    }

    #[test]
    fn test_check_delivery_gates() {
        let upcoming = fixtures::new_match(6, 8);
        assert!(matches!(
            check_delivery(&upcoming, &DeliveryEvent::run(1)).unwrap_err(),
            ScoringError::InvalidStatus { .. }
        ));

        let m = fixtures::started_match(6, 8);
        assert!(check_delivery(&m, &DeliveryEvent::run(6)).is_ok());
        assert!(check_delivery(&m, &DeliveryEvent::run(9)).is_err());

        let after_over = fixtures::bowl(&m, &fixtures::dots(6));
        assert_eq!(
            check_delivery(&after_over, &DeliveryEvent::run(1)).unwrap_err(),
            ScoringError::AwaitingBowler
        );
    }

    #[test]
    fn test_check_wicket_event() {
        let m = fixtures::started_match(6, 8);
        let not_batting = DeliveryEvent::wicket(DismissalType::Bowled, "a5", Some("a3"));
        assert!(matches!(
            check_delivery(&m, &not_batting).unwrap_err(),
            ScoringError::NotAtCrease(_)
        ));

        let no_replacement = DeliveryEvent::wicket(DismissalType::Bowled, "a1", None);
        assert!(matches!(
            check_delivery(&m, &no_replacement).unwrap_err(),
            ScoringError::InvalidDelivery(_)
        ));

        let partner = DeliveryEvent::wicket(DismissalType::Bowled, "a1", Some("a2"));
        assert!(matches!(
            check_delivery(&m, &partner).unwrap_err(),
            ScoringError::BatsmanUnavailable(_)
        ));

        let own_fielder = DeliveryEvent::wicket(DismissalType::Caught, "a1", Some("a3"))
            .with_fielders(Some("a4"), None);
        assert!(matches!(
            check_delivery(&m, &own_fielder).unwrap_err(),
            ScoringError::NotInBowlingSide(_)
        ));

        let good = DeliveryEvent::wicket(DismissalType::Caught, "a1", Some("a3"))
            .with_fielders(Some("b4"), None);
        assert!(check_delivery(&m, &good).is_ok());
        let next = apply_delivery(&m, &good, &fixtures::directory());
        assert_eq!(next.inning1.wickets, 1);
    }

    #[test]
    fn test_last_wicket_needs_no_replacement() {
        let m = fixtures::started_match(6, 2);
        let last = DeliveryEvent::wicket(DismissalType::Bowled, "a1", None);
        assert!(check_delivery(&m, &last).is_ok());
    }
}
