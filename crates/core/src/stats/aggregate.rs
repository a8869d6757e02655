use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::types::{BattingSummary, BestBowling, BowlingSummary, FieldingSummary, PlayerStats};
use crate::roster::Player;
use crate::scoring::derive::{economy, format_overs, format_rate, strike_rate};
use crate::scoring::{DismissalType, Match, MatchStatus};

#[derive(Default)]
struct Tally {
    batting: BattingSummary,
    bowling: BowlingSummary,
    fielding: FieldingSummary,
}

/// Fold every finished match into career figures for the given players.
///
/// Players outside `players` are skipped, and players who neither batted,
/// bowled nor fielded are left out. The result is ordered by runs scored.
pub fn aggregate(players: &[Player], matches: &[Match]) -> Vec<PlayerStats> {
    let mut tallies: HashMap<&str, Tally> = players
        .iter()
        .map(|p| (p.id.as_str(), Tally::default()))
        .collect();

    let finished = matches.iter().filter(|m| m.status == MatchStatus::Finished);
    let mut folded = 0;
    for m in finished {
        fold_match(&mut tallies, m);
        folded += 1;
    }
    debug!(matches = folded, players = players.len(), "Aggregated career statistics");

    let mut stats: Vec<PlayerStats> = players
        .iter()
        .filter_map(|p| {
            let tally = tallies.remove(p.id.as_str())?;
            Some(finalize(p.clone(), tally))
        })
        .filter(PlayerStats::has_contributions)
        .collect();

    stats.sort_by(|a, b| {
        b.batting
            .runs
            .cmp(&a.batting.runs)
            .then_with(|| a.player.name.cmp(&b.player.name))
    });
    stats
}

fn fold_match(tallies: &mut HashMap<&str, Tally>, m: &Match) {
    let mut batted: HashSet<&str> = HashSet::new();
    let mut bowled: HashSet<&str> = HashSet::new();

    for inning in m.innings() {
        for (id, s) in &inning.batsman_stats {
            if s.balls == 0 && !s.is_out {
                continue;
            }
            let Some(tally) = tallies.get_mut(id.as_str()) else {
                continue;
            };
            let bat = &mut tally.batting;
            if batted.insert(id.as_str()) {
                bat.matches += 1;
            }
            bat.innings += 1;
            bat.runs += s.runs;
            bat.balls += s.balls;
            if !s.is_out {
                bat.not_outs += 1;
            }
            bat.highest_score = bat.highest_score.max(s.runs);
            if s.runs >= 100 {
                bat.hundreds += 1;
            } else if s.runs >= 50 {
                bat.fifties += 1;
            }
            bat.fours += s.fours;
            bat.sixes += s.sixes;
        }

        for (id, s) in &inning.bowler_stats {
            if s.total_balls() == 0 {
                continue;
            }
            let Some(tally) = tallies.get_mut(id.as_str()) else {
                continue;
            };
            let bowl = &mut tally.bowling;
            if bowled.insert(id.as_str()) {
                bowl.matches += 1;
            }
            bowl.innings += 1;
            bowl.balls += s.total_balls();
            bowl.runs_conceded += s.runs_conceded;
            bowl.wickets += s.wickets;
            bowl.maidens += s.maidens;

            let figures = BestBowling {
                wickets: s.wickets,
                runs: s.runs_conceded,
            };
            match bowl.best_bowling {
                Some(best) if !best.beaten_by(&figures) => {}
                _ => bowl.best_bowling = Some(figures),
            }
        }

        for wicket in inning.timeline.iter().filter_map(|b| b.wicket.as_ref()) {
            if let Some(tally) = wicket
                .assisting_player_id
                .as_deref()
                .and_then(|id| tallies.get_mut(id))
            {
                match wicket.kind {
                    DismissalType::Caught => tally.fielding.catches += 1,
                    DismissalType::Stumped => tally.fielding.stumpings += 1,
                    DismissalType::RunOut => tally.fielding.run_outs += 1,
                    _ => {}
                }
            }
            if wicket.kind == DismissalType::RunOut {
                if let Some(tally) = wicket
                    .second_assisting_player_id
                    .as_deref()
                    .and_then(|id| tallies.get_mut(id))
                {
                    tally.fielding.run_outs += 1;
                }
            }
        }
    }
}

fn finalize(player: Player, tally: Tally) -> PlayerStats {
    let Tally {
        mut batting,
        mut bowling,
        fielding,
    } = tally;

    let outs = batting.innings - batting.not_outs;
    batting.average = ratio(batting.runs, outs);
    batting.strike_rate = strike_rate(batting.runs, batting.balls);

    bowling.overs = format_overs(bowling.balls / 6, bowling.balls % 6);
    bowling.economy = economy(bowling.runs_conceded, bowling.balls);
    bowling.average = ratio(bowling.runs_conceded, bowling.wickets);
    bowling.strike_rate = ratio(bowling.balls, bowling.wickets);
    bowling.best = bowling
        .best_bowling
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".to_string());

    PlayerStats {
        player,
        batting,
        bowling,
        fielding,
    }
}

fn ratio(numerator: u32, denominator: u32) -> String {
    if denominator == 0 {
        return "0.00".to_string();
    }
    format_rate(f64::from(numerator) / f64::from(denominator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::DeliveryEvent;
    use crate::testing::fixtures;

    /// A one-over-a-side match: Lions make 10/1, Tigers reply with 4/0.
    fn finished_match(id: &str) -> Match {
        let m = fixtures::started_match_with_id(id, 1, 8);
        let m = fixtures::bowl(
            &m,
            &[
                DeliveryEvent::run(4),
                DeliveryEvent::run(6),
                DeliveryEvent::wicket(DismissalType::Caught, "a1", Some("a3"))
                    .with_fielders(Some("b2"), None),
                DeliveryEvent::run(0),
                DeliveryEvent::run(0),
                DeliveryEvent::run(0),
            ],
        );
        let m = fixtures::start_second_innings(&m);
        fixtures::bowl(
            &m,
            &[
                DeliveryEvent::run(4),
                DeliveryEvent::run(0),
                DeliveryEvent::run(0),
                DeliveryEvent::run(0),
                DeliveryEvent::run(0),
                DeliveryEvent::run(0),
            ],
        )
    }

    fn find<'a>(stats: &'a [PlayerStats], id: &str) -> &'a PlayerStats {
        stats.iter().find(|s| s.player.id == id).unwrap()
    }

    #[test]
    fn test_unfinished_matches_are_ignored() {
        let players = fixtures::players(8);
        let live = fixtures::bowl(&fixtures::started_match(6, 8), &[DeliveryEvent::run(4)]);
        assert!(aggregate(&players, &[live]).is_empty());
    }

    #[test]
    fn test_batting_and_bowling_figures() {
        let m = finished_match("m1");
        assert_eq!(m.status, MatchStatus::Finished);
        let players = fixtures::players(8);
        let stats = aggregate(&players, &[m]);

        let a1 = find(&stats, "a1");
        assert_eq!(a1.batting.innings, 1);
        assert_eq!(a1.batting.runs, 10);
        assert_eq!(a1.batting.balls, 3);
        assert_eq!(a1.batting.not_outs, 0);
        assert_eq!(a1.batting.fours, 1);
        assert_eq!(a1.batting.sixes, 1);
        assert_eq!(a1.batting.average, "10.00");
        assert_eq!(a1.batting.strike_rate, "333.33");

        let b1 = find(&stats, "b1");
        assert_eq!(b1.bowling.innings, 1);
        assert_eq!(b1.bowling.overs, "1.0");
        assert_eq!(b1.bowling.wickets, 1);
        assert_eq!(b1.bowling.best, "1/10");
        assert_eq!(b1.bowling.economy, "10.00");
        assert_eq!(b1.bowling.strike_rate, "6.00");

        let b2 = find(&stats, "b2");
        assert_eq!(b2.fielding.catches, 1);
        assert_eq!(b2.batting.innings, 0);

        // stats sorted by runs scored
        assert_eq!(stats[0].player.id, "a1");
    }

    #[test]
    fn test_not_out_average_is_zero_sentinel() {
        let players = fixtures::players(8);
        let stats = aggregate(&players, &[finished_match("m1")]);
        let b1 = find(&stats, "b1");
        assert_eq!(b1.batting.not_outs, 1);
        assert_eq!(b1.batting.average, "0.00");
    }

    #[test]
    fn test_matches_counted_once_and_best_bowling() {
        let players = fixtures::players(8);
        let stats = aggregate(&players, &[finished_match("m1"), finished_match("m2")]);
        let a1 = find(&stats, "a1");
        assert_eq!(a1.batting.matches, 2);
        assert_eq!(a1.batting.innings, 2);
        assert_eq!(a1.batting.highest_score, 10);
        // a1 bowled the second innings in both matches: 0/4 each time
        assert_eq!(a1.bowling.matches, 2);
        assert_eq!(a1.bowling.best_bowling, Some(BestBowling { wickets: 0, runs: 4 }));
        assert_eq!(a1.bowling.maidens, 0);
    }

    #[test]
    fn test_idle_players_excluded() {
        let players = fixtures::players(8);
        let stats = aggregate(&players, &[finished_match("m1")]);
        assert!(stats.iter().all(|s| s.player.id != "a8"));
    }

    #[test]
    fn test_run_out_credits_both_fielders() {
        let m = fixtures::started_match(1, 8);
        let m = fixtures::bowl(
            &m,
            &[DeliveryEvent::wicket(DismissalType::RunOut, "a2", Some("a3"))
                .with_fielders(Some("b4"), Some("b5"))],
        );
        let m = crate::scoring::declare_innings(&m, &fixtures::directory()).unwrap();
        let m = fixtures::start_second_innings(&m);
        let m = crate::scoring::declare_innings(&m, &fixtures::directory()).unwrap();

        let stats = aggregate(&fixtures::players(8), &[m]);
        assert_eq!(find(&stats, "b4").fielding.run_outs, 1);
        assert_eq!(find(&stats, "b5").fielding.run_outs, 1);
        assert_eq!(find(&stats, "b1").bowling.wickets, 0);
    }

    #[test]
    fn test_best_bowling_ordering() {
        let best = BestBowling { wickets: 2, runs: 20 };
        assert!(best.beaten_by(&BestBowling { wickets: 3, runs: 40 }));
        assert!(best.beaten_by(&BestBowling { wickets: 2, runs: 15 }));
        assert!(!best.beaten_by(&BestBowling { wickets: 2, runs: 25 }));
        assert!(!best.beaten_by(&BestBowling { wickets: 1, runs: 0 }));
    }
}
