//! Testing utilities shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use scorer_core::scoring::DeliveryEvent;
//! use scorer_core::testing::fixtures;
//!
//! let m = fixtures::started_match(6, 8);
//! let m = fixtures::bowl(&m, &[DeliveryEvent::run(4), DeliveryEvent::run(1)]);
//! assert_eq!(m.inning1.score, 5);
//! ```

/// Test fixtures and helper functions.
///
/// Squads are named by side: `a1..an` play for [`TEAM_A`] ("Lions") and
/// `b1..bn` for [`TEAM_B`] ("Tigers"). Lions win the toss and bat.
pub mod fixtures {
    use std::collections::HashMap;

    use crate::roster::{Player, PlayerRole, Team};
    use crate::scoring::{
        apply_delivery, create_match, select_next_bowler, start_innings, DeliveryEvent, Match,
        MatchSettings, TossDecision,
    };

    pub const TEAM_A: &str = "team-a";
    pub const TEAM_B: &str = "team-b";

    /// Player ids `<prefix>1..<prefix>n`.
    pub fn squad(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    /// Both squads as roster players: batters for Lions, bowlers for Tigers.
    pub fn players(n: u32) -> Vec<Player> {
        let lions = (1..=n).map(|i| Player {
            id: format!("a{}", i),
            name: format!("Batter {}", i),
            role: PlayerRole::Batsman,
        });
        let tigers = (1..=n).map(|i| Player {
            id: format!("b{}", i),
            name: format!("Bowler {}", i),
            role: PlayerRole::Bowler,
        });
        lions.chain(tigers).collect()
    }

    pub fn player_names(n: u32) -> HashMap<String, String> {
        players(n).into_iter().map(|p| (p.id, p.name)).collect()
    }

    pub fn teams(n: u32) -> Vec<Team> {
        vec![
            Team {
                id: TEAM_A.to_string(),
                name: "Lions".to_string(),
                player_ids: squad("a", n as usize),
            },
            Team {
                id: TEAM_B.to_string(),
                name: "Tigers".to_string(),
                player_ids: squad("b", n as usize),
            },
        ]
    }

    /// Team display names.
    pub fn directory() -> HashMap<String, String> {
        HashMap::from([
            (TEAM_A.to_string(), "Lions".to_string()),
            (TEAM_B.to_string(), "Tigers".to_string()),
        ])
    }

    /// An Upcoming match with id `m1`.
    pub fn new_match(overs: u32, players_per_team: u32) -> Match {
        let settings = MatchSettings::new(overs, players_per_team, TEAM_A, TossDecision::Bat);
        create_match(
            "m1",
            settings,
            TEAM_A,
            TEAM_B,
            squad("a", players_per_team as usize),
            squad("b", players_per_team as usize),
        )
        .unwrap()
    }

    /// a1 on strike, a2 at the other end, b1 bowling.
    pub fn started_match(overs: u32, players_per_team: u32) -> Match {
        started_match_with_id("m1", overs, players_per_team)
    }

    pub fn started_match_with_id(id: &str, overs: u32, players_per_team: u32) -> Match {
        let mut m = new_match(overs, players_per_team);
        m.id = id.to_string();
        start_innings(&m, "a1", "a2", "b1").unwrap()
    }

    /// Feed deliveries straight to the processor, without boundary checks.
    pub fn bowl(m: &Match, events: &[DeliveryEvent]) -> Match {
        let teams = directory();
        events
            .iter()
            .fold(m.clone(), |current, event| apply_delivery(&current, event, &teams))
    }

    pub fn dots(n: usize) -> Vec<DeliveryEvent> {
        vec![DeliveryEvent::run(0); n]
    }

    pub fn next_bowler(m: &Match, bowler_id: &str) -> Match {
        select_next_bowler(m, bowler_id).unwrap()
    }

    /// Open the chase with b1 and b2 against a1.
    pub fn start_second_innings(m: &Match) -> Match {
        start_innings(m, "b1", "b2", "a1").unwrap()
    }
}
