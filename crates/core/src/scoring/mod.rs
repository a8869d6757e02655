//! Ball-by-ball scoring: match documents, the delivery processor, lifecycle
//! commands, undo and read-only derivations.

pub mod derive;
mod event;
pub mod lifecycle;
mod processor;
mod session;
mod settings;
mod types;

pub use event::{DeliveryEvent, ExtraType};
pub use lifecycle::{
    check_delivery, create_match, declare_innings, retire_batsman, select_next_bowler,
    start_innings, swap_batsmen, update_settings,
};
pub use processor::apply_delivery;
pub use session::ScoringSession;
pub use settings::{MatchSettings, RebowlDecision, RebowlRule};
pub use types::{
    Ball, BallEvent, BatsmanStats, BowlerStats, DismissalType, FallOfWicket, Inning, Match,
    MatchStatus, TeamDirectory, TossDecision, WicketDetail,
};

use thiserror::Error;

/// Rejected scoring command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Invalid match settings: {0}")]
    InvalidSettings(String),

    #[error("A match needs two different teams")]
    SameTeam,

    #[error("Toss winner {0} is not playing in this match")]
    TossWinnerNotInMatch(String),

    #[error("Team {team_id} selected {actual} players, expected {expected}")]
    SquadSize {
        team_id: String,
        expected: u32,
        actual: usize,
    },

    #[error("Player {0} is selected more than once")]
    DuplicatePlayer(String),

    #[error("Player {0} is not in the batting side")]
    NotInBattingSide(String),

    #[error("Player {0} is not in the bowling side")]
    NotInBowlingSide(String),

    #[error("Striker and non-striker cannot be the same player")]
    SameOpeners,

    #[error("Match is {actual}, expected {expected}")]
    InvalidStatus {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Waiting for the next bowler to be selected")]
    AwaitingBowler,

    #[error("No over has just finished")]
    NotAwaitingBowler,

    #[error("{0} bowled the previous over")]
    ConsecutiveOvers(String),

    #[error("Player {0} is not at the crease")]
    NotAtCrease(String),

    #[error("Player {0} cannot come in to bat")]
    BatsmanUnavailable(String),

    #[error("Invalid delivery: {0}")]
    InvalidDelivery(String),
}
