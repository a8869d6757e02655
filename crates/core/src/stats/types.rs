use serde::Serialize;

use crate::roster::Player;

/// Best single-innings bowling: most wickets, then fewest runs.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BestBowling {
    pub wickets: u32,
    pub runs: u32,
}

impl BestBowling {
    /// Whether `other` is a better return than `self`.
    pub fn beaten_by(&self, other: &BestBowling) -> bool {
        other.wickets > self.wickets || (other.wickets == self.wickets && other.runs < self.runs)
    }
}

impl std::fmt::Display for BestBowling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.wickets, self.runs)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BattingSummary {
    pub matches: u32,
    pub innings: u32,
    pub runs: u32,
    pub balls: u32,
    pub not_outs: u32,
    pub highest_score: u32,
    pub fours: u32,
    pub sixes: u32,
    pub fifties: u32,
    pub hundreds: u32,
    /// Runs per dismissal
    pub average: String,
    pub strike_rate: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BowlingSummary {
    pub matches: u32,
    pub innings: u32,
    pub balls: u32,
    /// Whole and partial overs, e.g. `3.4`
    pub overs: String,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
    pub best_bowling: Option<BestBowling>,
    /// `W/R` form of `best_bowling`, `-` when the player never bowled
    pub best: String,
    pub average: String,
    pub economy: String,
    /// Balls per wicket
    pub strike_rate: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FieldingSummary {
    pub catches: u32,
    pub stumpings: u32,
    pub run_outs: u32,
}

impl FieldingSummary {
    pub fn is_empty(&self) -> bool {
        self.catches == 0 && self.stumpings == 0 && self.run_outs == 0
    }
}

/// Career figures for one player.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerStats {
    pub player: Player,
    pub batting: BattingSummary,
    pub bowling: BowlingSummary,
    pub fielding: FieldingSummary,
}

impl PlayerStats {
    /// Whether the player contributed anything at all.
    pub fn has_contributions(&self) -> bool {
        self.batting.innings > 0 || self.bowling.innings > 0 || !self.fielding.is_empty()
    }
}
