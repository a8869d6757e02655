//! Match, innings and ball records.
//!
//! These are the documents persisted by the match store and exchanged in
//! export bundles, so field names follow the camelCase interchange format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::settings::MatchSettings;

// ============================================================================
// Enumerations
// ============================================================================

/// Lifecycle state of a match.
///
/// A match goes back to `Upcoming` between innings until the openers of the
/// second innings are chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Upcoming,
    #[serde(rename = "In Progress")]
    InProgress,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Upcoming => "Upcoming",
            MatchStatus::InProgress => "In Progress",
            MatchStatus::Finished => "Finished",
        }
    }

    /// Parse the display form used in documents and query strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Upcoming" | "upcoming" => Some(MatchStatus::Upcoming),
            "In Progress" | "in_progress" | "in-progress" => Some(MatchStatus::InProgress),
            "Finished" | "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }
}

/// What the toss winner chose to do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TossDecision {
    Bat,
    Bowl,
}

/// Tag recorded on every timeline entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BallEvent {
    Run,
    Wide,
    #[serde(rename = "No Ball")]
    NoBall,
    Bye,
    #[serde(rename = "Leg Bye")]
    LegBye,
    Wicket,
}

impl BallEvent {
    /// Metric label for this tag.
    pub fn label(&self) -> &'static str {
        match self {
            BallEvent::Run => "run",
            BallEvent::Wide => "wide",
            BallEvent::NoBall => "no_ball",
            BallEvent::Bye => "bye",
            BallEvent::LegBye => "leg_bye",
            BallEvent::Wicket => "wicket",
        }
    }
}

/// How a batsman was dismissed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DismissalType {
    Bowled,
    Caught,
    #[serde(rename = "LBW")]
    Lbw,
    #[serde(rename = "Run Out")]
    RunOut,
    Stumped,
}

impl DismissalType {
    /// Whether the bowler is credited with the wicket.
    pub fn credits_bowler(&self) -> bool {
        !matches!(self, DismissalType::RunOut)
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// Dismissal detail attached to a wicket ball.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WicketDetail {
    pub player_id: String,
    #[serde(rename = "type")]
    pub kind: DismissalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assisting_player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_assisting_player_id: Option<String>,
}

/// One entry in an innings timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    /// 1-6 for a legal delivery, 0 for one that is bowled again.
    pub ball_number: u32,
    pub over_number: u32,
    /// Runs off the bat (or run by the batsmen on a dismissal).
    pub runs: u32,
    pub extras: u32,
    pub event: Option<BallEvent>,
    /// Striker who faced the delivery.
    pub batsman_id: String,
    pub bowler_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wicket: Option<WicketDetail>,
}

impl Ball {
    pub fn is_legal(&self) -> bool {
        self.ball_number > 0
    }

    /// Runs this delivery added to the total.
    pub fn total(&self) -> u32 {
        self.runs + self.extras
    }
}

// ============================================================================
// Per-innings figures
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatsmanStats {
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_reason: Option<String>,
}

impl BatsmanStats {
    /// Whether the player walked out to bat at all.
    pub fn has_batted(&self) -> bool {
        self.balls > 0 || self.is_out || self.retirement_reason.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BowlerStats {
    pub overs: u32,
    /// Legal balls in the current (incomplete) over.
    pub balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
}

impl BowlerStats {
    pub fn total_balls(&self) -> u32 {
        self.overs * 6 + self.balls
    }
}

/// Score and over at which a wicket fell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FallOfWicket {
    pub score: u32,
    pub wicket: u32,
    /// Over number plus completed legal balls in tenths (3 overs 2 balls is 3.2).
    pub over: f64,
    pub player_id: String,
}

// ============================================================================
// Innings and match
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inning {
    pub batting_team_id: String,
    pub bowling_team_id: String,
    pub score: u32,
    pub wickets: u32,
    pub overs: u32,
    pub balls: u32,
    pub timeline: Vec<Ball>,
    pub batsman_stats: BTreeMap<String, BatsmanStats>,
    pub bowler_stats: BTreeMap<String, BowlerStats>,
    pub on_strike_batsman_id: String,
    pub non_strike_batsman_id: String,
    pub current_bowler_id: String,
    pub fall_of_wickets: Vec<FallOfWicket>,
    #[serde(default)]
    pub awaiting_next_bowler: bool,
}

impl Inning {
    /// Fresh innings with zeroed figures for every squad member.
    pub fn new(
        batting_team_id: &str,
        bowling_team_id: &str,
        batting_players: &[String],
        bowling_players: &[String],
    ) -> Self {
        Self {
            batting_team_id: batting_team_id.to_string(),
            bowling_team_id: bowling_team_id.to_string(),
            score: 0,
            wickets: 0,
            overs: 0,
            balls: 0,
            timeline: Vec::new(),
            batsman_stats: batting_players
                .iter()
                .map(|id| (id.clone(), BatsmanStats::default()))
                .collect(),
            bowler_stats: bowling_players
                .iter()
                .map(|id| (id.clone(), BowlerStats::default()))
                .collect(),
            on_strike_batsman_id: String::new(),
            non_strike_batsman_id: String::new(),
            current_bowler_id: String::new(),
            fall_of_wickets: Vec::new(),
            awaiting_next_bowler: false,
        }
    }

    pub fn legal_balls(&self) -> u32 {
        self.overs * 6 + self.balls
    }

    /// Whether the player is one of the two batsmen at the crease.
    pub fn at_crease(&self, player_id: &str) -> bool {
        self.on_strike_batsman_id == player_id || self.non_strike_batsman_id == player_id
    }

    pub fn swap_strike(&mut self) {
        std::mem::swap(
            &mut self.on_strike_batsman_id,
            &mut self.non_strike_batsman_id,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub team_a_id: String,
    pub team_b_id: String,
    pub team_a_players: Vec<String>,
    pub team_b_players: Vec<String>,
    pub settings: MatchSettings,
    pub status: MatchStatus,
    pub inning1: Inning,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inning2: Option<Inning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
}

impl Match {
    pub fn is_second_innings(&self) -> bool {
        self.inning2.is_some()
    }

    /// The innings currently being played (or the last one played).
    pub fn current_inning(&self) -> &Inning {
        self.inning2.as_ref().unwrap_or(&self.inning1)
    }

    pub fn current_inning_mut(&mut self) -> &mut Inning {
        match self.inning2 {
            Some(ref mut inning) => inning,
            None => &mut self.inning1,
        }
    }

    /// Selected squad for a team in this match.
    pub fn squad(&self, team_id: &str) -> &[String] {
        if team_id == self.team_a_id {
            &self.team_a_players
        } else {
            &self.team_b_players
        }
    }

    /// Every player selected by either side.
    pub fn all_players(&self) -> impl Iterator<Item = &String> {
        self.team_a_players.iter().chain(self.team_b_players.iter())
    }

    pub fn innings(&self) -> impl Iterator<Item = &Inning> {
        std::iter::once(&self.inning1).chain(self.inning2.iter())
    }
}

/// Read-only lookup of team display names.
pub trait TeamDirectory {
    fn team_name(&self, team_id: &str) -> Option<&str>;
}

impl TeamDirectory for std::collections::HashMap<String, String> {
    fn team_name(&self, team_id: &str) -> Option<&str> {
        self.get(team_id).map(String::as_str)
    }
}

impl TeamDirectory for [crate::roster::Team] {
    fn team_name(&self, team_id: &str) -> Option<&str> {
        self.iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }
}

impl TeamDirectory for Vec<crate::roster::Team> {
    fn team_name(&self, team_id: &str) -> Option<&str> {
        self.as_slice().team_name(team_id)
    }
}
