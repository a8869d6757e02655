//! Match settings and the wide/no-ball re-bowl rules.

use serde::{Deserialize, Serialize};

use super::types::TossDecision;
use super::ScoringError;

/// When a wide or no-ball has to be bowled again.
///
/// Each variant is one of the mutually exclusive choices a scorer can make
/// per extra type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum RebowlRule {
    /// Every wide/no-ball is bowled again.
    #[default]
    Always,
    /// Wides/no-balls count as legal deliveries.
    Never,
    /// Bowled again only when it would have been the sixth legal ball.
    LastBallOfOver,
    /// Bowled again only in the final over, for a one-run penalty.
    AllInLastOver,
}

/// Outcome of applying a [`RebowlRule`] to a single delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebowlDecision {
    pub rebowl: bool,
    /// The base penalty drops to a single run.
    pub single_run_penalty: bool,
}

impl RebowlRule {
    /// Decide for a delivery given where it falls in the innings.
    pub fn decide(self, is_last_over: bool, is_last_legal_ball: bool) -> RebowlDecision {
        match self {
            RebowlRule::Always => RebowlDecision {
                rebowl: true,
                single_run_penalty: false,
            },
            RebowlRule::Never => RebowlDecision {
                rebowl: false,
                single_run_penalty: false,
            },
            RebowlRule::LastBallOfOver => RebowlDecision {
                rebowl: is_last_legal_ball,
                single_run_penalty: false,
            },
            RebowlRule::AllInLastOver => RebowlDecision {
                rebowl: is_last_over,
                single_run_penalty: is_last_over,
            },
        }
    }

    /// Map the three independent legacy toggles onto a rule.
    ///
    /// "All in last over" wins over "last ball of over", which wins over the
    /// plain flag. A missing plain flag means re-bowl.
    pub fn from_flags(
        plain: Option<bool>,
        last_ball_of_over: Option<bool>,
        all_in_last_over: Option<bool>,
    ) -> Self {
        if all_in_last_over.unwrap_or(false) {
            RebowlRule::AllInLastOver
        } else if last_ball_of_over.unwrap_or(false) {
            RebowlRule::LastBallOfOver
        } else if plain.unwrap_or(true) {
            RebowlRule::Always
        } else {
            RebowlRule::Never
        }
    }
}

/// Match configuration chosen at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "SettingsDocument")]
pub struct MatchSettings {
    pub overs: u32,
    pub players_per_team: u32,
    pub toss_winner_team_id: String,
    pub decision: TossDecision,
    pub wide_rule: RebowlRule,
    pub no_ball_rule: RebowlRule,
    pub wide_runs: u32,
    pub no_ball_runs: u32,
}

impl MatchSettings {
    pub fn new(
        overs: u32,
        players_per_team: u32,
        toss_winner_team_id: impl Into<String>,
        decision: TossDecision,
    ) -> Self {
        Self {
            overs,
            players_per_team,
            toss_winner_team_id: toss_winner_team_id.into(),
            decision,
            wide_rule: RebowlRule::default(),
            no_ball_rule: RebowlRule::default(),
            wide_runs: DEFAULT_PENALTY_RUNS,
            no_ball_runs: DEFAULT_PENALTY_RUNS,
        }
    }

    pub fn with_wide_rule(mut self, rule: RebowlRule) -> Self {
        self.wide_rule = rule;
        self
    }

    pub fn with_no_ball_rule(mut self, rule: RebowlRule) -> Self {
        self.no_ball_rule = rule;
        self
    }

    pub fn with_penalties(mut self, wide_runs: u32, no_ball_runs: u32) -> Self {
        self.wide_runs = wide_runs;
        self.no_ball_runs = no_ball_runs;
        self
    }

    /// Wickets that end an innings (one batsman is always left not out).
    pub fn wickets_allowed(&self) -> u32 {
        self.players_per_team.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.overs < 1 {
            return Err(ScoringError::InvalidSettings(
                "a match needs at least one over".to_string(),
            ));
        }
        if self.players_per_team < 2 {
            return Err(ScoringError::InvalidSettings(
                "a team needs at least two players".to_string(),
            ));
        }
        Ok(())
    }
}

const DEFAULT_PENALTY_RUNS: u32 = 2;

fn default_overs() -> u32 {
    20
}

fn default_players() -> u32 {
    11
}

fn default_penalty_runs() -> u32 {
    DEFAULT_PENALTY_RUNS
}

/// Wire shape accepted when reading settings.
///
/// Current documents carry `wideRule`/`noBallRule`; older snapshots carry the
/// three boolean toggles per extra type instead.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsDocument {
    #[serde(default = "default_overs")]
    overs: u32,
    #[serde(default = "default_players")]
    players_per_team: u32,
    #[serde(default)]
    toss_winner_team_id: String,
    #[serde(default = "default_decision")]
    decision: TossDecision,
    #[serde(default)]
    wide_rule: Option<RebowlRule>,
    #[serde(default)]
    no_ball_rule: Option<RebowlRule>,
    #[serde(default = "default_penalty_runs")]
    wide_runs: u32,
    #[serde(default = "default_penalty_runs")]
    no_ball_runs: u32,
    #[serde(default)]
    rebowl_wide: Option<bool>,
    #[serde(default)]
    rebowl_wide_last_ball_of_over: Option<bool>,
    #[serde(default)]
    rebowl_wide_all_in_last_over: Option<bool>,
    #[serde(default)]
    rebowl_no_ball: Option<bool>,
    #[serde(default)]
    rebowl_no_ball_last_ball_of_over: Option<bool>,
    #[serde(default)]
    rebowl_no_ball_all_in_last_over: Option<bool>,
}

fn default_decision() -> TossDecision {
    TossDecision::Bat
}

impl From<SettingsDocument> for MatchSettings {
    fn from(doc: SettingsDocument) -> Self {
        let wide_rule = doc.wide_rule.unwrap_or_else(|| {
            RebowlRule::from_flags(
                doc.rebowl_wide,
                doc.rebowl_wide_last_ball_of_over,
                doc.rebowl_wide_all_in_last_over,
            )
        });
        let no_ball_rule = doc.no_ball_rule.unwrap_or_else(|| {
            RebowlRule::from_flags(
                doc.rebowl_no_ball,
                doc.rebowl_no_ball_last_ball_of_over,
                doc.rebowl_no_ball_all_in_last_over,
            )
        });

        Self {
            overs: doc.overs,
            players_per_team: doc.players_per_team,
            toss_winner_team_id: doc.toss_winner_team_id,
            decision: doc.decision,
            wide_rule,
            no_ball_rule,
            wide_runs: doc.wide_runs,
            no_ball_runs: doc.no_ball_runs,
        }
    }
}
