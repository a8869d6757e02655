//! Read-only figures derived from a match: run rates, chase equation,
//! dismissal text, extras breakdown and the full scorecard.

use std::collections::HashMap;

use serde::Serialize;

use super::settings::MatchSettings;
use super::types::{
    Ball, BallEvent, DismissalType, FallOfWicket, Inning, Match, MatchStatus, TeamDirectory,
};
use crate::roster::Player;

const UNKNOWN_PLAYER: &str = "Unknown Player";
const UNKNOWN_TEAM: &str = "Unknown Team";

/// Read-only lookup of player display names.
pub trait PlayerDirectory {
    fn player_name(&self, player_id: &str) -> Option<&str>;
}

impl PlayerDirectory for HashMap<String, String> {
    fn player_name(&self, player_id: &str) -> Option<&str> {
        self.get(player_id).map(String::as_str)
    }
}

impl PlayerDirectory for [Player] {
    fn player_name(&self, player_id: &str) -> Option<&str> {
        self.iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.as_str())
    }
}

impl PlayerDirectory for Vec<Player> {
    fn player_name(&self, player_id: &str) -> Option<&str> {
        self.as_slice().player_name(player_id)
    }
}

fn player_name<P: PlayerDirectory + ?Sized>(players: &P, id: &str) -> String {
    players.player_name(id).unwrap_or(UNKNOWN_PLAYER).to_string()
}

// ============================================================================
// Rates and the chase equation
// ============================================================================

/// `O.B` over notation.
pub fn format_overs(overs: u32, balls: u32) -> String {
    format!("{}.{}", overs, balls)
}

/// Two-decimal rendering used for every rate.
pub fn format_rate(value: f64) -> String {
    format!("{:.2}", value)
}

/// Runs per over so far (0 before the first legal ball).
pub fn current_run_rate(inning: &Inning) -> f64 {
    if inning.legal_balls() == 0 {
        return 0.0;
    }
    let overs = f64::from(inning.overs) + f64::from(inning.balls) / 6.0;
    f64::from(inning.score) / overs
}

/// Runs per 100 balls, `"0.00"` when no balls were faced.
pub fn strike_rate(runs: u32, balls: u32) -> String {
    if balls == 0 {
        return "0.00".to_string();
    }
    format_rate(f64::from(runs) / f64::from(balls) * 100.0)
}

/// Runs conceded per six legal balls, `"0.00"` when none were bowled.
pub fn economy(runs_conceded: u32, balls: u32) -> String {
    if balls == 0 {
        return "0.00".to_string();
    }
    format_rate(f64::from(runs_conceded) / f64::from(balls) * 6.0)
}

/// Score needed to win, once the chase has begun.
pub fn target(m: &Match) -> Option<u32> {
    m.inning2.as_ref().map(|_| m.inning1.score + 1)
}

pub fn runs_required(m: &Match) -> Option<u32> {
    let chase = m.inning2.as_ref()?;
    Some((m.inning1.score + 1).saturating_sub(chase.score))
}

pub fn balls_remaining(m: &Match) -> Option<u32> {
    let chase = m.inning2.as_ref()?;
    Some((m.settings.overs * 6).saturating_sub(chase.legal_balls()))
}

/// Runs per over needed to win (0 when nothing is required or no balls remain).
pub fn required_run_rate(m: &Match) -> f64 {
    match (runs_required(m), balls_remaining(m)) {
        (Some(runs), Some(balls)) if runs > 0 && balls > 0 => {
            f64::from(runs) / f64::from(balls) * 6.0
        }
        _ => 0.0,
    }
}

/// Final total if the current rate holds for the full allocation of overs.
pub fn projected_score(m: &Match) -> u32 {
    (current_run_rate(m.current_inning()) * f64::from(m.settings.overs)).round() as u32
}

// ============================================================================
// Dismissals and extras
// ============================================================================

/// How a batsman's innings ended, as printed on a scorecard.
pub fn dismissal_text<P>(inning: &Inning, batsman_id: &str, players: &P) -> String
where
    P: PlayerDirectory + ?Sized,
{
    if let Some(reason) = inning
        .batsman_stats
        .get(batsman_id)
        .and_then(|s| s.retirement_reason.as_ref())
    {
        return reason.clone();
    }

    let Some((ball, wicket)) = inning.timeline.iter().find_map(|b| {
        b.wicket
            .as_ref()
            .filter(|w| w.player_id == batsman_id)
            .map(|w| (b, w))
    }) else {
        return "not out".to_string();
    };

    let bowler = player_name(players, &ball.bowler_id);
    let fielder = |id: &Option<String>| id.as_deref().map(|id| player_name(players, id));

    match wicket.kind {
        DismissalType::Bowled => format!("b {}", bowler),
        DismissalType::Lbw => format!("lbw b {}", bowler),
        DismissalType::Caught => match fielder(&wicket.assisting_player_id) {
            Some(catcher) if catcher == bowler => format!("c & b {}", bowler),
            Some(catcher) => format!("c {} b {}", catcher, bowler),
            None => format!("caught b {}", bowler),
        },
        DismissalType::Stumped => {
            let keeper = fielder(&wicket.assisting_player_id);
            format!("st {} b {}", keeper.as_deref().unwrap_or("wk"), bowler)
        }
        DismissalType::RunOut => {
            let fielders: Vec<String> = [
                &wicket.assisting_player_id,
                &wicket.second_assisting_player_id,
            ]
            .into_iter()
            .filter_map(fielder)
            .collect();
            if fielders.is_empty() {
                "run out".to_string()
            } else {
                format!("run out ({})", fielders.join("/"))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExtrasBreakdown {
    /// Number of wides bowled
    pub wides: u32,
    /// Number of no-balls bowled
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
    pub total: u32,
}

pub fn extras_breakdown(inning: &Inning) -> ExtrasBreakdown {
    inning
        .timeline
        .iter()
        .fold(ExtrasBreakdown::default(), |mut acc, ball| {
            match ball.event {
                Some(BallEvent::Wide) => acc.wides += 1,
                Some(BallEvent::NoBall) => acc.no_balls += 1,
                Some(BallEvent::Bye) => acc.byes += ball.extras,
                Some(BallEvent::LegBye) => acc.leg_byes += ball.extras,
                _ => {}
            }
            acc.total += ball.extras;
            acc
        })
}

/// Batting-side players who never came to the crease, in squad order.
pub fn did_not_bat<'a>(m: &'a Match, inning: &Inning) -> Vec<&'a str> {
    m.squad(&inning.batting_team_id)
        .iter()
        .filter(|id| {
            inning
                .batsman_stats
                .get(id.as_str())
                .map(|s| !s.has_batted() && !inning.at_crease(id))
                .unwrap_or(true)
        })
        .map(String::as_str)
        .collect()
}

/// Compact label for a ball in the over-by-over view (empty for a dot).
pub fn ball_label(ball: &Ball, settings: &MatchSettings) -> String {
    let plus = |n: u32| {
        if n > 0 {
            format!("+{}", n)
        } else {
            String::new()
        }
    };

    match ball.event {
        Some(BallEvent::Wicket) => format!("W{}", plus(ball.runs)),
        Some(BallEvent::Wide) => {
            format!("Wd{}", plus(ball.extras.saturating_sub(settings.wide_runs)))
        }
        Some(BallEvent::NoBall) => format!(
            "Nb{}",
            plus((ball.runs + ball.extras).saturating_sub(settings.no_ball_runs))
        ),
        Some(BallEvent::Bye) => format!("{}b", ball.extras),
        Some(BallEvent::LegBye) => format!("{}lb", ball.extras),
        _ if ball.runs == 0 && ball.extras == 0 => String::new(),
        _ => ball.runs.to_string(),
    }
}

// ============================================================================
// Scorecard
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BattingLine {
    pub player_id: String,
    pub name: String,
    pub dismissal: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BowlingLine {
    pub player_id: String,
    pub name: String,
    pub overs: String,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub wides: u32,
    pub no_balls: u32,
    pub economy: String,
}

/// One over of the ball-by-ball view.
#[derive(Debug, Clone, Serialize)]
pub struct OverSummary {
    /// 1-based, as displayed
    pub over: u32,
    pub bowler_id: String,
    pub bowler: String,
    pub runs: u32,
    pub balls: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InningsCard {
    pub batting_team_id: String,
    pub batting_team: String,
    pub score: u32,
    pub wickets: u32,
    pub overs: String,
    pub run_rate: String,
    pub batting: Vec<BattingLine>,
    pub extras: ExtrasBreakdown,
    pub did_not_bat: Vec<String>,
    pub bowling: Vec<BowlingLine>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub overs_detail: Vec<OverSummary>,
}

/// Chase equation and projections for a match in play.
#[derive(Debug, Clone, Serialize)]
pub struct LiveSummary {
    pub current_run_rate: String,
    pub projected_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs_required: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balls_remaining: Option<u32>,
    pub required_run_rate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    pub match_id: String,
    pub title: String,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub innings: Vec<InningsCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<LiveSummary>,
}

impl Scorecard {
    pub fn build<P, T>(m: &Match, players: &P, teams: &T) -> Self
    where
        P: PlayerDirectory + ?Sized,
        T: TeamDirectory + ?Sized,
    {
        let team_name = |id: &str| teams.team_name(id).unwrap_or(UNKNOWN_TEAM).to_string();

        let live = (m.status == MatchStatus::InProgress).then(|| LiveSummary {
            current_run_rate: format_rate(current_run_rate(m.current_inning())),
            projected_score: projected_score(m),
            target: target(m),
            runs_required: runs_required(m),
            balls_remaining: balls_remaining(m),
            required_run_rate: format_rate(required_run_rate(m)),
        });

        Self {
            match_id: m.id.clone(),
            title: format!("{} vs {}", team_name(&m.team_a_id), team_name(&m.team_b_id)),
            status: m.status,
            result: m.result_text.clone(),
            innings: m
                .innings()
                .map(|inning| innings_card(m, inning, players, &team_name))
                .collect(),
            live,
        }
    }
}

fn innings_card<P, F>(m: &Match, inning: &Inning, players: &P, team_name: &F) -> InningsCard
where
    P: PlayerDirectory + ?Sized,
    F: Fn(&str) -> String,
{
    let batting = m
        .squad(&inning.batting_team_id)
        .iter()
        .filter_map(|id| {
            let stats = inning.batsman_stats.get(id)?;
            if !stats.has_batted() && !inning.at_crease(id) {
                return None;
            }
            Some(BattingLine {
                player_id: id.clone(),
                name: player_name(players, id),
                dismissal: dismissal_text(inning, id, players),
                runs: stats.runs,
                balls: stats.balls,
                fours: stats.fours,
                sixes: stats.sixes,
                strike_rate: strike_rate(stats.runs, stats.balls),
            })
        })
        .collect();

    let bowling = m
        .squad(&inning.bowling_team_id)
        .iter()
        .filter_map(|id| {
            let stats = inning.bowler_stats.get(id)?;
            if stats.total_balls() == 0 {
                return None;
            }
            let bowled = inning.timeline.iter().filter(|b| &b.bowler_id == id);
            let (wides, no_balls) = bowled.fold((0, 0), |(wd, nb), b| match b.event {
                Some(BallEvent::Wide) => (wd + 1, nb),
                Some(BallEvent::NoBall) => (wd, nb + 1),
                _ => (wd, nb),
            });
            Some(BowlingLine {
                player_id: id.clone(),
                name: player_name(players, id),
                overs: format_overs(stats.overs, stats.balls),
                maidens: stats.maidens,
                runs: stats.runs_conceded,
                wickets: stats.wickets,
                wides,
                no_balls,
                economy: economy(stats.runs_conceded, stats.total_balls()),
            })
        })
        .collect();

    InningsCard {
        batting_team_id: inning.batting_team_id.clone(),
        batting_team: team_name(&inning.batting_team_id),
        score: inning.score,
        wickets: inning.wickets,
        overs: format_overs(inning.overs, inning.balls),
        run_rate: format_rate(current_run_rate(inning)),
        batting,
        extras: extras_breakdown(inning),
        did_not_bat: did_not_bat(m, inning)
            .into_iter()
            .map(|id| player_name(players, id))
            .collect(),
        bowling,
        fall_of_wickets: inning.fall_of_wickets.clone(),
        overs_detail: over_summaries(inning, &m.settings, players),
    }
}

/// Ball-by-ball view grouped by over, most recent first.
pub fn over_summaries<P>(inning: &Inning, settings: &MatchSettings, players: &P) -> Vec<OverSummary>
where
    P: PlayerDirectory + ?Sized,
{
    let mut overs: Vec<OverSummary> = Vec::new();
    for ball in &inning.timeline {
        match overs.last_mut() {
            Some(over) if over.over == ball.over_number + 1 => {
                over.runs += ball.total();
                over.balls.push(ball_label(ball, settings));
            }
            _ => overs.push(OverSummary {
                over: ball.over_number + 1,
                bowler_id: ball.bowler_id.clone(),
                bowler: player_name(players, &ball.bowler_id),
                runs: ball.total(),
                balls: vec![ball_label(ball, settings)],
            }),
        }
    }
    overs.reverse();
    overs
}
