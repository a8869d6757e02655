//! The delivery processor.
//!
//! [`apply_delivery`] is a pure transition: it works on a private copy of the
//! match and returns it, leaving the caller's value untouched. A match whose
//! striker, bowler or dismissed batsman has no stats entry is returned
//! unchanged, so callers detect an ignored ball by comparing the two values.

use tracing::{debug, info, warn};

use super::event::{DeliveryEvent, ExtraType};
use super::settings::MatchSettings;
use super::types::{
    Ball, BallEvent, FallOfWicket, Inning, Match, MatchStatus, TeamDirectory, WicketDetail,
};
use crate::metrics;

/// Name used in result text when the directory has no entry for the winner.
const UNKNOWN_TEAM: &str = "Unknown Team";

/// Apply one ball to a match and return the next match state.
pub fn apply_delivery<D>(current: &Match, event: &DeliveryEvent, teams: &D) -> Match
where
    D: TeamDirectory + ?Sized,
{
    let mut next = current.clone();
    match record(&mut next, event, teams) {
        Ok(tag) => {
            metrics::DELIVERIES_APPLIED
                .with_label_values(&[tag.label()])
                .inc();
            next
        }
        Err(reason) => {
            warn!(match_id = %current.id, reason, "Delivery ignored");
            metrics::DELIVERIES_IGNORED.inc();
            current.clone()
        }
    }
}

fn record<D>(m: &mut Match, event: &DeliveryEvent, teams: &D) -> Result<BallEvent, &'static str>
where
    D: TeamDirectory + ?Sized,
{
    if m.status == MatchStatus::Finished {
        return Err("match is already finished");
    }

    let settings = m.settings.clone();
    let target = m.inning2.as_ref().map(|_| m.inning1.score);
    let match_id = m.id.clone();
    let inning = m.current_inning_mut();

    let striker_id = inning.on_strike_batsman_id.clone();
    let bowler_id = inning.current_bowler_id.clone();
    if !inning.batsman_stats.contains_key(&striker_id)
        || !inning.bowler_stats.contains_key(&bowler_id)
    {
        return Err("striker or bowler has no stats entry");
    }
    if let DeliveryEvent::Wicket {
        dismissed_player_id,
        ..
    } = event
    {
        if !inning.batsman_stats.contains_key(dismissed_player_id) {
            return Err("dismissed batsman has no stats entry");
        }
    }

    let is_last_over = inning.overs + 1 == settings.overs;
    let is_last_legal_ball = inning.balls == 5;

    let mut runs = 0;
    let mut extras = 0;
    let mut legal = true;
    let mut wicket = None;

    let tag = match event {
        DeliveryEvent::Run { runs: bat_runs } => {
            runs = *bat_runs;
            credit_bat_runs(inning, &striker_id, runs);
            BallEvent::Run
        }

        DeliveryEvent::Extra {
            extra_type,
            runs: extra_runs,
            runs_off_bat,
        } => {
            match extra_type {
                ExtraType::Wide | ExtraType::NoBall => {
                    let (rule, penalty) = if *extra_type == ExtraType::Wide {
                        (settings.wide_rule, settings.wide_runs)
                    } else {
                        (settings.no_ball_rule, settings.no_ball_runs)
                    };
                    let decision = rule.decide(is_last_over, is_last_legal_ball);
                    legal = !decision.rebowl;
                    extras = if decision.single_run_penalty { 1 } else { penalty };

                    if *extra_type == ExtraType::NoBall && *runs_off_bat {
                        runs = *extra_runs;
                        credit_bat_runs(inning, &striker_id, runs);
                    } else {
                        extras += *extra_runs;
                    }
                }
                ExtraType::Bye | ExtraType::LegBye => extras = *extra_runs,
            }
            extra_type.ball_event()
        }

        DeliveryEvent::Wicket {
            dismissal_type,
            dismissed_player_id,
            next_batsman_id,
            runs: completed,
            assisting_player_id,
            second_assisting_player_id,
        } => {
            runs = *completed;
            credit_bat_runs(inning, &striker_id, runs);

            inning.wickets += 1;
            if let Some(stats) = inning.batsman_stats.get_mut(dismissed_player_id) {
                stats.is_out = true;
            }
            inning.fall_of_wickets.push(FallOfWicket {
                score: inning.score + runs,
                wicket: inning.wickets,
                over: f64::from(inning.overs) + f64::from(inning.balls) / 10.0,
                player_id: dismissed_player_id.clone(),
            });

            if dismissal_type.credits_bowler() {
                if let Some(bowler) = inning.bowler_stats.get_mut(&bowler_id) {
                    bowler.wickets += 1;
                }
            }

            if inning.wickets < settings.wickets_allowed() {
                if let Some(incoming) = next_batsman_id.as_deref().filter(|id| !id.is_empty()) {
                    bring_in(inning, dismissed_player_id, incoming);
                }
            }

            wicket = Some(WicketDetail {
                player_id: dismissed_player_id.clone(),
                kind: *dismissal_type,
                assisting_player_id: assisting_player_id.clone(),
                second_assisting_player_id: second_assisting_player_id.clone(),
            });
            BallEvent::Wicket
        }
    };

    let total = runs + extras;
    inning.score += total;
    if let Some(bowler) = inning.bowler_stats.get_mut(&bowler_id) {
        bowler.runs_conceded += total;
    }

    inning.timeline.push(Ball {
        ball_number: if legal { inning.balls + 1 } else { 0 },
        over_number: inning.overs,
        runs,
        extras,
        event: Some(tag),
        batsman_id: striker_id.clone(),
        bowler_id: bowler_id.clone(),
        wicket,
    });

    if legal {
        if let Some(stats) = inning.batsman_stats.get_mut(&striker_id) {
            stats.balls += 1;
        }
        inning.balls += 1;
        if let Some(bowler) = inning.bowler_stats.get_mut(&bowler_id) {
            bowler.balls += 1;
        }
    }
    let end_of_over = legal && inning.balls == 6;

    debug!(
        match_id = %match_id,
        event = tag.label(),
        runs,
        extras,
        legal,
        score = inning.score,
        wickets = inning.wickets,
        "Delivery recorded"
    );

    // A successful chase ends the match on this ball.
    if let Some(target) = target {
        if inning.score > target {
            if end_of_over {
                roll_over(inning, &bowler_id);
            }
            finish_match(m, teams);
            return Ok(tag);
        }
    }

    // Byes are physically run, so they move the batsmen like bat runs do.
    let rotation_runs = match tag {
        BallEvent::Bye | BallEvent::LegBye => extras,
        _ => runs,
    };
    // Odd runs mid-over, or even runs off the last ball, change ends.
    if (rotation_runs % 2 == 1) != end_of_over {
        inning.swap_strike();
    }

    if end_of_over {
        let over_number = inning.overs;
        let conceded: u32 = inning
            .timeline
            .iter()
            .filter(|b| b.over_number == over_number && b.bowler_id == bowler_id)
            .map(|b| match b.event {
                Some(BallEvent::Wide) | Some(BallEvent::NoBall) => b.extras + b.runs,
                _ => b.runs,
            })
            .sum();
        if conceded == 0 {
            if let Some(bowler) = inning.bowler_stats.get_mut(&bowler_id) {
                bowler.maidens += 1;
            }
        }

        roll_over(inning, &bowler_id);
        if !innings_complete(inning, &settings) {
            inning.awaiting_next_bowler = true;
        }
    }

    if innings_complete(inning, &settings) {
        close_innings(m, teams);
    }

    Ok(tag)
}

fn credit_bat_runs(inning: &mut Inning, striker_id: &str, runs: u32) {
    if let Some(stats) = inning.batsman_stats.get_mut(striker_id) {
        stats.runs += runs;
        match runs {
            4 => stats.fours += 1,
            6 => stats.sixes += 1,
            _ => {}
        }
    }
}

fn roll_over(inning: &mut Inning, bowler_id: &str) {
    inning.overs += 1;
    inning.balls = 0;
    if let Some(bowler) = inning.bowler_stats.get_mut(bowler_id) {
        bowler.overs += 1;
        bowler.balls = 0;
    }
}

fn innings_complete(inning: &Inning, settings: &MatchSettings) -> bool {
    inning.wickets >= settings.wickets_allowed() || inning.overs >= settings.overs
}

/// Put `incoming` at the crease end `outgoing` occupied.
///
/// A returning retired batsman loses the retirement reason.
pub(crate) fn bring_in(inning: &mut Inning, outgoing: &str, incoming: &str) {
    if inning.on_strike_batsman_id == outgoing {
        inning.on_strike_batsman_id = incoming.to_string();
    } else {
        inning.non_strike_batsman_id = incoming.to_string();
    }
    if let Some(stats) = inning.batsman_stats.get_mut(incoming) {
        stats.retirement_reason = None;
    }
}

/// End the current innings: set up the chase, or settle the result.
pub(crate) fn close_innings<D>(m: &mut Match, teams: &D)
where
    D: TeamDirectory + ?Sized,
{
    metrics::INNINGS_COMPLETED.inc();
    metrics::INNINGS_RUNS.observe(f64::from(m.current_inning().score));

    if m.inning2.is_some() {
        finish_match(m, teams);
        return;
    }

    let batting = m.inning1.bowling_team_id.clone();
    let bowling = m.inning1.batting_team_id.clone();
    let mut second = Inning::new(&batting, &bowling, m.squad(&batting), m.squad(&bowling));
    second.awaiting_next_bowler = true;
    m.inning2 = Some(second);
    m.status = MatchStatus::Upcoming;

    info!(
        match_id = %m.id,
        score = m.inning1.score,
        wickets = m.inning1.wickets,
        "First innings complete"
    );
}

fn finish_match<D>(m: &mut Match, teams: &D)
where
    D: TeamDirectory + ?Sized,
{
    let Some(second) = m.inning2.as_ref() else {
        return;
    };
    let first_score = m.inning1.score;
    let name = |team_id: &str| teams.team_name(team_id).unwrap_or(UNKNOWN_TEAM).to_string();

    let (winner, text, kind) = if second.score > first_score {
        let in_hand = m.settings.wickets_allowed().saturating_sub(second.wickets);
        (
            Some(second.batting_team_id.clone()),
            format!("{} won by {} wickets.", name(&second.batting_team_id), in_hand),
            "chased",
        )
    } else if first_score > second.score {
        (
            Some(m.inning1.batting_team_id.clone()),
            format!(
                "{} won by {} runs.",
                name(&m.inning1.batting_team_id),
                first_score - second.score
            ),
            "defended",
        )
    } else {
        (None, "Match Tied.".to_string(), "tied")
    };

    info!(match_id = %m.id, result = %text, "Match finished");
    metrics::MATCHES_FINISHED.with_label_values(&[kind]).inc();

    m.status = MatchStatus::Finished;
    m.winner_team_id = winner;
    m.result_text = Some(text);
}
