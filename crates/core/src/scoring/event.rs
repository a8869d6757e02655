//! A single ball as reported by the scorer.

use serde::{Deserialize, Serialize};

use super::types::{BallEvent, DismissalType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtraType {
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl ExtraType {
    pub fn ball_event(&self) -> BallEvent {
        match self {
            ExtraType::Wide => BallEvent::Wide,
            ExtraType::NoBall => BallEvent::NoBall,
            ExtraType::Bye => BallEvent::Bye,
            ExtraType::LegBye => BallEvent::LegBye,
        }
    }
}

/// Input to the delivery processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DeliveryEvent {
    /// Runs off the bat (0 is a dot ball).
    Run { runs: u32 },

    /// Wide, no-ball, bye or leg-bye with any runs taken on it.
    Extra {
        extra_type: ExtraType,
        #[serde(default)]
        runs: u32,
        /// No-ball only: the runs were hit off the bat.
        #[serde(default)]
        runs_off_bat: bool,
    },

    Wicket {
        dismissal_type: DismissalType,
        dismissed_player_id: String,
        #[serde(default)]
        next_batsman_id: Option<String>,
        /// Runs completed before the dismissal.
        #[serde(default)]
        runs: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assisting_player_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_assisting_player_id: Option<String>,
    },
}

impl DeliveryEvent {
    pub fn run(runs: u32) -> Self {
        DeliveryEvent::Run { runs }
    }

    pub fn extra(extra_type: ExtraType, runs: u32) -> Self {
        DeliveryEvent::Extra {
            extra_type,
            runs,
            runs_off_bat: false,
        }
    }

    pub fn no_ball_off_bat(runs: u32) -> Self {
        DeliveryEvent::Extra {
            extra_type: ExtraType::NoBall,
            runs,
            runs_off_bat: true,
        }
    }

    pub fn wicket(
        dismissal_type: DismissalType,
        dismissed_player_id: impl Into<String>,
        next_batsman_id: Option<&str>,
    ) -> Self {
        DeliveryEvent::Wicket {
            dismissal_type,
            dismissed_player_id: dismissed_player_id.into(),
            next_batsman_id: next_batsman_id.map(str::to_string),
            runs: 0,
            assisting_player_id: None,
            second_assisting_player_id: None,
        }
    }

    /// Attach fielders to a wicket event; other events are returned as-is.
    pub fn with_fielders(mut self, first: Option<&str>, second: Option<&str>) -> Self {
        if let DeliveryEvent::Wicket {
            ref mut assisting_player_id,
            ref mut second_assisting_player_id,
            ..
        } = self
        {
            *assisting_player_id = first.map(str::to_string);
            *second_assisting_player_id = second.map(str::to_string);
        }
        self
    }

    /// Runs reported with the event, before penalties.
    pub fn reported_runs(&self) -> u32 {
        match self {
            DeliveryEvent::Run { runs }
            | DeliveryEvent::Extra { runs, .. }
            | DeliveryEvent::Wicket { runs, .. } => *runs,
        }
    }
}
