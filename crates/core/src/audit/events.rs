use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::DeliveryEvent;

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Roster
    PlayerCreated {
        player_id: String,
        name: String,
        role: String,
    },
    PlayerUpdated {
        player_id: String,
        name: String,
        role: String,
    },
    /// Player removed from the roster and from every team.
    PlayerDeleted {
        player_id: String,
        name: String,
    },
    TeamCreated {
        team_id: String,
        name: String,
        players: usize,
    },
    TeamUpdated {
        team_id: String,
        name: String,
        players: usize,
    },
    TeamDeleted {
        team_id: String,
        name: String,
    },
    RosterImported {
        /// "csv" or "sheet"
        source: String,
        rows: usize,
        players_created: usize,
        players_updated: usize,
        teams_created: usize,
        teams_updated: usize,
    },

    // Match lifecycle
    MatchCreated {
        match_id: String,
        team_a_id: String,
        team_b_id: String,
        overs: u32,
        players_per_team: u32,
    },
    MatchDeleted {
        match_id: String,
    },
    MatchImported {
        match_id: String,
        /// False when a match with the same id already existed.
        added: bool,
    },
    InningsStarted {
        match_id: String,
        innings: u8,
        striker_id: String,
        non_striker_id: String,
        bowler_id: String,
    },
    DeliveryRecorded {
        match_id: String,
        innings: u8,
        delivery: DeliveryEvent,
        score: u32,
        wickets: u32,
        overs: String,
    },
    DeliveryIgnored {
        match_id: String,
        delivery: DeliveryEvent,
    },
    BowlerChanged {
        match_id: String,
        bowler_id: String,
        over: u32,
    },
    BatsmenSwapped {
        match_id: String,
        striker_id: String,
    },
    BatsmanRetired {
        match_id: String,
        retired_id: String,
        replacement_id: String,
        reason: String,
    },
    InningsDeclared {
        match_id: String,
        innings: u8,
        score: u32,
        wickets: u32,
    },
    SettingsUpdated {
        match_id: String,
        overs: u32,
        players_per_team: u32,
    },
    InningsCompleted {
        match_id: String,
        innings: u8,
        score: u32,
        wickets: u32,
    },
    MatchFinished {
        match_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner_team_id: Option<String>,
        result: String,
    },
    UndoApplied {
        match_id: String,
        /// Snapshots still available after this undo.
        remaining: usize,
    },

    // Data management
    BackupRestored {
        players_added: usize,
        teams_added: usize,
        matches_added: usize,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::PlayerCreated { .. } => "player_created",
            Self::PlayerUpdated { .. } => "player_updated",
            Self::PlayerDeleted { .. } => "player_deleted",
            Self::TeamCreated { .. } => "team_created",
            Self::TeamUpdated { .. } => "team_updated",
            Self::TeamDeleted { .. } => "team_deleted",
            Self::RosterImported { .. } => "roster_imported",
            Self::MatchCreated { .. } => "match_created",
            Self::MatchDeleted { .. } => "match_deleted",
            Self::MatchImported { .. } => "match_imported",
            Self::InningsStarted { .. } => "innings_started",
            Self::DeliveryRecorded { .. } => "delivery_recorded",
            Self::DeliveryIgnored { .. } => "delivery_ignored",
            Self::BowlerChanged { .. } => "bowler_changed",
            Self::BatsmenSwapped { .. } => "batsmen_swapped",
            Self::BatsmanRetired { .. } => "batsman_retired",
            Self::InningsDeclared { .. } => "innings_declared",
            Self::SettingsUpdated { .. } => "settings_updated",
            Self::InningsCompleted { .. } => "innings_completed",
            Self::MatchFinished { .. } => "match_finished",
            Self::UndoApplied { .. } => "undo_applied",
            Self::BackupRestored { .. } => "backup_restored",
        }
    }

    /// Extract match_id if this event is about a single match
    pub fn match_id(&self) -> Option<&str> {
        match self {
            Self::MatchCreated { match_id, .. }
            | Self::MatchDeleted { match_id }
            | Self::MatchImported { match_id, .. }
            | Self::InningsStarted { match_id, .. }
            | Self::DeliveryRecorded { match_id, .. }
            | Self::DeliveryIgnored { match_id, .. }
            | Self::BowlerChanged { match_id, .. }
            | Self::BatsmenSwapped { match_id, .. }
            | Self::BatsmanRetired { match_id, .. }
            | Self::InningsDeclared { match_id, .. }
            | Self::SettingsUpdated { match_id, .. }
            | Self::InningsCompleted { match_id, .. }
            | Self::MatchFinished { match_id, .. }
            | Self::UndoApplied { match_id, .. } => Some(match_id),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub match_id: Option<String>,
    pub data: AuditEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_service_started() {
        let event = AuditEvent::ServiceStarted {
            version: "0.1.0".to_string(),
            config_hash: "abc123".to_string(),
        };
        assert_eq!(event.event_type(), "service_started");
        assert_eq!(event.match_id(), None);
    }

    #[test]
    fn test_roster_events_have_no_match() {
        let event = AuditEvent::TeamCreated {
            team_id: "t1".to_string(),
            name: "Lions".to_string(),
            players: 11,
        };
        assert_eq!(event.event_type(), "team_created");
        assert_eq!(event.match_id(), None);
    }

    #[test]
    fn test_match_events_expose_match_id() {
        let event = AuditEvent::DeliveryRecorded {
            match_id: "m-1".to_string(),
            innings: 1,
            delivery: DeliveryEvent::run(4),
            score: 4,
            wickets: 0,
            overs: "0.1".to_string(),
        };
        assert_eq!(event.event_type(), "delivery_recorded");
        assert_eq!(event.match_id(), Some("m-1"));

        let event = AuditEvent::MatchDeleted {
            match_id: "m-2".to_string(),
        };
        assert_eq!(event.match_id(), Some("m-2"));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let event = AuditEvent::MatchFinished {
            match_id: "m-1".to_string(),
            winner_team_id: Some("team-a".to_string()),
            result: "Lions won by 10 runs.".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"match_finished\""));

        let parsed: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "match_finished");
        assert_eq!(parsed.match_id(), Some("m-1"));
    }

    #[test]
    fn test_nested_delivery_keeps_its_own_tag() {
        let event = AuditEvent::DeliveryIgnored {
            match_id: "m-1".to_string(),
            delivery: DeliveryEvent::run(2),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "delivery_ignored");
        assert_eq!(value["delivery"]["type"], "run");
        assert_eq!(value["delivery"]["runs"], 2);
    }
}
