use serde::{Deserialize, Serialize};

/// Playing role shown on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerRole {
    Batsman,
    Bowler,
    #[default]
    #[serde(rename = "All-Rounder")]
    AllRounder,
    #[serde(rename = "Wicket-Keeper")]
    WicketKeeper,
}

impl PlayerRole {
    pub const ALL: [PlayerRole; 4] = [
        PlayerRole::Batsman,
        PlayerRole::Bowler,
        PlayerRole::AllRounder,
        PlayerRole::WicketKeeper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRole::Batsman => "Batsman",
            PlayerRole::Bowler => "Bowler",
            PlayerRole::AllRounder => "All-Rounder",
            PlayerRole::WicketKeeper => "Wicket-Keeper",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: PlayerRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub player_ids: Vec<String>,
}

impl Team {
    pub fn has_player(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }
}

/// Request to register a player.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub role: PlayerRole,
}

/// Request to create a team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub player_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&PlayerRole::WicketKeeper).unwrap();
        assert_eq!(json, "\"Wicket-Keeper\"");
        let role: PlayerRole = serde_json::from_str("\"All-Rounder\"").unwrap();
        assert_eq!(role, PlayerRole::AllRounder);
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(PlayerRole::parse(" wicket-keeper "), Some(PlayerRole::WicketKeeper));
        assert_eq!(PlayerRole::parse("BOWLER"), Some(PlayerRole::Bowler));
        assert_eq!(PlayerRole::parse("captain"), None);
    }

    #[test]
    fn test_team_uses_camel_case() {
        let team = Team {
            id: "t1".to_string(),
            name: "Lions".to_string(),
            player_ids: vec!["p1".to_string()],
        };
        let value = serde_json::to_value(&team).unwrap();
        assert_eq!(value["playerIds"][0], "p1");
        assert!(team.has_player("p1"));
    }
}
