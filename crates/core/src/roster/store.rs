//! Roster storage trait and errors.

use thiserror::Error;

use super::{NewPlayer, NewTeam, Player, Team};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("A team named '{0}' already exists")]
    DuplicateTeamName(String),

    #[error("Unknown player id: {0}")]
    UnknownPlayer(String),

    #[error("Invalid roster data: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Storage for players and teams.
pub trait RosterStore: Send + Sync {
    /// Register a new player with a generated id.
    fn create_player(&self, request: NewPlayer) -> Result<Player, RosterError>;

    /// Store a player that already carries an id (backup restore, match import).
    fn insert_player(&self, player: &Player) -> Result<(), RosterError>;

    fn get_player(&self, id: &str) -> Result<Option<Player>, RosterError>;

    /// Case-insensitive lookup by display name.
    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, RosterError>;

    fn list_players(&self) -> Result<Vec<Player>, RosterError>;

    fn update_player(&self, player: &Player) -> Result<Player, RosterError>;

    /// Delete a player and remove it from every team.
    fn delete_player(&self, id: &str) -> Result<Player, RosterError>;

    /// Create a team. Names are unique ignoring case and every member must exist.
    fn create_team(&self, request: NewTeam) -> Result<Team, RosterError>;

    /// Store a team that already carries an id. Membership is taken as-is.
    fn insert_team(&self, team: &Team) -> Result<(), RosterError>;

    fn get_team(&self, id: &str) -> Result<Option<Team>, RosterError>;

    fn find_team_by_name(&self, name: &str) -> Result<Option<Team>, RosterError>;

    fn list_teams(&self) -> Result<Vec<Team>, RosterError>;

    fn update_team(&self, team: &Team) -> Result<Team, RosterError>;

    fn delete_team(&self, id: &str) -> Result<Team, RosterError>;
}
