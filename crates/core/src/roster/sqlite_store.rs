//! SQLite-backed roster store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{NewPlayer, NewTeam, Player, PlayerRole, RosterError, RosterStore, Team};

/// SQLite-backed player and team store.
pub struct SqliteRosterStore {
    conn: Mutex<Connection>,
}

fn db_error(e: rusqlite::Error) -> RosterError {
    RosterError::Database(e.to_string())
}

impl SqliteRosterStore {
    /// Open (or create) the roster tables in the given database file.
    pub fn new(path: &Path) -> Result<Self, RosterError> {
        let conn = Connection::open(path).map_err(db_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, RosterError> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RosterError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                player_ids TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_players_name ON players(name);
            CREATE INDEX IF NOT EXISTS idx_teams_name ON teams(name);
            "#,
        )
        .map_err(db_error)
    }

    fn row_to_player(row: &rusqlite::Row) -> rusqlite::Result<Player> {
        let role: String = row.get(2)?;
        Ok(Player {
            id: row.get(0)?,
            name: row.get(1)?,
            role: PlayerRole::parse(&role).unwrap_or_default(),
        })
    }

    fn row_to_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
        let player_ids_json: String = row.get(2)?;
        Ok(Team {
            id: row.get(0)?,
            name: row.get(1)?,
            player_ids: serde_json::from_str(&player_ids_json).unwrap_or_default(),
        })
    }

    fn query_player(conn: &Connection, id: &str) -> Result<Option<Player>, RosterError> {
        let result = conn.query_row(
            "SELECT id, name, role FROM players WHERE id = ?",
            params![id],
            Self::row_to_player,
        );
        match result {
            Ok(player) => Ok(Some(player)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }

    fn query_team(conn: &Connection, id: &str) -> Result<Option<Team>, RosterError> {
        let result = conn.query_row(
            "SELECT id, name, player_ids FROM teams WHERE id = ?",
            params![id],
            Self::row_to_team,
        );
        match result {
            Ok(team) => Ok(Some(team)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }

    fn all_players(conn: &Connection) -> Result<Vec<Player>, RosterError> {
        let mut stmt = conn
            .prepare("SELECT id, name, role FROM players ORDER BY name COLLATE NOCASE, id")
            .map_err(db_error)?;
        let rows = stmt.query_map([], Self::row_to_player).map_err(db_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
    }

    fn all_teams(conn: &Connection) -> Result<Vec<Team>, RosterError> {
        let mut stmt = conn
            .prepare("SELECT id, name, player_ids FROM teams ORDER BY name COLLATE NOCASE, id")
            .map_err(db_error)?;
        let rows = stmt.query_map([], Self::row_to_team).map_err(db_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
    }

    /// SQLite's `lower()` only folds ASCII, so names are compared here.
    fn team_named(conn: &Connection, name: &str) -> Result<Option<Team>, RosterError> {
        let wanted = name.trim().to_lowercase();
        Ok(Self::all_teams(conn)?
            .into_iter()
            .find(|t| t.name.trim().to_lowercase() == wanted))
    }

    fn ensure_unique_team_name(
        conn: &Connection,
        name: &str,
        team_id: Option<&str>,
    ) -> Result<(), RosterError> {
        match Self::team_named(conn, name)? {
            Some(existing) if Some(existing.id.as_str()) != team_id => {
                Err(RosterError::DuplicateTeamName(name.trim().to_string()))
            }
            _ => Ok(()),
        }
    }

    fn ensure_players_exist(conn: &Connection, player_ids: &[String]) -> Result<(), RosterError> {
        for id in player_ids {
            if Self::query_player(conn, id)?.is_none() {
                return Err(RosterError::UnknownPlayer(id.clone()));
            }
        }
        Ok(())
    }

    fn write_team_members(conn: &Connection, team: &Team) -> Result<(), RosterError> {
        let player_ids = serde_json::to_string(&team.player_ids)
            .map_err(|e| RosterError::Database(e.to_string()))?;
        conn.execute(
            "UPDATE teams SET name = ?, player_ids = ? WHERE id = ?",
            params![team.name, player_ids, team.id],
        )
        .map_err(db_error)?;
        Ok(())
    }
}

fn require_name(name: &str, what: &str) -> Result<String, RosterError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RosterError::Validation(format!("{} name cannot be empty", what)));
    }
    Ok(name.to_string())
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

impl RosterStore for SqliteRosterStore {
    fn create_player(&self, request: NewPlayer) -> Result<Player, RosterError> {
        let player = Player {
            id: uuid::Uuid::new_v4().to_string(),
            name: require_name(&request.name, "Player")?,
            role: request.role,
        };
        self.insert_player(&player)?;
        debug!(player_id = %player.id, name = %player.name, "Created player");
        Ok(player)
    }

    fn insert_player(&self, player: &Player) -> Result<(), RosterError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO players (id, name, role, created_at) VALUES (?, ?, ?, ?)",
            params![
                player.id,
                player.name,
                player.role.as_str(),
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(db_error)?;
        Ok(())
    }

    fn get_player(&self, id: &str) -> Result<Option<Player>, RosterError> {
        let conn = self.conn.lock().unwrap();
        Self::query_player(&conn, id)
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, RosterError> {
        let conn = self.conn.lock().unwrap();
        let wanted = name.trim().to_lowercase();
        Ok(Self::all_players(&conn)?
            .into_iter()
            .find(|p| p.name.trim().to_lowercase() == wanted))
    }

    fn list_players(&self) -> Result<Vec<Player>, RosterError> {
        let conn = self.conn.lock().unwrap();
        Self::all_players(&conn)
    }

    fn update_player(&self, player: &Player) -> Result<Player, RosterError> {
        let name = require_name(&player.name, "Player")?;
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "UPDATE players SET name = ?, role = ? WHERE id = ?",
                params![name, player.role.as_str(), player.id],
            )
            .map_err(db_error)?;
        if changed == 0 {
            return Err(RosterError::PlayerNotFound(player.id.clone()));
        }
        Ok(Player {
            name,
            ..player.clone()
        })
    }

    fn delete_player(&self, id: &str) -> Result<Player, RosterError> {
        let mut conn = self.conn.lock().unwrap();
        let player = Self::query_player(&conn, id)?
            .ok_or_else(|| RosterError::PlayerNotFound(id.to_string()))?;

        let tx = conn.transaction().map_err(db_error)?;
        let mut touched = 0;
        for mut team in Self::all_teams(&tx)? {
            if team.has_player(id) {
                team.player_ids.retain(|p| p != id);
                Self::write_team_members(&tx, &team)?;
                touched += 1;
            }
        }
        tx.execute("DELETE FROM players WHERE id = ?", params![id])
            .map_err(db_error)?;
        tx.commit().map_err(db_error)?;

        debug!(player_id = %id, teams = touched, "Deleted player");
        Ok(player)
    }

    fn create_team(&self, request: NewTeam) -> Result<Team, RosterError> {
        let name = require_name(&request.name, "Team")?;
        let team = Team {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            player_ids: dedup_ids(request.player_ids),
        };
        {
            let conn = self.conn.lock().unwrap();
            Self::ensure_players_exist(&conn, &team.player_ids)?;
        }
        self.insert_team(&team)?;
        debug!(
            team_id = %team.id,
            name = %team.name,
            players = team.player_ids.len(),
            "Created team"
        );
        Ok(team)
    }

    fn insert_team(&self, team: &Team) -> Result<(), RosterError> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_unique_team_name(&conn, &team.name, None)?;
        let player_ids = serde_json::to_string(&team.player_ids)
            .map_err(|e| RosterError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO teams (id, name, player_ids, created_at) VALUES (?, ?, ?, ?)",
            params![team.id, team.name, player_ids, Utc::now().to_rfc3339()],
        )
        .map_err(db_error)?;
        Ok(())
    }

    fn get_team(&self, id: &str) -> Result<Option<Team>, RosterError> {
        let conn = self.conn.lock().unwrap();
        Self::query_team(&conn, id)
    }

    fn find_team_by_name(&self, name: &str) -> Result<Option<Team>, RosterError> {
        let conn = self.conn.lock().unwrap();
        Self::team_named(&conn, name)
    }

    fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        let conn = self.conn.lock().unwrap();
        Self::all_teams(&conn)
    }

    fn update_team(&self, team: &Team) -> Result<Team, RosterError> {
        let conn = self.conn.lock().unwrap();
        if Self::query_team(&conn, &team.id)?.is_none() {
            return Err(RosterError::TeamNotFound(team.id.clone()));
        }
        let updated = Team {
            id: team.id.clone(),
            name: require_name(&team.name, "Team")?,
            player_ids: dedup_ids(team.player_ids.clone()),
        };
        Self::ensure_unique_team_name(&conn, &updated.name, Some(&updated.id))?;
        Self::ensure_players_exist(&conn, &updated.player_ids)?;
        Self::write_team_members(&conn, &updated)?;
        Ok(updated)
    }

    fn delete_team(&self, id: &str) -> Result<Team, RosterError> {
        let conn = self.conn.lock().unwrap();
        let team =
            Self::query_team(&conn, id)?.ok_or_else(|| RosterError::TeamNotFound(id.to_string()))?;
        conn.execute("DELETE FROM teams WHERE id = ?", params![id])
            .map_err(db_error)?;
        Ok(team)
    }
}
