//! SQLite-backed match store. Matches are kept as JSON documents.

use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use super::{MatchError, MatchFilter, MatchStore};
use crate::scoring::{Match, MatchStatus};

pub struct SqliteMatchStore {
    conn: Mutex<Connection>,
}

fn db_error(e: rusqlite::Error) -> MatchError {
    MatchError::Database(e.to_string())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_document(m: &Match) -> Result<String, MatchError> {
    serde_json::to_string(m).map_err(|e| MatchError::Corrupt {
        id: m.id.clone(),
        message: e.to_string(),
    })
}

fn from_document(id: &str, json: &str) -> Result<Match, MatchError> {
    serde_json::from_str(json).map_err(|e| MatchError::Corrupt {
        id: id.to_string(),
        message: e.to_string(),
    })
}

impl SqliteMatchStore {
    pub fn new(path: &Path) -> Result<Self, MatchError> {
        let conn = Connection::open(path).map_err(db_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, MatchError> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), MatchError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status);
            CREATE INDEX IF NOT EXISTS idx_matches_created_at ON matches(created_at);

            CREATE TABLE IF NOT EXISTS match_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id TEXT NOT NULL,
                snapshot TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_match_history_match ON match_history(match_id, id);
            "#,
        )
        .map_err(db_error)
    }

    fn build_where_clause(filter: &MatchFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn query_document(conn: &Connection, id: &str) -> Result<Option<Match>, MatchError> {
        let result = conn.query_row(
            "SELECT document FROM matches WHERE id = ?",
            params![id],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(json) => from_document(id, &json).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_error(e)),
        }
    }

    fn write_document(conn: &Connection, m: &Match) -> Result<(), MatchError> {
        let changed = conn
            .execute(
                "UPDATE matches SET status = ?, document = ?, updated_at = ? WHERE id = ?",
                params![m.status.as_str(), to_document(m)?, timestamp(), m.id],
            )
            .map_err(db_error)?;
        if changed == 0 {
            return Err(MatchError::NotFound(m.id.clone()));
        }
        Ok(())
    }

    /// Append a snapshot and trim the match's history to `depth` entries.
    fn insert_snapshot(
        conn: &Connection,
        match_id: &str,
        snapshot: &Match,
        depth: usize,
    ) -> Result<(), MatchError> {
        conn.execute(
            "INSERT INTO match_history (match_id, snapshot, created_at) VALUES (?, ?, ?)",
            params![match_id, to_document(snapshot)?, timestamp()],
        )
        .map_err(db_error)?;

        if depth > 0 {
            let trimmed = conn
                .execute(
                    "DELETE FROM match_history WHERE match_id = ?1 AND id NOT IN \
                     (SELECT id FROM match_history WHERE match_id = ?1 ORDER BY id DESC LIMIT ?2)",
                    params![match_id, depth as i64],
                )
                .map_err(db_error)?;
            if trimmed > 0 {
                debug!(match_id = %match_id, trimmed, "Trimmed undo history");
            }
        }
        Ok(())
    }
}

impl MatchStore for SqliteMatchStore {
    fn create(&self, m: &Match) -> Result<(), MatchError> {
        let conn = self.conn.lock().unwrap();
        if Self::query_document(&conn, &m.id)?.is_some() {
            return Err(MatchError::AlreadyExists(m.id.clone()));
        }
        let now = timestamp();
        conn.execute(
            "INSERT INTO matches (id, status, document, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
            params![m.id, m.status.as_str(), to_document(m)?, now, now],
        )
        .map_err(db_error)?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Match>, MatchError> {
        let conn = self.conn.lock().unwrap();
        Self::query_document(&conn, id)
    }

    fn list(&self, filter: &MatchFilter) -> Result<Vec<Match>, MatchError> {
        let conn = self.conn.lock().unwrap();
        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT id, document FROM matches {} \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut stmt = conn.prepare(&sql).map_err(db_error)?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));
        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_error)?;

        let mut matches = Vec::new();
        for row_result in rows {
            let (id, json) = row_result.map_err(db_error)?;
            matches.push(from_document(&id, &json)?);
        }
        Ok(matches)
    }

    fn count(&self, filter: &MatchFilter) -> Result<i64, MatchError> {
        let conn = self.conn.lock().unwrap();
        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM matches {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(db_error)
    }

    fn count_by_status(&self) -> Result<Vec<(MatchStatus, i64)>, MatchError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM matches GROUP BY status")
            .map_err(db_error)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(db_error)?;

        let mut counts = Vec::new();
        for row_result in rows {
            let (status, count) = row_result.map_err(db_error)?;
            if let Some(status) = MatchStatus::parse(&status) {
                counts.push((status, count));
            }
        }
        Ok(counts)
    }

    fn update(&self, m: &Match) -> Result<(), MatchError> {
        let conn = self.conn.lock().unwrap();
        Self::write_document(&conn, m)
    }

    fn update_with_history(
        &self,
        previous: &Match,
        next: &Match,
        depth: usize,
    ) -> Result<(), MatchError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(db_error)?;
        Self::insert_snapshot(&tx, &previous.id, previous, depth)?;
        Self::write_document(&tx, next)?;
        tx.commit().map_err(db_error)
    }

    fn delete(&self, id: &str) -> Result<Match, MatchError> {
        let mut conn = self.conn.lock().unwrap();
        let m = Self::query_document(&conn, id)?
            .ok_or_else(|| MatchError::NotFound(id.to_string()))?;

        let tx = conn.transaction().map_err(db_error)?;
        tx.execute("DELETE FROM match_history WHERE match_id = ?", params![id])
            .map_err(db_error)?;
        tx.execute("DELETE FROM matches WHERE id = ?", params![id])
            .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        Ok(m)
    }

    fn push_history(
        &self,
        match_id: &str,
        snapshot: &Match,
        depth: usize,
    ) -> Result<(), MatchError> {
        let conn = self.conn.lock().unwrap();
        Self::insert_snapshot(&conn, match_id, snapshot, depth)
    }

    fn pop_history(&self, match_id: &str) -> Result<Option<Match>, MatchError> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT id, snapshot FROM match_history WHERE match_id = ? ORDER BY id DESC LIMIT 1",
            params![match_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        );
        let (row_id, json) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(db_error(e)),
        };

        conn.execute("DELETE FROM match_history WHERE id = ?", params![row_id])
            .map_err(db_error)?;
        from_document(match_id, &json).map(Some)
    }

    fn history_len(&self, match_id: &str) -> Result<usize, MatchError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM match_history WHERE match_id = ?",
                params![match_id],
                |row| row.get(0),
            )
            .map_err(db_error)?;
        Ok(count as usize)
    }
}
