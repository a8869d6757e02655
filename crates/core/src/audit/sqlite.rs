//! SQLite audit log, sharing the database file with rosters and matches.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

use super::{AuditError, AuditEvent, AuditFilter, AuditOrder, AuditRecord, AuditStore};

pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

fn db_error(e: rusqlite::Error) -> AuditError {
    AuditError::Database(e.to_string())
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Raw columns of one `audit_events` row.
struct StoredRow {
    id: i64,
    timestamp: String,
    event_type: String,
    match_id: Option<String>,
    data: String,
}

impl StoredRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            event_type: row.get(2)?,
            match_id: row.get(3)?,
            data: row.get(4)?,
        })
    }

    fn into_record(self) -> Result<AuditRecord, AuditError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| AuditError::Database(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);
        let data: AuditEvent = serde_json::from_str(&self.data)
            .map_err(|e| AuditError::Serialization(e.to_string()))?;
        Ok(AuditRecord {
            id: self.id,
            timestamp,
            event_type: self.event_type,
            match_id: self.match_id,
            data,
        })
    }
}

impl SqliteAuditStore {
    /// Open (or create) the database file and the audit table
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        Self::with_connection(Connection::open(path).map_err(db_error)?)
    }

    /// In-memory store for tests
    pub fn in_memory() -> Result<Self, AuditError> {
        Self::with_connection(Connection::open_in_memory().map_err(db_error)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AuditError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS audit_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_type TEXT NOT NULL,
                match_id TEXT,
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_events_timestamp ON audit_events(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_events_match_id ON audit_events(match_id, id);
            CREATE INDEX IF NOT EXISTS idx_audit_events_event_type ON audit_events(event_type);
            "#,
        )
        .map_err(db_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn build_where_clause(filter: &AuditFilter) -> (String, Vec<Value>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut values = Vec::new();

        if let Some(ref match_id) = filter.match_id {
            conditions.push("match_id = ?".to_string());
            values.push(Value::Text(match_id.clone()));
        }

        if !filter.event_types.is_empty() {
            let slots = vec!["?"; filter.event_types.len()].join(", ");
            conditions.push(format!("event_type IN ({})", slots));
            values.extend(filter.event_types.iter().cloned().map(Value::Text));
        }

        if let Some(ref from) = filter.from {
            conditions.push("timestamp >= ?".to_string());
            values.push(Value::Text(format_timestamp(from)));
        }

        if let Some(ref to) = filter.to {
            conditions.push("timestamp <= ?".to_string());
            values.push(Value::Text(format_timestamp(to)));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

impl AuditStore for SqliteAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let data = serde_json::to_string(&record.data)
            .map_err(|e| AuditError::Serialization(e.to_string()))?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO audit_events (timestamp, event_type, match_id, data) VALUES (?, ?, ?, ?)",
            params![
                format_timestamp(&record.timestamp),
                record.event_type,
                record.match_id,
                data,
            ],
        )
        .map_err(db_error)?;

        Ok(conn.last_insert_rowid())
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let (where_clause, mut values) = Self::build_where_clause(filter);
        let direction = match filter.order {
            AuditOrder::NewestFirst => "DESC",
            AuditOrder::OldestFirst => "ASC",
        };
        let sql = format!(
            "SELECT id, timestamp, event_type, match_id, data FROM audit_events {} \
             ORDER BY timestamp {dir}, id {dir} LIMIT ? OFFSET ?",
            where_clause,
            dir = direction
        );
        values.push(Value::Integer(filter.limit));
        values.push(Value::Integer(filter.offset));

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql).map_err(db_error)?;
        let rows = stmt
            .query_map(params_from_iter(values), StoredRow::read)
            .map_err(db_error)?;

        let records = rows
            .map(|row| row.map_err(db_error)?.into_record())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError> {
        let (where_clause, values) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM audit_events {}", where_clause);

        let conn = self.conn.lock().unwrap();
        conn.query_row(&sql, params_from_iter(values), |row| row.get(0))
            .map_err(db_error)
    }
}
