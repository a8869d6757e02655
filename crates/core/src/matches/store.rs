//! Match storage trait and types.

use thiserror::Error;

use crate::scoring::{Match, MatchStatus};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(String),

    #[error("Match already exists: {0}")]
    AlreadyExists(String),

    #[error("Corrupt match document {id}: {message}")]
    Corrupt { id: String, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

/// Filter for querying matches.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    /// Maximum number of results (negative = no limit).
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl MatchFilter {
    pub fn new() -> Self {
        Self {
            status: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Every match, unpaginated.
    pub fn all() -> Self {
        Self::new().with_limit(-1)
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Storage for match documents and their undo history.
pub trait MatchStore: Send + Sync {
    /// Insert a new match. Fails if the id is taken.
    fn create(&self, m: &Match) -> Result<(), MatchError>;

    fn get(&self, id: &str) -> Result<Option<Match>, MatchError>;

    /// List matches, newest first.
    fn list(&self, filter: &MatchFilter) -> Result<Vec<Match>, MatchError>;

    fn count(&self, filter: &MatchFilter) -> Result<i64, MatchError>;

    /// Number of stored matches per status.
    fn count_by_status(&self) -> Result<Vec<(MatchStatus, i64)>, MatchError>;

    /// Replace the stored document.
    fn update(&self, m: &Match) -> Result<(), MatchError>;

    /// Replace the stored document with `next` and push `previous` onto the
    /// undo history in one transaction.
    fn update_with_history(&self, previous: &Match, next: &Match, depth: usize)
        -> Result<(), MatchError>;

    /// Delete a match together with its history.
    fn delete(&self, id: &str) -> Result<Match, MatchError>;

    /// Save a snapshot taken before an undoable change, keeping at most
    /// `depth` snapshots for the match (0 = unbounded).
    fn push_history(&self, match_id: &str, snapshot: &Match, depth: usize)
        -> Result<(), MatchError>;

    /// Remove and return the latest snapshot.
    fn pop_history(&self, match_id: &str) -> Result<Option<Match>, MatchError>;

    fn history_len(&self, match_id: &str) -> Result<usize, MatchError>;
}
