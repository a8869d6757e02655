use chrono::{DateTime, Utc};
use thiserror::Error;

use super::AuditRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Page size when none is given.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Which end of the log comes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuditOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filter for querying audit events.
///
/// Several event types are OR-ed together; every other criterion narrows
/// the result.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub match_id: Option<String>,
    pub event_types: Vec<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub order: AuditOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditFilter {
    pub fn new() -> Self {
        Self {
            match_id: None,
            event_types: Vec::new(),
            from: None,
            to: None,
            order: AuditOrder::default(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }

    /// Everything recorded against one match, in the order it happened.
    pub fn for_match(match_id: impl Into<String>) -> Self {
        Self::new()
            .with_match_id(match_id)
            .with_order(AuditOrder::OldestFirst)
            .with_limit(-1)
    }

    pub fn with_match_id(mut self, match_id: impl Into<String>) -> Self {
        self.match_id = Some(match_id.into());
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    /// Accept a comma-separated list such as `"delivery_recorded,undo_applied"`.
    pub fn with_event_types(mut self, list: &str) -> Self {
        self.event_types.extend(
            list.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        );
        self
    }

    pub fn with_time_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_order(mut self, order: AuditOrder) -> Self {
        self.order = order;
        self
    }

    /// A negative limit means no limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Storage for the audit trail
pub trait AuditStore: Send + Sync {
    /// Insert an audit record, returns the assigned ID
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError>;

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError>;

    /// Number of records matching the filter, ignoring limit and offset
    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError>;

    /// Full history of one match, oldest first.
    fn match_trail(&self, match_id: &str) -> Result<Vec<AuditRecord>, AuditError> {
        self.query(&AuditFilter::for_match(match_id))
    }
}
