use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use scorer_core::{AuditFilter, AuditOrder, AuditRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::matches::load_match;
use super::response::{audit_error, bad_request, ApiError};
use crate::state::AppState;

const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub match_id: Option<String>,
    /// One type or a comma-separated list
    pub event_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// `newest` (default) or `oldest`
    pub order: Option<String>,
    /// Default 100, capped at 1000
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditQueryResponse {
    pub events: Vec<AuditRecord>,
    /// Matching events across all pages
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct MatchTrailResponse {
    pub match_id: String,
    pub events: Vec<AuditRecord>,
}

fn parse_order(raw: Option<&str>) -> Result<AuditOrder, ApiError> {
    match raw {
        None | Some("newest") => Ok(AuditOrder::NewestFirst),
        Some("oldest") => Ok(AuditOrder::OldestFirst),
        Some(other) => Err(bad_request(format!(
            "order must be 'newest' or 'oldest', got '{}'",
            other
        ))),
    }
}

/// GET /api/v1/audit
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditQueryResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(scorer_core::audit::DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = AuditFilter::new()
        .with_order(parse_order(params.order.as_deref())?)
        .with_time_range(params.from, params.to);
    if let Some(ref match_id) = params.match_id {
        filter = filter.with_match_id(match_id);
    }
    if let Some(ref event_type) = params.event_type {
        filter = filter.with_event_types(event_type);
    }

    let total = state.audit_store().count(&filter).map_err(audit_error)?;
    let events = state
        .audit_store()
        .query(&filter.with_limit(limit).with_offset(offset))
        .map_err(audit_error)?;

    Ok(Json(AuditQueryResponse {
        events,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/matches/{id}/audit
///
/// Every recorded action on the match, oldest first.
pub async fn match_trail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MatchTrailResponse>, ApiError> {
    // 404 for matches that never existed; the trail of a deleted match is
    // still reachable through /audit?match_id=
    load_match(&state, &id)?;
    let events = state.audit_store().match_trail(&id).map_err(audit_error)?;
    Ok(Json(MatchTrailResponse {
        match_id: id,
        events,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order(None).unwrap(), AuditOrder::NewestFirst);
        assert_eq!(parse_order(Some("oldest")).unwrap(), AuditOrder::OldestFirst);
        let (status, _) = parse_order(Some("sideways")).unwrap_err();
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    }
}
