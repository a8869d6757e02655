//! Error bodies shared by the API handlers.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

use scorer_core::{
    AuditError, ExportError, MatchError, RosterError, ScoringError, SheetError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status and body returned by a failing handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::NOT_FOUND, message)
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

fn internal(message: String) -> ApiError {
    error!("Request failed: {}", message);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub fn roster_error(e: RosterError) -> ApiError {
    match e {
        RosterError::PlayerNotFound(_) | RosterError::TeamNotFound(_) => not_found(e.to_string()),
        RosterError::DuplicateTeamName(_) => api_error(StatusCode::CONFLICT, e.to_string()),
        RosterError::UnknownPlayer(_) | RosterError::Validation(_) => bad_request(e.to_string()),
        RosterError::Database(_) => internal(e.to_string()),
    }
}

pub fn match_error(e: MatchError) -> ApiError {
    match e {
        MatchError::NotFound(_) => not_found(e.to_string()),
        MatchError::AlreadyExists(_) => api_error(StatusCode::CONFLICT, e.to_string()),
        MatchError::Corrupt { .. } | MatchError::Database(_) => internal(e.to_string()),
    }
}

/// Lifecycle rejections: state conflicts are 409, bad arguments 400.
pub fn scoring_error(e: ScoringError) -> ApiError {
    match e {
        ScoringError::InvalidStatus { .. }
        | ScoringError::AwaitingBowler
        | ScoringError::NotAwaitingBowler => api_error(StatusCode::CONFLICT, e.to_string()),
        _ => bad_request(e.to_string()),
    }
}

pub fn export_error(e: ExportError) -> ApiError {
    match e {
        ExportError::InvalidJson(_)
        | ExportError::MissingMatchFields(_)
        | ExportError::MissingSections => bad_request(e.to_string()),
        ExportError::MatchNotFound(_) => not_found(e.to_string()),
        ExportError::Roster(inner) => roster_error(inner),
        ExportError::Match(inner) => match_error(inner),
    }
}

pub fn sheet_error(e: SheetError) -> ApiError {
    match e {
        SheetError::InvalidUrl(_) => bad_request(e.to_string()),
        SheetError::Http(_) | SheetError::Status(_) => {
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

pub fn audit_error(e: AuditError) -> ApiError {
    internal(format!("Failed to query audit events: {}", e))
}
