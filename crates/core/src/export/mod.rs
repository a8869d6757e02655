//! Match export bundles, full backups and non-destructive imports.

mod backup;
mod bundle;

pub use backup::{backup, parse_backup, restore, Backup, RestoreSummary};
pub use bundle::{export_match, import_match, parse_match_import, MatchBundle};

use thiserror::Error;

use crate::matches::MatchError;
use crate::roster::RosterError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid file format: {0}")]
    InvalidJson(String),

    #[error("Not a valid match file, missing: {}", .0.join(", "))]
    MissingMatchFields(Vec<&'static str>),

    #[error("Backup file is missing required data sections (players, teams, matches)")]
    MissingSections,

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Match(#[from] MatchError),
}
