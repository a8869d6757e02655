//! Players, teams and roster import.

mod import;
mod sheet;
mod sqlite_store;
mod store;
mod types;

pub use import::{import_roster, import_roster_csv, parse_roster_csv, ImportSummary, RosterRow};
pub use sheet::{sheet_id, GoogleSheetSource, RosterSource, SheetError};
pub use sqlite_store::SqliteRosterStore;
pub use store::{RosterError, RosterStore};
pub use types::{NewPlayer, NewTeam, Player, PlayerRole, Team};
