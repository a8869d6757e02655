//! Match persistence and per-match undo history.

mod sqlite_store;
mod store;

pub use sqlite_store::SqliteMatchStore;
pub use store::{MatchError, MatchFilter, MatchStore};
