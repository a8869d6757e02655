//! Career statistics folded from finished matches.

mod aggregate;
mod types;

pub use aggregate::aggregate;
pub use types::{BattingSummary, BestBowling, BowlingSummary, FieldingSummary, PlayerStats};
