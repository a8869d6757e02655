//! Prometheus metrics for the scoring engine and roster tooling.
//!
//! The server registers everything returned by [`all_metrics`] in its
//! registry; the statics here are updated from library code.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Scoring
// =============================================================================

/// Deliveries applied by the processor, by ball tag.
pub static DELIVERIES_APPLIED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "scorer_deliveries_applied_total",
            "Deliveries applied to a match",
        ),
        &["event"], // "run", "wide", "no_ball", "bye", "leg_bye", "wicket"
    )
    .unwrap()
});

/// Deliveries dropped because the match state could not take them.
pub static DELIVERIES_IGNORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scorer_deliveries_ignored_total",
        "Deliveries ignored because the match was finished or its stats were incomplete",
    )
    .unwrap()
});

pub static INNINGS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("scorer_innings_completed_total", "Innings brought to a close").unwrap()
});

/// Innings totals at the close of each innings.
pub static INNINGS_RUNS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("scorer_innings_runs", "Runs scored per completed innings")
            .buckets(vec![25.0, 50.0, 75.0, 100.0, 150.0, 200.0, 250.0, 300.0, 400.0]),
    )
    .unwrap()
});

/// Matches finished, by how the result was reached.
pub static MATCHES_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("scorer_matches_finished_total", "Matches with a result"),
        &["result"], // "chased", "defended", "tied"
    )
    .unwrap()
});

pub static UNDO_OPERATIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("scorer_undo_operations_total", "Scoring actions undone").unwrap()
});

// =============================================================================
// Roster
// =============================================================================

pub static ROSTER_ROWS_IMPORTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scorer_roster_rows_imported_total",
        "Player/team rows merged from roster sheets",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DELIVERIES_APPLIED.clone()),
        Box::new(DELIVERIES_IGNORED.clone()),
        Box::new(INNINGS_COMPLETED.clone()),
        Box::new(INNINGS_RUNS.clone()),
        Box::new(MATCHES_FINISHED.clone()),
        Box::new(UNDO_OPERATIONS.clone()),
        Box::new(ROSTER_ROWS_IMPORTED.clone()),
    ]
}
