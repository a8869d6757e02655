//! In-process scoring session with a bounded undo stack.

use std::collections::VecDeque;

use super::event::DeliveryEvent;
use super::lifecycle;
use super::processor::apply_delivery;
use super::types::{Match, TeamDirectory};
use super::ScoringError;
use crate::metrics;

/// Holds the live match and the snapshots taken before each undoable action.
///
/// Deliveries, strike swaps, retirements and declarations can be undone;
/// opener and bowler selection and settings changes cannot.
#[derive(Debug, Clone)]
pub struct ScoringSession {
    current: Match,
    history: VecDeque<Match>,
    /// Maximum snapshots kept (0 = unbounded)
    depth: usize,
}

impl ScoringSession {
    pub fn new(current: Match, depth: usize) -> Self {
        Self {
            current,
            history: VecDeque::new(),
            depth,
        }
    }

    pub fn current(&self) -> &Match {
        &self.current
    }

    pub fn into_match(self) -> Match {
        self.current
    }

    /// Number of steps that can be undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Validate and apply a delivery. Returns false when the processor
    /// ignored it, in which case nothing is pushed.
    pub fn record<D>(&mut self, event: &DeliveryEvent, teams: &D) -> Result<bool, ScoringError>
    where
        D: TeamDirectory + ?Sized,
    {
        lifecycle::check_delivery(&self.current, event)?;
        let next = apply_delivery(&self.current, event, teams);
        if next == self.current {
            return Ok(false);
        }
        self.push(next);
        Ok(true)
    }

    pub fn swap(&mut self) -> Result<(), ScoringError> {
        let next = lifecycle::swap_batsmen(&self.current)?;
        self.push(next);
        Ok(())
    }

    pub fn retire(
        &mut self,
        retired_id: &str,
        replacement_id: &str,
        reason: &str,
    ) -> Result<(), ScoringError> {
        let next = lifecycle::retire_batsman(&self.current, retired_id, replacement_id, reason)?;
        self.push(next);
        Ok(())
    }

    pub fn declare<D>(&mut self, teams: &D) -> Result<(), ScoringError>
    where
        D: TeamDirectory + ?Sized,
    {
        let next = lifecycle::declare_innings(&self.current, teams)?;
        self.push(next);
        Ok(())
    }

    pub fn start_innings(
        &mut self,
        striker_id: &str,
        non_striker_id: &str,
        bowler_id: &str,
    ) -> Result<(), ScoringError> {
        self.current =
            lifecycle::start_innings(&self.current, striker_id, non_striker_id, bowler_id)?;
        Ok(())
    }

    pub fn select_bowler(&mut self, bowler_id: &str) -> Result<(), ScoringError> {
        self.current = lifecycle::select_next_bowler(&self.current, bowler_id)?;
        Ok(())
    }

    /// Restore the snapshot taken before the last undoable action.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.current = previous;
                metrics::UNDO_OPERATIONS.inc();
                true
            }
            None => false,
        }
    }

    fn push(&mut self, next: Match) {
        let previous = std::mem::replace(&mut self.current, next);
        self.history.push_back(previous);
        if self.depth > 0 {
            while self.history.len() > self.depth {
                self.history.pop_front();
            }
        }
    }
}
