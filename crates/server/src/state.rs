use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use scorer_core::{
    AuditHandle, AuditStore, Config, MatchStore, RosterSource, RosterStore, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    audit: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
    roster: Arc<dyn RosterStore>,
    matches: Arc<dyn MatchStore>,
    sheets: Arc<dyn RosterSource>,
    /// Serializes load/apply/store cycles on match documents.
    scoring_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        config: Config,
        audit: AuditHandle,
        audit_store: Arc<dyn AuditStore>,
        roster: Arc<dyn RosterStore>,
        matches: Arc<dyn MatchStore>,
        sheets: Arc<dyn RosterSource>,
    ) -> Self {
        Self {
            config,
            audit,
            audit_store,
            roster,
            matches,
            sheets,
            scoring_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn roster(&self) -> &dyn RosterStore {
        self.roster.as_ref()
    }

    pub fn matches(&self) -> &dyn MatchStore {
        self.matches.as_ref()
    }

    pub fn sheets(&self) -> &dyn RosterSource {
        self.sheets.as_ref()
    }

    pub fn undo_depth(&self) -> usize {
        self.config.scoring.undo_depth
    }

    /// Hold while reading, changing and writing back a match.
    pub async fn lock_scoring(&self) -> MutexGuard<'_, ()> {
        self.scoring_lock.lock().await
    }
}
