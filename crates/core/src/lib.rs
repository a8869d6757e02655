pub mod audit;
pub mod config;
pub mod export;
pub mod matches;
pub mod metrics;
pub mod roster;
pub mod scoring;
pub mod stats;
pub mod testing;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditEventEnvelope, AuditFilter, AuditHandle,
    AuditOrder, AuditRecord, AuditStore, AuditWriter, SqliteAuditStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig,
};
pub use export::{Backup, ExportError, MatchBundle, RestoreSummary};
pub use matches::{MatchError, MatchFilter, MatchStore, SqliteMatchStore};
pub use roster::{
    GoogleSheetSource, ImportSummary, NewPlayer, NewTeam, Player, PlayerRole, RosterError,
    RosterSource, RosterStore, SheetError, SqliteRosterStore, Team,
};
pub use scoring::{
    apply_delivery, DeliveryEvent, ExtraType, Match, MatchSettings, MatchStatus, ScoringError,
    ScoringSession,
};
pub use stats::{aggregate, PlayerStats};
