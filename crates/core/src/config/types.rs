use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("scorer.db")
}

/// Scoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Snapshots kept per match for undo (0 = unbounded)
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
    /// Wide penalty used when a new match does not specify one
    #[serde(default = "default_penalty_runs")]
    pub default_wide_runs: u32,
    /// No-ball penalty used when a new match does not specify one
    #[serde(default = "default_penalty_runs")]
    pub default_no_ball_runs: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            undo_depth: default_undo_depth(),
            default_wide_runs: default_penalty_runs(),
            default_no_ball_runs: default_penalty_runs(),
        }
    }
}

fn default_undo_depth() -> usize {
    100
}

fn default_penalty_runs() -> u32 {
    2
}

/// Roster import configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterConfig {
    /// Timeout for fetching a published spreadsheet (default: 30)
    #[serde(default = "default_sheet_timeout")]
    pub sheet_timeout_secs: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            sheet_timeout_secs: default_sheet_timeout(),
        }
    }
}

fn default_sheet_timeout() -> u64 {
    30
}

/// Config view served by the API
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scoring: ScoringConfig,
    pub roster: RosterConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            scoring: config.scoring.clone(),
            roster: config.roster.clone(),
        }
    }
}
