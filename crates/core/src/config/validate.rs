use super::{types::Config, ConfigError};

/// Largest base penalty accepted for a wide or no-ball.
const MAX_PENALTY_RUNS: u32 = 10;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.scoring.default_wide_runs > MAX_PENALTY_RUNS {
        return Err(ConfigError::ValidationError(format!(
            "scoring.default_wide_runs cannot exceed {}",
            MAX_PENALTY_RUNS
        )));
    }

    if config.scoring.default_no_ball_runs > MAX_PENALTY_RUNS {
        return Err(ConfigError::ValidationError(format!(
            "scoring.default_no_ball_runs cannot exceed {}",
            MAX_PENALTY_RUNS
        )));
    }

    Ok(())
}
