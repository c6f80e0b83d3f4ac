// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{LaunchConfig, PollConfig, RawLaunchConfig};
use crate::errors::{ChildpipeError, Result};

impl TryFrom<RawLaunchConfig> for LaunchConfig {
    type Error = crate::errors::ChildpipeError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let poll = PollConfig {
            initial_interval: Duration::from_micros(raw.poll.initial_interval_us),
            max_interval: Duration::from_micros(raw.poll.max_interval_us),
        };
        Ok(LaunchConfig::new_unchecked(raw.io.chunk_size, poll))
    }
}

fn validate_raw_config(cfg: &RawLaunchConfig) -> Result<()> {
    validate_io(cfg)?;
    validate_poll(cfg)?;
    Ok(())
}

fn validate_io(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.io.chunk_size == 0 {
        return Err(ChildpipeError::ConfigError(
            "[io].chunk_size must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_poll(cfg: &RawLaunchConfig) -> Result<()> {
    let poll = &cfg.poll;

    if poll.initial_interval_us == 0 {
        return Err(ChildpipeError::ConfigError(
            "[poll].initial_interval_us must be >= 1 (got 0)".to_string(),
        ));
    }

    if poll.max_interval_us < poll.initial_interval_us {
        return Err(ChildpipeError::ConfigError(format!(
            "[poll].max_interval_us ({}) must not be smaller than initial_interval_us ({})",
            poll.max_interval_us, poll.initial_interval_us
        )));
    }

    Ok(())
}
