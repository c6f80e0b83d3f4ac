// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawLaunchConfig`.
///
/// This only performs TOML deserialization; it does **not** check the
/// values. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLaunchConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawLaunchConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Rejects a zero chunk size and an inverted or zero poll backoff.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LaunchConfig> {
    let raw_config = load_from_path(&path)?;
    let config = LaunchConfig::try_from(raw_config)?;
    debug!(path = ?path.as_ref(), ?config, "loaded launch config");
    Ok(config)
}
