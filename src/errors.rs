// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChildpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(unix)]
    #[error("OS error: {0}")]
    Os(#[from] nix::errno::Errno),

    #[error("{0} pipe is not open")]
    PipeClosed(&'static str),

    #[error("process creation is not supported on {0}")]
    Unsupported(&'static str),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChildpipeError>;
