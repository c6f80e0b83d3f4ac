// src/config/mod.rs

//! Launch configuration for child processes.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the tunables and turn them into a [`LaunchConfig`]
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{IoSection, LaunchConfig, PollConfig, PollSection, RawLaunchConfig};
