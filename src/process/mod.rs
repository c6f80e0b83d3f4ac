// src/process/mod.rs

//! The process handle.
//!
//! - [`handle`] owns a child's pid, pipes and exit watcher and exposes the
//!   public operations (`create`, `current`, `wait`, `exit_code`, stdio).
//! - `pipes` holds the chunked read/write loops the handle uses on its
//!   pipe ends.

pub mod handle;
pub(crate) mod pipes;

pub use handle::Process;
