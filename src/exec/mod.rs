// src/exec/mod.rs

//! Program descriptors and their conversion into `execve` arguments.
//!
//! - [`executable`] holds the [`Executable`] value a caller hands to
//!   [`crate::process::Process::create`].
//! - [`marshal`] turns it into owned `argv` / `envp` arrays.

pub mod executable;
pub mod marshal;

pub use executable::Executable;
pub use marshal::{CStringArray, Marshaled, marshal};
