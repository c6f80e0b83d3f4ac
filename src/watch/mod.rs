// src/watch/mod.rs

//! Asynchronous exit detection.
//!
//! This module is responsible for:
//! - Holding a process's exit status in a set-once, waitable cell
//!   ([`cell`]).
//! - Running one background thread per process that polls for termination
//!   and publishes the status exactly once ([`watcher`]).
//!
//! It does **not** know about pipes or how a process was launched; it only
//! turns a pid into an eventually-published [`crate::types::ExitStatus`].

pub mod cell;
pub mod watcher;

pub use cell::ExitCell;
pub use watcher::{ExitProbe, Watcher};
