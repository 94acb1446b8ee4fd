//! Migration CLI
//!
//! Library side of the `migrate` binary: argument parsing and the three
//! commands, each returning a report the binary prints.
//!
//! # Workflow
//!
//! 1. `dump` pulls the referenced monitors and dashboards into a local store
//! 2. `patch` rewrites stored documents in place and marks them touched
//! 3. `update` pushes touched documents back to the API

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;

pub use cli::{command, run, Action, DumpArgs, Invocation, PatchArgs, UpdateArgs};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
