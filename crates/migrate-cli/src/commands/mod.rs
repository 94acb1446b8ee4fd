//! `dump`, `patch` and `update` commands
//!
//! Commands never stop at the first failing object: failures are collected
//! in the returned report and the caller decides the exit status.

pub mod dump;
pub mod patch;
pub mod update;

use std::fmt;

use anyhow::Context;
use migrate_store::ObjectRef;

pub use dump::DumpReport;
pub use patch::PatchReport;
pub use update::UpdateReport;

fn monitor_id(object: &ObjectRef) -> anyhow::Result<i64> {
    object
        .id
        .parse()
        .with_context(|| format!("failed to parse monitor ID {}", object.id))
}

fn write_failures(f: &mut fmt::Formatter<'_>, failures: &[anyhow::Error]) -> fmt::Result {
    for failure in failures {
        writeln!(f, "{failure:#}")?;
    }
    Ok(())
}
