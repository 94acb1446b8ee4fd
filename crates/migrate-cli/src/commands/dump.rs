//! Pull referenced objects into the local store

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use migrate_client::ObjectApi;
use migrate_model::DocumentKind;
use migrate_store::{read_input_refs, Config, LocalStore, ObjectRef, SerializedRef};
use tracing::{info, warn};

use super::{monitor_id, write_failures};

/// Log progress every this many references
pub const PROGRESS_EVERY: usize = 20;

/// Outcome of dumping one input file
#[derive(Debug)]
pub struct DumpReport {
    /// Kind of the input file
    pub kind: DocumentKind,
    /// Skipped because a local copy exists
    pub existing: Vec<SerializedRef>,
    /// Written to the store
    pub dumped: Vec<SerializedRef>,
    /// Per-reference failures
    pub failed: Vec<anyhow::Error>,
}

impl DumpReport {
    fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            existing: Vec::new(),
            dumped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Whether every reference was dumped or skipped
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for DumpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Finished dumping {}", self.kind)?;
        writeln!(f, "Existing refs: {}", self.existing.len())?;
        writeln!(f, "Dumped refs: {}", self.dumped.len())?;
        writeln!(f, "Failed refs: {}", self.failed.len())?;
        write_failures(f, &self.failed)
    }
}

enum Outcome {
    Existing,
    Dumped,
}

/// Dump every reference listed in `input`, which holds refs of `kind`
///
/// Org folders are created before any object is fetched.
///
/// # Errors
/// Returns error if the input file cannot be read or an org folder cannot
/// be created. Per-reference failures end up in the report.
pub async fn dump(
    config: &Config,
    api: &dyn ObjectApi,
    store: &LocalStore,
    input: &Path,
    kind: DocumentKind,
    update_existing: bool,
) -> anyhow::Result<DumpReport> {
    let refs = read_input_refs(input)
        .await
        .with_context(|| format!("failed to read file {}", input.display()))?;

    let orgs: BTreeSet<i64> = refs.iter().map(|r| r.org_id).collect();
    store
        .ensure_org_dirs(orgs)
        .await
        .context("failed to create output folder")?;

    let mut report = DumpReport::new(kind);
    let total = refs.len();
    for (i, serialized) in refs.into_iter().enumerate() {
        let object = match ObjectRef::try_from(&serialized) {
            Ok(object) => object,
            Err(e) => {
                report
                    .failed
                    .push(anyhow!(e).context(format!("failed to parse input ref: {serialized}")));
                continue;
            }
        };

        if i % PROGRESS_EVERY == 0 {
            info!("Progressing, dumping {kind} object {i} out of {total}");
        }

        match dump_one(config, api, store, &object, kind, update_existing).await {
            Ok(Outcome::Existing) => report.existing.push(serialized),
            Ok(Outcome::Dumped) => report.dumped.push(serialized),
            Err(e) => {
                warn!(%object, error = %e, "Dump failed");
                report.failed.push(e);
            }
        }
    }

    info!(
        %kind,
        existing = report.existing.len(),
        dumped = report.dumped.len(),
        failed = report.failed.len(),
        "Finished dumping"
    );
    Ok(report)
}

async fn dump_one(
    config: &Config,
    api: &dyn ObjectApi,
    store: &LocalStore,
    object: &ObjectRef,
    kind: DocumentKind,
    update_existing: bool,
) -> anyhow::Result<Outcome> {
    if object.kind != kind {
        bail!("unexpected {} ref in {kind} input: {object}", object.kind);
    }

    if !update_existing && store.exists(object).await {
        return Ok(Outcome::Existing);
    }

    let credential = config
        .credentials_for(object.org_id)
        .map_err(|e| anyhow!("{e} object type: {}, id: {}", object.kind, object.id))?;
    let path = store.path_for(object);

    match object.kind {
        DocumentKind::Dashboard => {
            let dashboard = api
                .get_dashboard(credential, &object.id)
                .await
                .with_context(|| format!("failed to process object from {object}"))?;
            store
                .write_document(&path, &dashboard)
                .await
                .with_context(|| format!("failed to write object from {object}"))?;
        }
        DocumentKind::Monitor => {
            let monitor = api
                .get_monitor(credential, monitor_id(object)?)
                .await
                .with_context(|| format!("failed to process object from {object}"))?;
            store
                .write_document(&path, &monitor)
                .await
                .with_context(|| format!("failed to write object from {object}"))?;
        }
    }

    Ok(Outcome::Dumped)
}
