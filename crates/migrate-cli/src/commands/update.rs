//! Push stored documents back to the API

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use migrate_client::{MonitorUpdate, ObjectApi};
use migrate_model::{Dashboard, DocumentKind, Monitor};
use migrate_store::{Config, LocalStore, ObjectRef};
use tracing::{info, warn};

use super::{monitor_id, write_failures};

/// Log progress every this many objects
pub const PROGRESS_EVERY: usize = 10;

/// Outcome of pushing a store
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Documents pushed
    pub updated: Vec<PathBuf>,
    /// Per-object failures
    pub failed: Vec<anyhow::Error>,
}

impl UpdateReport {
    /// Whether every object was pushed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Finished updating")?;
        writeln!(f, "Updated objects: {}", self.updated.len())?;
        writeln!(f, "Update failures: {}", self.failed.len())?;
        write_failures(f, &self.failed)?;
        writeln!(f)
    }
}

/// Push touched objects, or every stored object when `all` is set
///
/// A pushed object loses its touched marker.
///
/// # Errors
/// Returns error only if the store root cannot be read
pub async fn update(
    config: &Config,
    api: &dyn ObjectApi,
    store: &LocalStore,
    all: bool,
) -> anyhow::Result<UpdateReport> {
    let listing = store.touched_objects(all).await?;
    let mut report = UpdateReport {
        updated: Vec::new(),
        failed: listing
            .failures
            .into_iter()
            .map(|(path, e)| anyhow!(e).context(format!("failed to parse file name {}", path.display())))
            .collect(),
    };

    let total = listing.entries.len();
    for (i, (object, path)) in listing.entries.into_iter().enumerate() {
        if i % PROGRESS_EVERY == 0 {
            info!("Progressing, updating {} object {i} out of {total}", object.kind);
        }

        match update_one(config, api, store, &object, &path).await {
            Ok(()) => report.updated.push(path),
            Err(e) => {
                warn!(%object, error = %e, "Update failed");
                report.failed.push(e);
            }
        }
    }

    info!(
        updated = report.updated.len(),
        failed = report.failed.len(),
        "Finished updating"
    );
    Ok(report)
}

async fn update_one(
    config: &Config,
    api: &dyn ObjectApi,
    store: &LocalStore,
    object: &ObjectRef,
    path: &Path,
) -> anyhow::Result<()> {
    let credential = config
        .credentials_for(object.org_id)
        .map_err(|e| anyhow!("{e} object type: {}, id: {}", object.kind, object.id))?;

    match object.kind {
        DocumentKind::Dashboard => {
            let dashboard: Dashboard = store
                .read_document(path)
                .await
                .with_context(|| format!("failed to read file at {}", path.display()))?;
            api.update_dashboard(credential, &object.id, &dashboard)
                .await
                .with_context(|| format!("failed to update dashboard {}", object.id))?;
        }
        DocumentKind::Monitor => {
            let id = monitor_id(object)?;
            let monitor: Monitor = store
                .read_document(path)
                .await
                .with_context(|| format!("failed to read file at {}", path.display()))?;
            api.update_monitor(credential, id, &MonitorUpdate::from(&monitor))
                .await
                .with_context(|| format!("failed to update monitor {}", object.id))?;
        }
    }

    store.clear_touched(path).await?;
    Ok(())
}
