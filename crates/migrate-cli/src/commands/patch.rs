//! Rewrite stored documents in place

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use migrate_core::{Patchable, Patched, Patcher};
use migrate_model::{Dashboard, DocumentKind, Monitor};
use migrate_store::{LocalStore, StoredObject};
use tracing::{info, warn};

use super::write_failures;

/// Outcome of patching a store
#[derive(Debug)]
pub struct PatchReport {
    /// Store root
    pub input: PathBuf,
    /// Documents rewritten and marked touched
    pub patched: Vec<PathBuf>,
    /// Per-file failures
    pub failed: Vec<anyhow::Error>,
}

impl PatchReport {
    /// Whether every file was handled
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for PatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Finished patching {}", self.input.display())?;
        writeln!(f, "Patched files: {}", self.patched.len())?;
        writeln!(f, "Patched failures: {}", self.failed.len())?;
        write_failures(f, &self.failed)?;
        writeln!(f)
    }
}

/// Patch every JSON document in the store
///
/// A document is written back, and its touched marker created, only when
/// the patcher changed it without error.
///
/// # Errors
/// Returns error only if the store root cannot be read
pub async fn patch(store: &LocalStore, patcher: &dyn Patcher) -> anyhow::Result<PatchReport> {
    let listing = store.list_objects().await?;
    let mut report = PatchReport {
        input: store.root().to_path_buf(),
        patched: Vec::new(),
        failed: listing
            .failures
            .into_iter()
            .map(|(path, e)| anyhow!(e).context(format!("failed to parse file name at {}", path.display())))
            .collect(),
    };

    for StoredObject { path, kind } in listing.entries {
        let result = match kind {
            DocumentKind::Dashboard => patch_file::<Dashboard>(store, &path, patcher).await,
            DocumentKind::Monitor => patch_file::<Monitor>(store, &path, patcher).await,
        };
        match result {
            Ok(true) => report.patched.push(path),
            Ok(false) => {}
            Err(e) => report
                .failed
                .push(e.context(format!("failed to patch object at {}", path.display()))),
        }
    }

    info!(
        patcher = patcher.id(),
        patched = report.patched.len(),
        failed = report.failed.len(),
        "Finished patching"
    );
    Ok(report)
}

async fn patch_file<D: Patchable>(store: &LocalStore, path: &Path, patcher: &dyn Patcher) -> anyhow::Result<bool> {
    let document: D = store.read_document(path).await?;

    let patched = match document.patch_with(patcher) {
        Ok(patched) => patched,
        Err(e) => {
            if e.rewritten_before_failure() {
                warn!(path = %path.display(), "Some queries were migrated before the failure; file left as is");
            }
            return Err(e.into());
        }
    };
    let Patched::Changed(document) = patched else {
        return Ok(false);
    };

    store
        .write_document(path, &document)
        .await
        .context("failed to write patched object")?;
    store
        .mark_touched(path)
        .await
        .context("failed to write touched file")?;
    info!(path = %path.display(), kind = %D::KIND, "Patched");
    Ok(true)
}
