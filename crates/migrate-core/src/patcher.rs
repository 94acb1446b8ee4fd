//! Patcher trait and registry
//!
//! A [`Patcher`] is one migration over both document kinds. Patchers are
//! pure: they read the caller's document and return a rewritten copy, so a
//! failed patch never leaves a half-migrated document behind.

use std::fmt::Debug;

use migrate_model::{Dashboard, Document, Monitor};

use crate::error::PatchError;
use crate::ksm::{KsmPatcher, KSM_TO_CORE};

/// Result of patching one document
#[derive(Debug, Clone, PartialEq)]
pub enum Patched<T> {
    /// Nothing to migrate
    Unchanged,
    /// Migrated copy of the document
    Changed(T),
}

impl<T> Patched<T> {
    /// Whether the document was migrated
    #[inline]
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Migrated document, if any
    #[inline]
    #[must_use]
    pub fn into_changed(self) -> Option<T> {
        match self {
            Self::Changed(doc) => Some(doc),
            Self::Unchanged => None,
        }
    }
}

/// A migration over monitors and dashboards
pub trait Patcher: Send + Sync + Debug {
    /// Identifier used to select this patcher
    fn id(&self) -> &'static str;

    /// Patch a monitor
    ///
    /// # Errors
    /// Returns error if a rewrite rule fails; `monitor` is left untouched
    fn patch_monitor(&self, monitor: &Monitor) -> Result<Patched<Monitor>, PatchError>;

    /// Patch a dashboard
    ///
    /// # Errors
    /// Returns error if a rewrite rule fails; `dashboard` is left untouched
    fn patch_dashboard(&self, dashboard: &Dashboard) -> Result<Patched<Dashboard>, PatchError>;
}

/// Document that a [`Patcher`] can migrate
pub trait Patchable: Document {
    /// Dispatch to the patcher operation for this kind
    ///
    /// # Errors
    /// Propagates the patcher's error
    fn patch_with(&self, patcher: &dyn Patcher) -> Result<Patched<Self>, PatchError>;
}

impl Patchable for Monitor {
    #[inline]
    fn patch_with(&self, patcher: &dyn Patcher) -> Result<Patched<Self>, PatchError> {
        patcher.patch_monitor(self)
    }
}

impl Patchable for Dashboard {
    #[inline]
    fn patch_with(&self, patcher: &dyn Patcher) -> Result<Patched<Self>, PatchError> {
        patcher.patch_dashboard(self)
    }
}

/// Identifiers accepted by [`patcher_by_id`]
#[must_use]
pub fn available_patchers() -> &'static [&'static str] {
    &[KSM_TO_CORE]
}

/// Select a patcher by identifier, case-insensitively
#[must_use]
pub fn patcher_by_id(id: &str) -> Option<Box<dyn Patcher>> {
    match id.to_lowercase().as_str() {
        KSM_TO_CORE => Some(Box::new(KsmPatcher::default())),
        _ => None,
    }
}
