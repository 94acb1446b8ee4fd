//! Migration Core
//!
//! Pure rewrite engine for monitor and dashboard documents. No I/O happens
//! here: callers hand in a document and get back either
//! [`Patched::Unchanged`] or a rewritten copy.
//!
//! # Core Concepts
//!
//! - [`Patcher`]: a migration over both document kinds, selected by id
//! - [`ksm::KsmPatcher`]: kube-state-metrics → core Kubernetes tag migration
//! - [`ksm::RuleSet`]: immutable tag/metric tables and their compiled patterns
//! - [`PatchError`]: failure with the document kind and the node path that broke
//!
//! # Example
//!
//! ```rust,ignore
//! use migrate_core::{patcher_by_id, Patched};
//!
//! let patcher = patcher_by_id("ksm-to-core").unwrap();
//! match patcher.patch_dashboard(&dashboard)? {
//!     Patched::Changed(new_dashboard) => save(new_dashboard),
//!     Patched::Unchanged => {}
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod ksm;
mod patcher;

pub use error::{MappingError, NodePath, PatchError, RewriteError};
pub use patcher::{available_patchers, patcher_by_id, Patchable, Patched, Patcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for patching documents
    pub use crate::error::{MappingError, PatchError, RewriteError};
    pub use crate::ksm::{KsmPatcher, RuleSet, KSM_RULES};
    pub use crate::patcher::{patcher_by_id, Patchable, Patched, Patcher};
    pub use migrate_model::{Dashboard, Document, DocumentKind, Monitor};
}
