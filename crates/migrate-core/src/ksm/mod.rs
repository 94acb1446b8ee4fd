//! kube-state-metrics → core Kubernetes migration
//!
//! Leaf-first:
//!
//! - [`rules`]: tag table, metric renames, compiled patterns
//! - [`query`]: rewrites one query string, collecting `$variable` references
//! - [`template`]: rewrites `<tag>.name` references in monitor text
//! - [`request`]: rewrites the query fields of one widget request
//! - [`widgets`]: depth-first walk over a widget tree
//! - [`variables`]: template-variable prefix post-pass
//! - [`patcher`]: [`KsmPatcher`], orchestration per document kind

pub mod patcher;
pub mod query;
pub mod request;
pub mod rules;
pub mod template;
pub mod variables;
pub mod widgets;

pub use patcher::{KsmPatcher, KSM_TO_CORE};
pub use query::{QueryRewriter, UsedVariableSet};
pub use request::RequestRewriter;
pub use rules::{RuleSet, RuleSetError, KSM_METRIC_MARKER, KSM_METRIC_RENAMES, KSM_RULES, KSM_TAG_MAPPING};
pub use template::TemplateRewriter;
pub use variables::VariablePrefixRewriter;
pub use widgets::WidgetTreeWalker;

/// Outcome of rewriting one string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Input left as is
    Unchanged,
    /// New text, different from the input
    Changed(String),
}

impl Rewrite {
    /// Classify `patched` against `original`
    #[inline]
    #[must_use]
    pub fn compare(original: &str, patched: String) -> Self {
        if patched == original {
            Self::Unchanged
        } else {
            Self::Changed(patched)
        }
    }

    /// Whether the input was rewritten
    #[inline]
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// New text, if any
    #[inline]
    #[must_use]
    pub fn into_changed(self) -> Option<String> {
        match self {
            Self::Changed(text) => Some(text),
            Self::Unchanged => None,
        }
    }

    /// Resulting text: the new text, or `original` when unchanged
    #[inline]
    #[must_use]
    pub fn text<'a>(&'a self, original: &'a str) -> &'a str {
        match self {
            Self::Changed(text) => text,
            Self::Unchanged => original,
        }
    }
}
