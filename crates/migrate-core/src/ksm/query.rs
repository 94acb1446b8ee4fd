//! Query string rewriting

use std::collections::BTreeSet;

use crate::error::MappingError;
use crate::ksm::rules::{RuleSet, KSM_METRIC_MARKER};
use crate::ksm::Rewrite;

/// Template variable names (without `$`) referenced by KSM queries of one
/// document
pub type UsedVariableSet = BTreeSet<String>;

/// Rewrites legacy tags and metric names in one query string
#[derive(Debug, Clone, Copy)]
pub struct QueryRewriter<'r> {
    rules: &'r RuleSet,
}

impl<'r> QueryRewriter<'r> {
    /// Rewriter over `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Rewrite `query`
    ///
    /// Queries without the `kubernetes_state.` marker are returned unchanged
    /// and contribute no variables. Otherwise every `$name` reference is
    /// added to `used_variables` (when given), whether or not a tag is
    /// rewritten.
    ///
    /// # Errors
    /// Returns [`MappingError`] if a matched tag has no replacement
    pub fn rewrite(
        &self,
        query: &str,
        used_variables: Option<&mut UsedVariableSet>,
    ) -> Result<Rewrite, MappingError> {
        if !query.contains(KSM_METRIC_MARKER) {
            return Ok(Rewrite::Unchanged);
        }

        if let Some(used) = used_variables {
            for reference in self.rules.variable_pattern().find_iter(query) {
                used.insert(reference.as_str()[1..].to_string());
            }
        }

        let mut patched = self.replace_tags(query)?;
        for (old, new) in self.rules.metric_renames() {
            if patched.contains(old.as_str()) {
                patched = patched.replace(old.as_str(), new);
            }
        }

        let rewrite = Rewrite::compare(query, patched);
        if let Rewrite::Changed(patched) = &rewrite {
            tracing::debug!(%query, %patched, "rewrote query");
        }
        Ok(rewrite)
    }

    /// Replace every delimited tag, keeping the delimiters
    ///
    /// A closing delimiter may open the next match, so `{pod,namespace}`
    /// rewrites both tags.
    fn replace_tags(&self, query: &str) -> Result<String, MappingError> {
        let pattern = self.rules.tag_pattern();
        let mut patched = String::with_capacity(query.len());
        let mut copied = 0;

        while let Some(caps) = pattern.captures_at(query, copied) {
            let Some(tag) = caps.get(1) else { break };
            let replacement = self
                .rules
                .replacement(tag.as_str())
                .ok_or_else(|| MappingError::new(tag.as_str()))?;

            patched.push_str(&query[copied..tag.start()]);
            patched.push_str(replacement);
            copied = tag.end();
        }

        patched.push_str(&query[copied..]);
        Ok(patched)
    }
}
