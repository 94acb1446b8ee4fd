//! Widget request rewriting

use migrate_model::{QueryDefinition, Request};

use crate::error::RewriteError;
use crate::ksm::query::{QueryRewriter, UsedVariableSet};
use crate::ksm::rules::RuleSet;

/// Applies [`QueryRewriter`] to the query fields of one request
///
/// Both shapes are handled: the inline `q` string and the metric entries of
/// the `queries` list. Non-metric query definitions are skipped.
#[derive(Debug, Clone, Copy)]
pub struct RequestRewriter<'r> {
    queries: QueryRewriter<'r>,
}

impl<'r> RequestRewriter<'r> {
    /// Rewriter over `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            queries: QueryRewriter::new(rules),
        }
    }

    /// Rewrite `request` in place, returning whether anything changed
    ///
    /// # Errors
    /// Stops at the first failing query; the error path is relative to the
    /// request
    pub fn rewrite(
        &self,
        request: &mut Request,
        used_variables: &mut UsedVariableSet,
    ) -> Result<bool, RewriteError> {
        let mut changed = false;

        if let Some(q) = request.q.as_mut() {
            let rewrite = self
                .queries
                .rewrite(q, Some(used_variables))
                .map_err(|e| RewriteError::at("q", e))?;
            if let Some(patched) = rewrite.into_changed() {
                *q = patched;
                changed = true;
            }
        }

        for (index, definition) in request.queries.iter_mut().flatten().enumerate() {
            let QueryDefinition::Metric(metric) = definition else {
                continue;
            };
            let rewrite = self
                .queries
                .rewrite(&metric.query, Some(used_variables))
                .map_err(|e| RewriteError::at("query", e).within_index("queries", index))?;
            if let Some(patched) = rewrite.into_changed() {
                metric.query = patched;
                changed = true;
            }
        }

        Ok(changed)
    }
}
