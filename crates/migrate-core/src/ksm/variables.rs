//! Template variable prefix post-pass

use migrate_model::TemplateVariable;

use crate::ksm::query::UsedVariableSet;
use crate::ksm::rules::RuleSet;

/// Migrates the prefix of template variables used by KSM queries
///
/// A variable is only touched when its name was referenced by a KSM query
/// of the same dashboard; an unreferenced variable keeps a legacy prefix.
#[derive(Debug, Clone, Copy)]
pub struct VariablePrefixRewriter<'r> {
    rules: &'r RuleSet,
}

impl<'r> VariablePrefixRewriter<'r> {
    /// Rewriter over `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Rewrite prefixes in place, returning whether any changed
    pub fn rewrite(&self, variables: &mut [TemplateVariable], used_variables: &UsedVariableSet) -> bool {
        let mut changed = false;
        for variable in variables.iter_mut() {
            if !used_variables.contains(&variable.name) {
                continue;
            }
            let Some(prefix) = variable.prefix.as_mut() else {
                continue;
            };
            if let Some(replacement) = self.rules.replacement(prefix) {
                tracing::debug!(variable = %variable.name, from = %prefix, to = replacement, "rewrote variable prefix");
                *prefix = replacement.to_string();
                changed = true;
            }
        }
        changed
    }
}
