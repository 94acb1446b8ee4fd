//! KSM patcher: orchestration per document kind

use migrate_model::{Dashboard, Document, Monitor};

use crate::error::{PatchError, RewriteError};
use crate::ksm::query::{QueryRewriter, UsedVariableSet};
use crate::ksm::rules::{RuleSet, KSM_RULES};
use crate::ksm::template::TemplateRewriter;
use crate::ksm::variables::VariablePrefixRewriter;
use crate::ksm::widgets::WidgetTreeWalker;
use crate::patcher::{Patched, Patcher};

/// Identifier of the KSM → core migration
pub const KSM_TO_CORE: &str = "ksm-to-core";

/// Migrates kube-state-metrics tags and metrics to the core Kubernetes ones
#[derive(Debug, Clone, Copy)]
pub struct KsmPatcher<'r> {
    rules: &'r RuleSet,
}

impl<'r> KsmPatcher<'r> {
    /// Patcher over a custom rule set
    #[inline]
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Rule set in use
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &'r RuleSet {
        self.rules
    }
}

impl Default for KsmPatcher<'static> {
    fn default() -> Self {
        Self::new(&KSM_RULES)
    }
}

impl Patcher for KsmPatcher<'_> {
    fn id(&self) -> &'static str {
        KSM_TO_CORE
    }

    /// Rewrite the query; title and message are only rewritten when the
    /// query itself migrated.
    fn patch_monitor(&self, monitor: &Monitor) -> Result<Patched<Monitor>, PatchError> {
        let rewrite = QueryRewriter::new(self.rules)
            .rewrite(&monitor.query, None)
            .map_err(|e| PatchError::new(Monitor::KIND, false, RewriteError::at("query", e)))?;
        let Some(query) = rewrite.into_changed() else {
            return Ok(Patched::Unchanged);
        };

        let mut patched = monitor.clone();
        patched.query = query;

        let templates = TemplateRewriter::new(self.rules);
        if let Some(name) = &monitor.name {
            let rewrite = templates
                .rewrite(name)
                .map_err(|e| PatchError::new(Monitor::KIND, true, RewriteError::at("name", e)))?;
            if let Some(name) = rewrite.into_changed() {
                patched.name = Some(name);
            }
        }
        if let Some(message) = &monitor.message {
            let rewrite = templates
                .rewrite(message)
                .map_err(|e| PatchError::new(Monitor::KIND, true, RewriteError::at("message", e)))?;
            if let Some(message) = rewrite.into_changed() {
                patched.message = Some(message);
            }
        }

        tracing::debug!(query = %patched.query, "patched monitor");
        Ok(Patched::Changed(patched))
    }

    /// Walk the widget tree, then migrate the prefixes of the template
    /// variables its KSM queries referenced.
    fn patch_dashboard(&self, dashboard: &Dashboard) -> Result<Patched<Dashboard>, PatchError> {
        let mut patched = dashboard.clone();
        let mut used_variables = UsedVariableSet::new();

        let widgets_changed = WidgetTreeWalker::new(self.rules)
            .rewrite(&mut patched.widgets, &mut used_variables)
            .map_err(|e| {
                let rewritten = patched.widgets != dashboard.widgets;
                PatchError::new(Dashboard::KIND, rewritten, e)
            })?;

        let variables_changed = VariablePrefixRewriter::new(self.rules)
            .rewrite(&mut patched.template_variables, &used_variables);

        if !(widgets_changed || variables_changed) {
            return Ok(Patched::Unchanged);
        }
        tracing::debug!(
            widgets_changed,
            variables_changed,
            used_variables = used_variables.len(),
            "patched dashboard"
        );
        Ok(Patched::Changed(patched))
    }
}
