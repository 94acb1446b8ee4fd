//! Monitor title/message rewriting

use crate::error::MappingError;
use crate::ksm::rules::RuleSet;
use crate::ksm::Rewrite;

/// Rewrites `<tag>.name` template references, e.g. `{{pod.name}}`
#[derive(Debug, Clone, Copy)]
pub struct TemplateRewriter<'r> {
    rules: &'r RuleSet,
}

impl<'r> TemplateRewriter<'r> {
    /// Rewriter over `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Rewrite the tag part of every `<tag>.name` reference in `text`
    ///
    /// # Errors
    /// Returns [`MappingError`] if a matched tag has no replacement
    pub fn rewrite(&self, text: &str) -> Result<Rewrite, MappingError> {
        let mut patched = String::with_capacity(text.len());
        let mut copied = 0;

        for caps in self.rules.template_pattern().captures_iter(text) {
            let Some(tag) = caps.get(1) else { continue };
            let replacement = self
                .rules
                .replacement(tag.as_str())
                .ok_or_else(|| MappingError::new(tag.as_str()))?;

            patched.push_str(&text[copied..tag.start()]);
            patched.push_str(replacement);
            copied = tag.end();
        }

        if copied == 0 {
            return Ok(Rewrite::Unchanged);
        }
        patched.push_str(&text[copied..]);
        Ok(Rewrite::compare(text, patched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ksm::rules::{KSM_METRIC_RENAMES, KSM_RULES, KSM_TAG_MAPPING};

    fn rewrite(text: &str) -> Rewrite {
        TemplateRewriter::new(&KSM_RULES).rewrite(text).unwrap()
    }

    #[test]
    fn rewrites_tag_keeping_suffix() {
        assert_eq!(rewrite("pod.name"), Rewrite::Changed("pod_name.name".into()));
    }

    #[test]
    fn rewrites_every_reference() {
        assert_eq!(
            rewrite("{{namespace.name}}/{{pod.name}} is down on {{cluster_name.name}}"),
            Rewrite::Changed(
                "{{kube_namespace.name}}/{{pod_name.name}} is down on {{kube_cluster_name.name}}".into()
            )
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(rewrite("Pod restarted on {{host.name}}"), Rewrite::Unchanged);
        assert_eq!(rewrite("pod is restarting"), Rewrite::Unchanged);
    }

    #[test]
    fn already_migrated_references_are_stable() {
        assert_eq!(rewrite("{{kube_namespace.name}} {{kube_job.name}}"), Rewrite::Unchanged);
        assert_eq!(rewrite("{{pod.namespace}}"), Rewrite::Unchanged);
    }

    #[test]
    fn unmapped_match_is_an_error() {
        let rules = RuleSet::with_unmapped_tag(KSM_TAG_MAPPING, KSM_METRIC_RENAMES, "node");
        let err = TemplateRewriter::new(&rules).rewrite("{{node.name}}").unwrap_err();
        assert_eq!(err.tag, "node");
    }
}
