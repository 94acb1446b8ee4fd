//! KSM tag and metric tables
//!
//! [`RuleSet`] owns the legacy → core tag mapping, the metric renames and the
//! patterns compiled from them. It is immutable once built and shared by
//! reference; [`KSM_RULES`] holds the built-in tables for the process
//! lifetime.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Legacy KSM tag → core Kubernetes tag
///
/// `job` and `job_name` both map to `kube_job`.
pub const KSM_TAG_MAPPING: &[(&str, &str)] = &[
    ("cluster_name", "kube_cluster_name"),
    ("container", "kube_container_name"),
    ("cronjob", "kube_cronjob"),
    ("daemonset", "kube_daemon_set"),
    ("deployment", "kube_deployment"),
    ("hpa", "horizontalpodautoscaler"),
    ("image", "image_name"),
    ("job", "kube_job"),
    ("job_name", "kube_job"),
    ("namespace", "kube_namespace"),
    ("phase", "pod_phase"),
    ("pod", "pod_name"),
    ("replicaset", "kube_replica_set"),
    ("replicationcontroller", "kube_replication_controller"),
    ("statefulset", "kube_stateful_set"),
];

/// Literal metric renames, applied after tag substitution
pub const KSM_METRIC_RENAMES: &[(&str, &str)] = &[
    (
        "kubernetes_state.nodes.by_condition",
        "kubernetes_state.node.by_condition",
    ),
    (
        "kubernetes_state.persistentvolumes.by_phase",
        "kubernetes_state.persistentvolume.by_phase",
    ),
];

/// Marker every KSM-origin query contains
pub const KSM_METRIC_MARKER: &str = "kubernetes_state.";

/// Built-in KSM rule set
pub static KSM_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(KSM_TAG_MAPPING, KSM_METRIC_RENAMES).expect("built-in KSM rules are valid")
});

/// Errors building a [`RuleSet`]
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    /// Tag table has no entries
    #[error("tag mapping is empty")]
    EmptyMapping,

    /// A legacy tag is the empty string
    #[error("tag mapping contains an empty tag")]
    EmptyTag,

    /// Pattern compilation failed
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Immutable tag/metric tables with their compiled patterns
#[derive(Debug, Clone)]
pub struct RuleSet {
    tags: HashMap<String, String>,
    metric_renames: Vec<(String, String)>,
    /// `[{, ](tag|...)[}:, ]`
    tag_pattern: Regex,
    /// `\b(tag|...)\.name\b`
    template_pattern: Regex,
    /// `$name` references
    variable_pattern: Regex,
}

impl RuleSet {
    /// Build a rule set from `old → new` tag pairs and metric renames
    ///
    /// # Errors
    /// Returns error if the tag table is empty, contains an empty tag, or a
    /// pattern fails to compile
    pub fn new(tags: &[(&str, &str)], metric_renames: &[(&str, &str)]) -> Result<Self, RuleSetError> {
        let keys: Vec<&str> = tags.iter().map(|(old, _)| *old).collect();
        Self::compile(tags, metric_renames, &keys)
    }

    /// Rule set whose patterns match `unmapped` although the table has no
    /// entry for it
    #[cfg(test)]
    pub(crate) fn with_unmapped_tag(
        tags: &[(&str, &str)],
        metric_renames: &[(&str, &str)],
        unmapped: &'static str,
    ) -> Self {
        let mut keys: Vec<&str> = tags.iter().map(|(old, _)| *old).collect();
        keys.push(unmapped);
        Self::compile(tags, metric_renames, &keys).unwrap()
    }

    fn compile(
        tags: &[(&str, &str)],
        metric_renames: &[(&str, &str)],
        pattern_keys: &[&str],
    ) -> Result<Self, RuleSetError> {
        if pattern_keys.is_empty() {
            return Err(RuleSetError::EmptyMapping);
        }
        if pattern_keys.iter().any(|key| key.is_empty()) {
            return Err(RuleSetError::EmptyTag);
        }

        // Longest first so `job_name` is tried before `job`
        let mut keys: Vec<&str> = pattern_keys.to_vec();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keys.dedup();
        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            tags: tags
                .iter()
                .map(|(old, new)| ((*old).to_string(), (*new).to_string()))
                .collect(),
            metric_renames: metric_renames
                .iter()
                .map(|(old, new)| ((*old).to_string(), (*new).to_string()))
                .collect(),
            tag_pattern: Regex::new(&format!(r"[{{, ]({alternation})[}}:, ]"))?,
            template_pattern: Regex::new(&format!(r"\b({alternation})\.name\b"))?,
            variable_pattern: Regex::new(r"\$[a-zA-Z0-9_-]+")?,
        })
    }

    /// Replacement for a legacy tag
    #[inline]
    #[must_use]
    pub fn replacement(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Whether `tag` is a legacy tag
    #[inline]
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Number of legacy tags
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the tag table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Metric renames, in application order
    #[inline]
    #[must_use]
    pub fn metric_renames(&self) -> &[(String, String)] {
        &self.metric_renames
    }

    #[inline]
    pub(crate) fn tag_pattern(&self) -> &Regex {
        &self.tag_pattern
    }

    #[inline]
    pub(crate) fn template_pattern(&self) -> &Regex {
        &self.template_pattern
    }

    #[inline]
    pub(crate) fn variable_pattern(&self) -> &Regex {
        &self.variable_pattern
    }
}
