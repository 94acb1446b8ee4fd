//! Monitor documents

use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentKind};
use crate::RawObject;

/// Alert definition
///
/// Only `query`, `name` and `message` are modelled; every other field is
/// carried through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Monitor query
    pub query: String,

    /// Title, may embed template references such as `{{pod.name}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Notification message, may embed template references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: RawObject,
}

impl Monitor {
    /// Create monitor with a query and no title or message
    #[inline]
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            name: None,
            message: None,
            extra: RawObject::new(),
        }
    }

    /// Set the title
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the message
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Document for Monitor {
    const KIND: DocumentKind = DocumentKind::Monitor;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn monitor_keeps_unmodelled_fields() {
        let raw = json!({
            "id": 1234,
            "type": "query alert",
            "query": "avg(last_5m):avg:kubernetes_state.pod.ready{*} < 1",
            "name": "Pods not ready",
            "options": {"thresholds": {"critical": 1}}
        });

        let monitor: Monitor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(monitor.extra["id"], json!(1234));
        assert_eq!(monitor.message, None);

        let back = serde_json::to_value(&monitor).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn monitor_requires_query() {
        let result = Monitor::from_json(r#"{"name": "no query"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn monitor_pretty_output_uses_tabs() {
        let monitor = Monitor::new("avg:cpu{*}").with_name("cpu");
        let out = monitor.to_json_pretty().unwrap();
        assert!(out.contains("\n\t\"query\": \"avg:cpu{*}\""));
        assert_eq!(Monitor::from_json(&out).unwrap(), monitor);
    }
}
