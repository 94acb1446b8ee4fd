//! Widget requests and their query definitions

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::RawObject;

/// `data_source` of the formula/function query variant that carries a metric query
pub const METRICS_DATA_SOURCE: &str = "metrics";

/// Query-carrying unit of a leaf widget
///
/// A request either holds a single inline query (`q`), a list of typed
/// formula/function queries (`queries`), or occasionally both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Inline query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Formula/function query definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<QueryDefinition>>,

    /// Unmodelled fields (formulas, display options, ...)
    #[serde(flatten)]
    pub extra: RawObject,
}

impl Request {
    /// Request with an inline query
    #[inline]
    #[must_use]
    pub fn inline(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    /// Request with formula/function queries
    #[inline]
    #[must_use]
    pub fn formulas(queries: Vec<QueryDefinition>) -> Self {
        Self {
            queries: Some(queries),
            ..Self::default()
        }
    }
}

/// One entry of a request's `queries` list
///
/// Discriminated on `data_source`; only the metric variant is modelled.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryDefinition {
    /// `data_source: "metrics"`
    Metric(MetricQuery),
    /// Any other data source, kept verbatim
    Other(RawObject),
}

impl QueryDefinition {
    /// Metric query, if this is one
    #[inline]
    #[must_use]
    pub fn as_metric(&self) -> Option<&MetricQuery> {
        match self {
            Self::Metric(metric) => Some(metric),
            Self::Other(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for QueryDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawObject::deserialize(deserializer)?;
        let is_metric = raw.get("data_source").and_then(Value::as_str) == Some(METRICS_DATA_SOURCE);
        if !is_metric {
            return Ok(Self::Other(raw));
        }

        serde_json::from_value(Value::Object(raw))
            .map(Self::Metric)
            .map_err(D::Error::custom)
    }
}

impl Serialize for QueryDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Metric(metric) => metric.serialize(serializer),
            Self::Other(raw) => raw.serialize(serializer),
        }
    }
}

/// Metric query of a formula/function request
///
/// The `data_source` discriminant stays in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    /// Metric query string
    pub query: String,

    /// Unmodelled fields (`data_source`, `name`, `aggregator`, ...)
    #[serde(flatten)]
    pub extra: RawObject,
}

impl MetricQuery {
    /// Create a named metric query
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        let mut extra = RawObject::new();
        extra.insert("data_source".to_string(), Value::from(METRICS_DATA_SOURCE));
        extra.insert("name".to_string(), Value::String(name.into()));
        Self {
            query: query.into(),
            extra,
        }
    }
}
