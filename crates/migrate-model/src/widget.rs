//! Dashboard widgets
//!
//! Widgets form a tree: a group holds child widgets, and the six leaf kinds
//! the migration understands hold requests. Any other widget type is kept as
//! raw JSON.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::de::null_as_default;
use crate::request::Request;
use crate::RawObject;

/// One node of a dashboard's widget tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Widget definition
    pub definition: WidgetDefinition,

    /// Unmodelled fields (`id`, `layout`, ...)
    #[serde(flatten)]
    pub extra: RawObject,
}

impl Widget {
    /// Wrap a definition
    #[inline]
    #[must_use]
    pub fn new(definition: WidgetDefinition) -> Self {
        Self {
            definition,
            extra: RawObject::new(),
        }
    }

    /// Group widget holding `children`
    #[inline]
    #[must_use]
    pub fn group(children: Vec<Widget>) -> Self {
        Self::new(WidgetDefinition::Group(GroupDefinition::new(children)))
    }

    /// Leaf widget of `kind` holding `requests`
    ///
    /// Returns `None` for [`WidgetKind::Group`], which holds widgets instead.
    #[must_use]
    pub fn leaf(kind: WidgetKind, requests: Vec<Request>) -> Option<Self> {
        WidgetDefinition::leaf(kind, RequestsDefinition::new(kind, requests)).map(Self::new)
    }
}

/// Widget kinds with a typed definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// `group`, holds child widgets
    Group,
    /// `change`
    Change,
    /// `query_table`
    Table,
    /// `query_value`
    QueryValue,
    /// `timeseries`
    Timeseries,
    /// `toplist`
    Toplist,
    /// `treemap`
    TreeMap,
}

impl WidgetKind {
    /// Value of the definition's `type` field
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Change => "change",
            Self::Table => "query_table",
            Self::QueryValue => "query_value",
            Self::Timeseries => "timeseries",
            Self::Toplist => "toplist",
            Self::TreeMap => "treemap",
        }
    }

    /// Kind for a definition `type`, `None` when not modelled
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "group" => Self::Group,
            "change" => Self::Change,
            "query_table" => Self::Table,
            "query_value" => Self::QueryValue,
            "timeseries" => Self::Timeseries,
            "toplist" => Self::Toplist,
            "treemap" => Self::TreeMap,
            _ => return None,
        })
    }
}

/// Widget definition, closed over the shapes the migration understands
///
/// The `type` discriminant is kept in each variant's `extra` map so the
/// definition serializes back exactly as read.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetDefinition {
    /// Group of child widgets
    Group(GroupDefinition),
    /// Change widget
    Change(RequestsDefinition),
    /// Query table widget
    Table(RequestsDefinition),
    /// Query value widget
    QueryValue(RequestsDefinition),
    /// Timeseries widget
    Timeseries(RequestsDefinition),
    /// Top list widget
    Toplist(RequestsDefinition),
    /// Treemap widget
    TreeMap(RequestsDefinition),
    /// Unrecognised widget type, kept verbatim
    Other(RawObject),
}

impl WidgetDefinition {
    /// Wrap a request-carrying definition in the variant for `kind`
    #[must_use]
    pub fn leaf(kind: WidgetKind, definition: RequestsDefinition) -> Option<Self> {
        Some(match kind {
            WidgetKind::Group => return None,
            WidgetKind::Change => Self::Change(definition),
            WidgetKind::Table => Self::Table(definition),
            WidgetKind::QueryValue => Self::QueryValue(definition),
            WidgetKind::Timeseries => Self::Timeseries(definition),
            WidgetKind::Toplist => Self::Toplist(definition),
            WidgetKind::TreeMap => Self::TreeMap(definition),
        })
    }

    /// Kind of this definition, `None` for unrecognised widgets
    #[must_use]
    pub fn kind(&self) -> Option<WidgetKind> {
        Some(match self {
            Self::Group(_) => WidgetKind::Group,
            Self::Change(_) => WidgetKind::Change,
            Self::Table(_) => WidgetKind::Table,
            Self::QueryValue(_) => WidgetKind::QueryValue,
            Self::Timeseries(_) => WidgetKind::Timeseries,
            Self::Toplist(_) => WidgetKind::Toplist,
            Self::TreeMap(_) => WidgetKind::TreeMap,
            Self::Other(_) => return None,
        })
    }

    /// Requests of a leaf definition
    #[must_use]
    pub fn requests(&self) -> Option<&[Request]> {
        match self {
            Self::Change(def)
            | Self::Table(def)
            | Self::QueryValue(def)
            | Self::Timeseries(def)
            | Self::Toplist(def)
            | Self::TreeMap(def) => Some(&def.requests),
            Self::Group(_) | Self::Other(_) => None,
        }
    }

    /// Mutable requests of a leaf definition
    #[must_use]
    pub fn requests_mut(&mut self) -> Option<&mut Vec<Request>> {
        match self {
            Self::Change(def)
            | Self::Table(def)
            | Self::QueryValue(def)
            | Self::Timeseries(def)
            | Self::Toplist(def)
            | Self::TreeMap(def) => Some(&mut def.requests),
            Self::Group(_) | Self::Other(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for WidgetDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawObject::deserialize(deserializer)?;
        let Some(kind) = raw
            .get("type")
            .and_then(Value::as_str)
            .and_then(WidgetKind::from_type_name)
        else {
            return Ok(Self::Other(raw));
        };

        let value = Value::Object(raw);
        let parsed = match kind {
            WidgetKind::Group => serde_json::from_value(value).map(Self::Group),
            WidgetKind::Change => serde_json::from_value(value).map(Self::Change),
            WidgetKind::Table => serde_json::from_value(value).map(Self::Table),
            WidgetKind::QueryValue => serde_json::from_value(value).map(Self::QueryValue),
            WidgetKind::Timeseries => serde_json::from_value(value).map(Self::Timeseries),
            WidgetKind::Toplist => serde_json::from_value(value).map(Self::Toplist),
            WidgetKind::TreeMap => serde_json::from_value(value).map(Self::TreeMap),
        };
        parsed.map_err(D::Error::custom)
    }
}

impl Serialize for WidgetDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Group(def) => def.serialize(serializer),
            Self::Change(def)
            | Self::Table(def)
            | Self::QueryValue(def)
            | Self::Timeseries(def)
            | Self::Toplist(def)
            | Self::TreeMap(def) => def.serialize(serializer),
            Self::Other(raw) => raw.serialize(serializer),
        }
    }
}

/// Group widget definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Child widgets, in display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub widgets: Vec<Widget>,

    /// Unmodelled fields, including `type`
    #[serde(flatten)]
    pub extra: RawObject,
}

impl GroupDefinition {
    /// Group holding `widgets`
    #[must_use]
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self {
            widgets,
            extra: typed_extra(WidgetKind::Group),
        }
    }
}

/// Definition of a leaf widget that issues queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestsDefinition {
    /// Requests, in display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub requests: Vec<Request>,

    /// Unmodelled fields, including `type`
    #[serde(flatten)]
    pub extra: RawObject,
}

impl RequestsDefinition {
    /// Definition of `kind` holding `requests`
    #[must_use]
    pub fn new(kind: WidgetKind, requests: Vec<Request>) -> Self {
        Self {
            requests,
            extra: typed_extra(kind),
        }
    }
}

fn typed_extra(kind: WidgetKind) -> RawObject {
    let mut extra = RawObject::new();
    extra.insert("type".to_string(), Value::from(kind.type_name()));
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_groups_roundtrip() {
        let raw = json!({
            "id": 1,
            "definition": {
                "type": "group",
                "title": "Pods",
                "widgets": [
                    {
                        "id": 2,
                        "definition": {
                            "type": "timeseries",
                            "requests": [{"q": "avg:kubernetes_state.pod.ready{*}", "display_type": "line"}]
                        },
                        "layout": {"x": 0, "y": 0, "width": 4, "height": 2}
                    },
                    {
                        "id": 3,
                        "definition": {"type": "note", "content": "hello"}
                    }
                ]
            }
        });

        let widget: Widget = serde_json::from_value(raw.clone()).unwrap();
        let WidgetDefinition::Group(group) = &widget.definition else {
            panic!("expected group, got {:?}", widget.definition);
        };
        assert_eq!(group.widgets.len(), 2);
        assert_eq!(group.widgets[0].definition.kind(), Some(WidgetKind::Timeseries));
        assert_eq!(group.widgets[1].definition.kind(), None);

        assert_eq!(serde_json::to_value(&widget).unwrap(), raw);
    }

    #[test]
    fn null_children_read_as_empty() {
        let group: WidgetDefinition = serde_json::from_value(json!({"type": "group", "widgets": null})).unwrap();
        let WidgetDefinition::Group(group) = group else {
            panic!("expected group, got {group:?}");
        };
        assert!(group.widgets.is_empty());

        let leaf: WidgetDefinition =
            serde_json::from_value(json!({"type": "timeseries", "requests": null})).unwrap();
        assert!(matches!(&leaf, WidgetDefinition::Timeseries(def) if def.requests.is_empty()));
    }

    #[test]
    fn table_uses_query_table_type() {
        let raw = json!({"type": "query_table", "requests": [{"q": "avg:x{*}"}]});
        let def: WidgetDefinition = serde_json::from_value(raw).unwrap();
        assert!(matches!(def, WidgetDefinition::Table(_)));
        assert_eq!(def.requests().map(<[Request]>::len), Some(1));
    }

    #[test]
    fn unknown_widget_is_untouched() {
        let raw = json!({"type": "heatmap", "requests": [{"q": "avg:x{*}"}]});
        let mut def: WidgetDefinition = serde_json::from_value(raw.clone()).unwrap();
        assert!(def.requests_mut().is_none());
        assert_eq!(serde_json::to_value(&def).unwrap(), raw);
    }

    #[test]
    fn constructed_leaf_carries_type() {
        let widget = Widget::leaf(WidgetKind::Toplist, vec![Request::inline("top:x{*}")]).unwrap();
        let value = serde_json::to_value(&widget).unwrap();
        assert_eq!(value["definition"]["type"], json!("toplist"));
        assert!(Widget::leaf(WidgetKind::Group, Vec::new()).is_none());
    }

    #[test]
    fn type_names_are_consistent() {
        for kind in [
            WidgetKind::Group,
            WidgetKind::Change,
            WidgetKind::Table,
            WidgetKind::QueryValue,
            WidgetKind::Timeseries,
            WidgetKind::Toplist,
            WidgetKind::TreeMap,
        ] {
            assert_eq!(WidgetKind::from_type_name(kind.type_name()), Some(kind));
        }
    }
}
