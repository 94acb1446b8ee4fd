//! Testing utilities for the migration workspace
//!
//! Shared document fixtures.

#![allow(missing_docs)]

use migrate_model::{Dashboard, Document, Monitor, Request, TemplateVariable, Widget, WidgetKind};
use serde_json::{json, Value};

pub fn monitor_from_value(value: Value) -> Monitor {
    Monitor::from_json(&value.to_string()).unwrap()
}

pub fn dashboard_from_value(value: Value) -> Dashboard {
    Dashboard::from_json(&value.to_string()).unwrap()
}

pub fn leaf(kind: WidgetKind, q: &str) -> Widget {
    Widget::leaf(kind, vec![Request::inline(q)]).unwrap()
}

/// Monitor as returned by the monitors API
pub fn ksm_monitor() -> Monitor {
    monitor_from_value(json!({
        "id": 42,
        "type": "query alert",
        "query": "max(last_5m):sum:kubernetes_state.nodes.by_condition{cluster_name:prod,condition:ready} by {node} < 1",
        "name": "Node not ready on {{cluster_name.name}}",
        "message": "Alert for {{pod.name}} @slack-k8s",
        "tags": ["team:platform"],
        "options": {"notify_no_data": true, "thresholds": {"critical": 1}}
    }))
}

/// Group → group → timeseries querying `$namespace`, with a `namespace`
/// template variable named `variable_name`
pub fn nested_namespace_dashboard(variable_name: &str) -> Dashboard {
    dashboard_from_value(json!({
        "title": "Kubernetes pods",
        "layout_type": "ordered",
        "widgets": [
            {
                "id": 1,
                "definition": {
                    "type": "group",
                    "title": "outer",
                    "layout_type": "ordered",
                    "widgets": [
                        {
                            "id": 2,
                            "definition": {
                                "type": "group",
                                "title": "inner",
                                "layout_type": "ordered",
                                "widgets": [
                                    {
                                        "id": 3,
                                        "definition": {
                                            "type": "timeseries",
                                            "requests": [
                                                {
                                                    "q": "sum:kubernetes_state.pod.status{$namespace} by {namespace}",
                                                    "display_type": "line"
                                                }
                                            ]
                                        }
                                    }
                                ]
                            }
                        }
                    ]
                }
            }
        ],
        "template_variables": [
            {"name": variable_name, "prefix": "namespace", "default": "*"}
        ]
    }))
}

/// Dashboard mixing every widget shape the migration handles
pub fn mixed_dashboard() -> Dashboard {
    dashboard_from_value(json!({
        "title": "Cluster overview",
        "layout_type": "free",
        "widgets": [
            {
                "id": 10,
                "definition": {
                    "type": "query_value",
                    "requests": [{"q": "sum:kubernetes_state.deployment.replicas_available{$cluster}", "aggregator": "last"}]
                },
                "layout": {"x": 0, "y": 0, "width": 2, "height": 2}
            },
            {
                "id": 11,
                "definition": {
                    "type": "timeseries",
                    "requests": [
                        {
                            "queries": [
                                {"data_source": "metrics", "name": "q1", "query": "sum:kubernetes_state.container.restarts{$cluster} by {container,pod}"},
                                {"data_source": "logs", "name": "q2", "compute": {"aggregation": "count"}, "search": {"query": "pod:a"}}
                            ],
                            "formulas": [{"formula": "q1"}],
                            "response_format": "timeseries"
                        }
                    ]
                }
            },
            {
                "id": 12,
                "definition": {"type": "note", "content": "kubernetes_state.{pod}"}
            },
            {
                "id": 13,
                "definition": {
                    "type": "query_table",
                    "requests": [{"q": "avg:system.cpu.user{$cluster} by {pod}"}]
                }
            }
        ],
        "template_variables": [
            {"name": "cluster", "prefix": "cluster_name"},
            {"name": "scope", "prefix": "pod"},
            {"name": "env"}
        ]
    }))
}

pub fn variable(name: &str, prefix: &str) -> TemplateVariable {
    TemplateVariable::new(name, Some(prefix))
}
