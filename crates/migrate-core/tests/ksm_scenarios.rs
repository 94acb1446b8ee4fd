//! End-to-end patching of realistic monitor and dashboard documents

use migrate_core::ksm::{KsmPatcher, QueryRewriter, Rewrite, TemplateRewriter, KSM_RULES};
use migrate_core::{Patchable, Patched, Patcher};
use migrate_model::{Dashboard, Monitor, WidgetDefinition, WidgetKind};
use migrate_test_utils::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn patched<T>(result: Patched<T>) -> T {
    match result {
        Patched::Changed(doc) => doc,
        Patched::Unchanged => panic!("expected a change"),
    }
}

#[test]
fn query_with_tag_and_metric_rename() {
    let result = QueryRewriter::new(&KSM_RULES)
        .rewrite("sum:kubernetes_state.nodes.by_condition{cluster_name:foo}", None)
        .unwrap();
    assert_eq!(
        result,
        Rewrite::Changed("sum:kubernetes_state.node.by_condition{kube_cluster_name:foo}".to_string())
    );
}

#[test]
fn query_without_ksm_marker() {
    let result = QueryRewriter::new(&KSM_RULES)
        .rewrite("avg:some.other.metric{cluster_name:foo}", None)
        .unwrap();
    assert_eq!(result, Rewrite::Unchanged);
}

#[test]
fn template_reference() {
    let result = TemplateRewriter::new(&KSM_RULES).rewrite("pod.name").unwrap();
    assert_eq!(result, Rewrite::Changed("pod_name.name".to_string()));
}

#[test]
fn monitor_query_name_and_message() {
    let monitor = ksm_monitor();
    let new = patched(KsmPatcher::default().patch_monitor(&monitor).unwrap());

    assert_eq!(
        new.query,
        "max(last_5m):sum:kubernetes_state.node.by_condition{kube_cluster_name:prod,condition:ready} by {node} < 1"
    );
    assert_eq!(new.name.as_deref(), Some("Node not ready on {{kube_cluster_name.name}}"));
    assert_eq!(new.message.as_deref(), Some("Alert for {{pod_name.name}} @slack-k8s"));
    assert_eq!(new.extra, monitor.extra);
}

#[test]
fn monitor_message_untouched_without_query_change() {
    let monitor = Monitor::new("avg:system.load.1{cluster_name:prod}").with_message("Alert for {{pod.name}}");
    let result = KsmPatcher::default().patch_monitor(&monitor).unwrap();
    assert_eq!(result, Patched::Unchanged);
}

#[test]
fn monitor_changed_even_when_text_has_no_reference() {
    let monitor = Monitor::new("avg:kubernetes_state.pod.ready{pod:a}")
        .with_name("Pod not ready")
        .with_message("Check the pod");
    let new = patched(KsmPatcher::default().patch_monitor(&monitor).unwrap());
    assert_eq!(new.query, "avg:kubernetes_state.pod.ready{pod_name:a}");
    assert_eq!(new.name.as_deref(), Some("Pod not ready"));
    assert_eq!(new.message.as_deref(), Some("Check the pod"));
}

#[test]
fn nested_group_query_and_used_variable_prefix() {
    let dashboard = nested_namespace_dashboard("namespace");
    let new = patched(KsmPatcher::default().patch_dashboard(&dashboard).unwrap());

    let value = serde_json::to_value(&new).unwrap();
    assert_eq!(
        value["widgets"][0]["definition"]["widgets"][0]["definition"]["widgets"][0]["definition"]["requests"][0]["q"],
        json!("sum:kubernetes_state.pod.status{$namespace} by {kube_namespace}")
    );
    assert_eq!(new.template_variables[0].prefix.as_deref(), Some("kube_namespace"));
}

#[test]
fn unreferenced_variable_keeps_prefix() {
    let dashboard = nested_namespace_dashboard("unused");
    let new = patched(KsmPatcher::default().patch_dashboard(&dashboard).unwrap());

    assert_eq!(new.template_variables[0].name, "unused");
    assert_eq!(new.template_variables[0].prefix.as_deref(), Some("namespace"));
}

#[test]
fn variable_prefix_alone_marks_dashboard_changed() {
    // query already migrated, variable prefix still legacy
    let dashboard = Dashboard::new(vec![leaf(
        WidgetKind::QueryValue,
        "sum:kubernetes_state.pod.ready{$ns} by {kube_namespace}",
    )])
    .with_variable(variable("ns", "namespace"));

    let new = patched(KsmPatcher::default().patch_dashboard(&dashboard).unwrap());
    assert_eq!(new.widgets, dashboard.widgets);
    assert_eq!(new.template_variables[0].prefix.as_deref(), Some("kube_namespace"));
}

#[test]
fn mixed_dashboard_migrates_only_supported_shapes() {
    let dashboard = mixed_dashboard();
    let new = patched(KsmPatcher::default().patch_dashboard(&dashboard).unwrap());
    let value = serde_json::to_value(&new).unwrap();
    let widgets = &value["widgets"];

    assert_eq!(
        widgets[0]["definition"]["requests"][0]["q"],
        json!("sum:kubernetes_state.deployment.replicas_available{$cluster}")
    );
    assert_eq!(
        widgets[1]["definition"]["requests"][0]["queries"][0]["query"],
        json!("sum:kubernetes_state.container.restarts{$cluster} by {kube_container_name,pod_name}")
    );
    assert_eq!(
        widgets[1]["definition"]["requests"][0]["queries"][1],
        json!({"data_source": "logs", "name": "q2", "compute": {"aggregation": "count"}, "search": {"query": "pod:a"}})
    );
    assert_eq!(widgets[2]["definition"], json!({"type": "note", "content": "kubernetes_state.{pod}"}));
    assert_eq!(widgets[3]["definition"]["requests"][0]["q"], json!("avg:system.cpu.user{$cluster} by {pod}"));
    assert_eq!(widgets[0]["layout"], json!({"x": 0, "y": 0, "width": 2, "height": 2}));

    assert_eq!(new.template_variables[0].prefix.as_deref(), Some("kube_cluster_name"));
    assert_eq!(new.template_variables[1].prefix.as_deref(), Some("pod"));
    assert_eq!(new.template_variables[2].prefix, None);
    assert!(matches!(new.widgets[2].definition, WidgetDefinition::Other(_)));
}

#[test]
fn patching_twice_is_a_no_op() {
    let patcher = KsmPatcher::default();

    let monitor = patched(patcher.patch_monitor(&ksm_monitor()).unwrap());
    assert_eq!(patcher.patch_monitor(&monitor).unwrap(), Patched::Unchanged);

    for dashboard in [
        nested_namespace_dashboard("namespace"),
        nested_namespace_dashboard("unused"),
        mixed_dashboard(),
    ] {
        let once = patched(patcher.patch_dashboard(&dashboard).unwrap());
        assert_eq!(patcher.patch_dashboard(&once).unwrap(), Patched::Unchanged);
    }
}

#[test]
fn patchable_dispatches_by_kind() {
    let patcher: Box<dyn Patcher> = migrate_core::patcher_by_id("ksm-to-core").unwrap();
    assert!(ksm_monitor().patch_with(patcher.as_ref()).unwrap().is_changed());
    assert!(mixed_dashboard().patch_with(patcher.as_ref()).unwrap().is_changed());
    assert_eq!(
        Dashboard::new(Vec::new()).patch_with(patcher.as_ref()).unwrap(),
        Patched::Unchanged
    );
}
