//! Widget tree traversal

use migrate_model::{Request, Widget, WidgetDefinition};

use crate::error::RewriteError;
use crate::ksm::query::UsedVariableSet;
use crate::ksm::request::RequestRewriter;
use crate::ksm::rules::RuleSet;

/// Depth-first walk over a widget tree
///
/// Groups are descended into, the six request-carrying widget kinds have
/// every request rewritten, and any other widget is left alone.
#[derive(Debug, Clone, Copy)]
pub struct WidgetTreeWalker<'r> {
    requests: RequestRewriter<'r>,
}

impl<'r> WidgetTreeWalker<'r> {
    /// Walker over `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            requests: RequestRewriter::new(rules),
        }
    }

    /// Rewrite `widgets` in place, in order, returning whether anything changed
    ///
    /// # Errors
    /// Stops at the first failing node. Widgets visited before the failure
    /// keep their rewrites, so callers must discard the tree on error.
    pub fn rewrite(
        &self,
        widgets: &mut [Widget],
        used_variables: &mut UsedVariableSet,
    ) -> Result<bool, RewriteError> {
        let mut changed = false;
        for (index, widget) in widgets.iter_mut().enumerate() {
            changed |= self
                .rewrite_definition(&mut widget.definition, used_variables)
                .map_err(|e| e.within("definition").within_index("widgets", index))?;
        }
        Ok(changed)
    }

    fn rewrite_definition(
        &self,
        definition: &mut WidgetDefinition,
        used_variables: &mut UsedVariableSet,
    ) -> Result<bool, RewriteError> {
        match definition {
            WidgetDefinition::Group(group) => self.rewrite(&mut group.widgets, used_variables),
            WidgetDefinition::Change(leaf)
            | WidgetDefinition::Table(leaf)
            | WidgetDefinition::QueryValue(leaf)
            | WidgetDefinition::Timeseries(leaf)
            | WidgetDefinition::Toplist(leaf)
            | WidgetDefinition::TreeMap(leaf) => self.rewrite_requests(&mut leaf.requests, used_variables),
            WidgetDefinition::Other(_) => Ok(false),
        }
    }

    fn rewrite_requests(
        &self,
        requests: &mut [Request],
        used_variables: &mut UsedVariableSet,
    ) -> Result<bool, RewriteError> {
        let mut changed = false;
        for (index, request) in requests.iter_mut().enumerate() {
            changed |= self
                .requests
                .rewrite(request, used_variables)
                .map_err(|e| e.within_index("requests", index))?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ksm::rules::{KSM_METRIC_RENAMES, KSM_RULES, KSM_TAG_MAPPING};
    use migrate_model::WidgetKind;
    use serde_json::json;

    fn leaf(kind: WidgetKind, q: &str) -> Widget {
        Widget::leaf(kind, vec![Request::inline(q)]).unwrap()
    }

    fn first_query(widget: &Widget) -> Option<&str> {
        widget.definition.requests()?.first()?.q.as_deref()
    }

    #[test]
    fn rewrites_every_leaf_kind() {
        let kinds = [
            WidgetKind::Change,
            WidgetKind::Table,
            WidgetKind::QueryValue,
            WidgetKind::Timeseries,
            WidgetKind::Toplist,
            WidgetKind::TreeMap,
        ];
        let mut widgets: Vec<Widget> = kinds
            .iter()
            .map(|kind| leaf(*kind, "avg:kubernetes_state.pod.ready{*} by {pod}"))
            .collect();
        let mut used = UsedVariableSet::new();

        assert!(WidgetTreeWalker::new(&KSM_RULES).rewrite(&mut widgets, &mut used).unwrap());
        for widget in &widgets {
            assert_eq!(first_query(widget), Some("avg:kubernetes_state.pod.ready{*} by {pod_name}"));
        }
    }

    #[test]
    fn descends_into_nested_groups() {
        let mut widgets = vec![Widget::group(vec![Widget::group(vec![leaf(
            WidgetKind::Timeseries,
            "avg:kubernetes_state.pod.status{$namespace} by {namespace}",
        )])])];
        let mut used = UsedVariableSet::new();

        assert!(WidgetTreeWalker::new(&KSM_RULES).rewrite(&mut widgets, &mut used).unwrap());

        let WidgetDefinition::Group(outer) = &widgets[0].definition else { panic!("outer group") };
        let WidgetDefinition::Group(inner) = &outer.widgets[0].definition else { panic!("inner group") };
        assert_eq!(
            first_query(&inner.widgets[0]),
            Some("avg:kubernetes_state.pod.status{$namespace} by {kube_namespace}")
        );
        assert!(used.contains("namespace"));
    }

    #[test]
    fn unknown_widgets_are_untouched() {
        let raw = json!({"definition": {"type": "heatmap", "requests": [{"q": "avg:kubernetes_state.pod.ready{pod:x}"}]}});
        let mut widgets = vec![serde_json::from_value::<Widget>(raw.clone()).unwrap()];
        let mut used = UsedVariableSet::new();

        assert!(!WidgetTreeWalker::new(&KSM_RULES).rewrite(&mut widgets, &mut used).unwrap());
        assert_eq!(serde_json::to_value(&widgets[0]).unwrap(), raw);
        assert!(used.is_empty());
    }

    #[test]
    fn failure_stops_traversal_and_reports_path() {
        let rules = RuleSet::with_unmapped_tag(KSM_TAG_MAPPING, KSM_METRIC_RENAMES, "node");
        let mut widgets = vec![
            leaf(WidgetKind::Toplist, "top:kubernetes_state.pod.ready{pod:a}"),
            Widget::group(vec![
                leaf(WidgetKind::QueryValue, "avg:system.cpu{*}"),
                leaf(WidgetKind::Timeseries, "avg:kubernetes_state.node.cpu{node:a}"),
            ]),
            leaf(WidgetKind::Change, "avg:kubernetes_state.pod.ready{pod:b}"),
        ];
        let mut used = UsedVariableSet::new();

        let err = WidgetTreeWalker::new(&rules).rewrite(&mut widgets, &mut used).unwrap_err();
        assert_eq!(
            err.path().to_string(),
            "widgets[1].definition.widgets[1].definition.requests[0].q"
        );
        // visited before the failure
        assert_eq!(first_query(&widgets[0]), Some("top:kubernetes_state.pod.ready{pod_name:a}"));
        // never reached
        assert_eq!(first_query(&widgets[2]), Some("avg:kubernetes_state.pod.ready{pod:b}"));
    }
}
