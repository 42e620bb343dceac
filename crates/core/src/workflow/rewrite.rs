//! Rewrites a UI-form node list into an API-form graph.
//!
//! Inputs backed by a resolvable link become `[source_id, slot]` references.
//! All other inputs take the next entry of the node's `widgets_values`, in
//! declaration order; linked inputs never consume a widget value.

use serde_json::{Map, Value};

use crate::error::CoreError;

use super::links::LinkTable;
use super::{ApiGraph, NodeSpec};

/// Rewrite UI-form `nodes` into an API graph, resolving links through `links`.
///
/// Nodes without an integer `id` or a string `type` are omitted. An empty
/// result is an error.
pub fn rewrite_ui_graph(nodes: &[Value], links: &LinkTable) -> Result<ApiGraph, CoreError> {
    let graph: ApiGraph = nodes
        .iter()
        .filter_map(|node| rewrite_node(node, links))
        .collect();

    if graph.is_empty() {
        return Err(CoreError::EmptyRewrittenGraph);
    }
    Ok(graph)
}

fn rewrite_node(node: &Value, links: &LinkTable) -> Option<(String, NodeSpec)> {
    let (Some(id), Some(class_type)) = (
        node.get("id").and_then(Value::as_i64),
        node.get("type").and_then(Value::as_str),
    ) else {
        tracing::debug!(node = %node, "Skipping node without id or type");
        return None;
    };

    let declared = node
        .get("inputs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let widgets = node
        .get("widgets_values")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut inputs = Map::new();
    let mut widget_cursor = 0;

    for input in declared {
        let Some(name) = input.get("name").and_then(Value::as_str) else {
            continue;
        };

        let linked = input
            .get("link")
            .and_then(Value::as_i64)
            .and_then(|link_id| links.get(&link_id));

        if let Some(edge) = linked {
            inputs.insert(
                name.to_string(),
                Value::Array(vec![
                    Value::String(edge.from_node.to_string()),
                    Value::from(edge.from_slot),
                ]),
            );
        } else if let Some(widget) = widgets.get(widget_cursor) {
            inputs.insert(name.to_string(), widget.clone());
            widget_cursor += 1;
        } else {
            tracing::debug!(node_id = id, input = name, "No link or widget value for input");
        }
    }

    Some((id.to_string(), NodeSpec::new(class_type, inputs)))
}
