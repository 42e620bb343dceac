//! Detection of the workflow serialization format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serialization format of a workflow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowFormat {
    /// Editor export: `nodes` + `links` arrays with positional widget values.
    Ui,
    /// Execution format: flat object of node id to `{class_type, inputs}`.
    Api,
}

/// Classify a top-level workflow object.
///
/// UI-form requires `nodes` to be an array of objects and `links` to be an
/// array of arrays. Anything else is treated as API-form.
pub fn detect_format(root: &Map<String, Value>) -> WorkflowFormat {
    let nodes_ok = root
        .get("nodes")
        .and_then(Value::as_array)
        .is_some_and(|nodes| nodes.iter().all(Value::is_object));
    let links_ok = root
        .get("links")
        .and_then(Value::as_array)
        .is_some_and(|links| links.iter().all(Value::is_array));

    if nodes_ok && links_ok {
        WorkflowFormat::Ui
    } else {
        WorkflowFormat::Api
    }
}
