//! ComfyUI workflow conversion pipeline.
//!
//! A workflow arrives either in the editor ("UI") serialization, with a
//! `nodes` array, a global `links` table and positional `widgets_values`,
//! or in the API serialization, a flat object of node id to
//! `{class_type, inputs}`. [`convert_workflow`] normalizes both into an
//! [`ApiGraph`] and classifies the nodes the caller presents as pickers.

pub mod classify;
pub mod format;
pub mod links;
pub mod rewrite;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

use self::classify::{classify_nodes, NodeClassification, NodeInfo};
use self::format::{detect_format, WorkflowFormat};
use self::links::build_link_table;
use self::rewrite::rewrite_ui_graph;

/// API-form workflow graph keyed by node id string.
pub type ApiGraph = BTreeMap<String, NodeSpec>;

/// A single node in an API-form graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// ComfyUI class type (e.g. "KSampler", "CLIPTextEncode").
    pub class_type: String,
    /// Input name to either a literal value or a `[source_id, slot]` reference.
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Any other keys carried by the node (`_meta` and friends), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeSpec {
    pub fn new(class_type: impl Into<String>, inputs: Map<String, Value>) -> Self {
        Self {
            class_type: class_type.into(),
            inputs,
            extra: Map::new(),
        }
    }
}

/// Result of a successful conversion: the API graph plus picker data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedWorkflow {
    pub source_format: WorkflowFormat,
    pub api_graph: ApiGraph,
    pub prompt_nodes: Vec<NodeInfo>,
    pub output_nodes: Vec<NodeInfo>,
    pub image_nodes: Vec<NodeInfo>,
    pub default_prompt_node_id: String,
    pub default_output_node_id: String,
    pub default_image_node_id: String,
}

impl ConvertedWorkflow {
    fn new(source_format: WorkflowFormat, api_graph: ApiGraph, nodes: NodeClassification) -> Self {
        let default_prompt_node_id = nodes.default_prompt_node_id();
        let default_output_node_id = nodes.default_output_node_id();
        let default_image_node_id = nodes.default_image_node_id();

        Self {
            source_format,
            api_graph,
            prompt_nodes: nodes.prompt_nodes,
            output_nodes: nodes.output_nodes,
            image_nodes: nodes.image_nodes,
            default_prompt_node_id,
            default_output_node_id,
            default_image_node_id,
        }
    }
}

/// Parse workflow text into its top-level JSON object.
pub fn parse_workflow_json(text: &str) -> Result<Map<String, Value>, CoreError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CoreError::JsonParseFailed(e.to_string()))?;
    into_workflow_object(value)
}

/// Require the parsed value to be a JSON object.
pub(crate) fn into_workflow_object(value: Value) -> Result<Map<String, Value>, CoreError> {
    match value {
        Value::Object(obj) => Ok(obj),
        _ => Err(CoreError::JsonParseFailed(
            "top-level workflow value must be an object".to_string(),
        )),
    }
}

/// Convert a parsed workflow object into an API graph and classify its nodes.
///
/// UI-form input is rewritten through the link table; API-form input passes
/// through. Fails if the rewrite yields no nodes, or if no prompt, image or
/// output node is found.
pub fn convert_workflow(root: &Map<String, Value>) -> Result<ConvertedWorkflow, CoreError> {
    let format = detect_format(root);

    let api_graph = match format {
        WorkflowFormat::Ui => {
            let nodes = array_field(root, "nodes");
            let links = build_link_table(array_field(root, "links"));
            rewrite_ui_graph(nodes, &links)?
        }
        WorkflowFormat::Api => api_graph_from_object(root),
    };

    let nodes = classify_nodes(&api_graph)?;

    tracing::info!(
        format = ?format,
        node_count = api_graph.len(),
        prompt_nodes = nodes.prompt_nodes.len(),
        image_nodes = nodes.image_nodes.len(),
        output_nodes = nodes.output_nodes.len(),
        "Workflow converted",
    );

    Ok(ConvertedWorkflow::new(format, api_graph, nodes))
}

/// Read an API-form object into typed node specs.
///
/// Entries that are not `{class_type, inputs}` objects are dropped.
pub fn api_graph_from_object(root: &Map<String, Value>) -> ApiGraph {
    root.iter()
        .filter_map(|(id, value)| {
            match serde_json::from_value::<NodeSpec>(value.clone()) {
                Ok(spec) => Some((id.clone(), spec)),
                Err(e) => {
                    tracing::debug!(node_id = %id, error = %e, "Skipping non-node entry");
                    None
                }
            }
        })
        .collect()
}

fn array_field<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
