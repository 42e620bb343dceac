//! Node classification for the prompt, image and output pickers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

use super::ApiGraph;

// ---------------------------------------------------------------------------
// ComfyUI node class types
// ---------------------------------------------------------------------------

/// CLIP text encode node class type.
pub const CLIP_TEXT_ENCODE_CLASS: &str = "CLIPTextEncode";

/// Load image node class type.
pub const LOAD_IMAGE_CLASS: &str = "LoadImage";

/// Save image node class type.
pub const SAVE_IMAGE_CLASS: &str = "SaveImage";

/// Preview image node class type.
pub const PREVIEW_IMAGE_CLASS: &str = "PreviewImage";

/// Characters of prompt text shown in a prompt node label.
pub const PROMPT_PREVIEW_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Role a node plays in the pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Prompt,
    ImageInput,
    Output,
}

impl NodeRole {
    /// Exact match on the node class type; unknown types have no role.
    pub fn from_class_type(class_type: &str) -> Option<Self> {
        match class_type {
            CLIP_TEXT_ENCODE_CLASS => Some(Self::Prompt),
            LOAD_IMAGE_CLASS => Some(Self::ImageInput),
            SAVE_IMAGE_CLASS | PREVIEW_IMAGE_CLASS => Some(Self::Output),
            _ => None,
        }
    }
}

/// A classified node as presented in a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub label: String,
    /// Literal `text` input; only set on prompt nodes.
    #[serde(rename = "promptText", default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
}

/// Classified nodes, each list sorted by id string.
#[derive(Debug, Clone, Default)]
pub struct NodeClassification {
    pub prompt_nodes: Vec<NodeInfo>,
    pub image_nodes: Vec<NodeInfo>,
    pub output_nodes: Vec<NodeInfo>,
}

impl NodeClassification {
    pub fn is_empty(&self) -> bool {
        self.prompt_nodes.is_empty() && self.image_nodes.is_empty() && self.output_nodes.is_empty()
    }

    /// First prompt node id, or an empty string if there is none.
    pub fn default_prompt_node_id(&self) -> String {
        first_id(&self.prompt_nodes)
    }

    pub fn default_image_node_id(&self) -> String {
        first_id(&self.image_nodes)
    }

    pub fn default_output_node_id(&self) -> String {
        first_id(&self.output_nodes)
    }
}

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Bucket the nodes of an API graph by role.
///
/// Lists are ordered by comparing id strings, so "10" sorts before "2".
/// Returns [`CoreError::NoClassifiableNodes`] when every bucket is empty.
pub fn classify_nodes(graph: &ApiGraph) -> Result<NodeClassification, CoreError> {
    let mut nodes = NodeClassification::default();

    for (id, spec) in graph {
        match NodeRole::from_class_type(&spec.class_type) {
            Some(NodeRole::Prompt) => {
                let text = spec
                    .inputs
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                nodes.prompt_nodes.push(NodeInfo {
                    id: id.clone(),
                    label: prompt_label(id, text),
                    prompt_text: Some(text.to_string()),
                });
            }
            Some(NodeRole::ImageInput) => {
                nodes.image_nodes.push(typed_node_info(id, &spec.class_type));
            }
            Some(NodeRole::Output) => {
                nodes.output_nodes.push(typed_node_info(id, &spec.class_type));
            }
            None => {}
        }
    }

    if nodes.is_empty() {
        return Err(CoreError::NoClassifiableNodes);
    }

    nodes.prompt_nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes.image_nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes.output_nodes.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(nodes)
}

/// Picker label for a prompt node, previewing at most
/// [`PROMPT_PREVIEW_CHARS`] characters of its text.
pub fn prompt_label(id: &str, text: &str) -> String {
    if text.is_empty() {
        return format!("Node {id}");
    }

    let preview: String = text.chars().take(PROMPT_PREVIEW_CHARS).collect();
    let ellipsis = if text.chars().count() > PROMPT_PREVIEW_CHARS {
        "..."
    } else {
        ""
    };
    format!("Node {id}: {preview}{ellipsis}")
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn typed_node_info(id: &str, class_type: &str) -> NodeInfo {
    NodeInfo {
        id: id.to_string(),
        label: format!("Node {id}: {class_type}"),
        prompt_text: None,
    }
}

fn first_id(nodes: &[NodeInfo]) -> String {
    nodes.first().map(|n| n.id.clone()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
