//! Submission preparation for API-form graphs.
//!
//! Injects the user's prompt text and input image into the selected nodes,
//! refreshes sampler seeds and wraps the graph in the body the ComfyUI
//! queue endpoint accepts. Every function returns a new graph.

use rand::Rng;
use serde_json::Value;

use crate::error::CoreError;
use crate::workflow::classify::{CLIP_TEXT_ENCODE_CLASS, LOAD_IMAGE_CLASS};
use crate::workflow::ApiGraph;

/// Input names that hold a sampler seed.
pub const SEED_INPUT_NAMES: &[&str] = &["seed", "noise_seed"];

/// Largest seed generated; stays within the JSON-safe integer range.
pub const MAX_SEED: u64 = (1 << 53) - 1;

/// Set the `text` input of a `CLIPTextEncode` node.
pub fn set_prompt_text(graph: &ApiGraph, node_id: &str, text: &str) -> Result<ApiGraph, CoreError> {
    set_literal_input(graph, node_id, CLIP_TEXT_ENCODE_CLASS, "text", Value::from(text))
}

/// Set the `image` input of a `LoadImage` node.
pub fn set_input_image(
    graph: &ApiGraph,
    node_id: &str,
    filename: &str,
) -> Result<ApiGraph, CoreError> {
    set_literal_input(graph, node_id, LOAD_IMAGE_CLASS, "image", Value::from(filename))
}

/// Replace every literal integer seed with a fresh random value.
///
/// Seeds wired from another node are left alone. Returns the new graph and
/// the number of seeds replaced.
pub fn randomize_seeds<R: Rng + ?Sized>(graph: &ApiGraph, rng: &mut R) -> (ApiGraph, usize) {
    let mut updated = graph.clone();
    let mut changed = 0;

    for (node_id, spec) in updated.iter_mut() {
        for name in SEED_INPUT_NAMES {
            let Some(value) = spec.inputs.get_mut(*name) else {
                continue;
            };
            if value.is_u64() || value.is_i64() {
                let seed = rng.random_range(0..=MAX_SEED);
                tracing::debug!(node_id = %node_id, input = *name, seed, "Seed refreshed");
                *value = Value::from(seed);
                changed += 1;
            }
        }
    }

    (updated, changed)
}

/// Body for the ComfyUI `POST /prompt` endpoint.
pub fn build_prompt_request(graph: &ApiGraph, client_id: &str) -> serde_json::Value {
    serde_json::json!({
        "prompt": graph,
        "client_id": client_id,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn set_literal_input(
    graph: &ApiGraph,
    node_id: &str,
    expected_class: &str,
    input_name: &str,
    value: Value,
) -> Result<ApiGraph, CoreError> {
    let mut updated = graph.clone();
    let spec = updated.get_mut(node_id).ok_or_else(|| {
        CoreError::Validation(format!("Node '{node_id}' not found in workflow"))
    })?;

    if spec.class_type != expected_class {
        return Err(CoreError::Validation(format!(
            "Node '{node_id}' is a {}, expected {expected_class}",
            spec.class_type
        )));
    }

    spec.inputs.insert(input_name.to_string(), value);
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use crate::workflow::NodeSpec;

    fn sample_graph() -> ApiGraph {
        let entries = [
            ("1", "LoadImage", json!({ "image": "old.png" })),
            ("3", "KSampler", json!({ "seed": 42, "steps": 20, "model": ["4", 0] })),
            ("5", "KSamplerAdvanced", json!({ "noise_seed": ["11", 0] })),
            ("6", "CLIPTextEncode", json!({ "text": "old", "clip": ["4", 1] })),
            ("9", "SaveImage", json!({ "images": ["8", 0] })),
        ];
        entries
            .into_iter()
            .map(|(id, class, inputs)| {
                (id.to_string(), NodeSpec::new(class, inputs.as_object().cloned().unwrap()))
            })
            .collect()
    }

    #[test]
    fn prompt_text_is_set_on_prompt_node() {
        let original = sample_graph();
        let updated = set_prompt_text(&original, "6", "a lighthouse at dusk").unwrap();

        assert_eq!(updated["6"].inputs["text"], json!("a lighthouse at dusk"));
        assert_eq!(updated["6"].inputs["clip"], json!(["4", 1]));
        assert_eq!(original["6"].inputs["text"], json!("old"));
    }

    #[test]
    fn prompt_text_on_wrong_class_is_rejected() {
        let err = set_prompt_text(&sample_graph(), "9", "x").unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert!(err.to_string().contains("expected CLIPTextEncode"));
    }

    #[test]
    fn missing_node_is_rejected() {
        assert_matches!(
            set_input_image(&sample_graph(), "77", "in.png"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn input_image_is_set_on_load_image_node() {
        let updated = set_input_image(&sample_graph(), "1", "upload_01.png").unwrap();
        assert_eq!(updated["1"].inputs["image"], json!("upload_01.png"));
    }

    #[test]
    fn literal_seeds_are_randomized_and_links_kept() {
        let mut rng = StdRng::seed_from_u64(7);
        let (updated, changed) = randomize_seeds(&sample_graph(), &mut rng);

        assert_eq!(changed, 1);
        let seed = updated["3"].inputs["seed"].as_u64().unwrap();
        assert!(seed <= MAX_SEED);
        assert_eq!(updated["5"].inputs["noise_seed"], json!(["11", 0]));
        assert_eq!(updated["3"].inputs["steps"], json!(20));
    }

    #[test]
    fn prompt_request_wraps_graph() {
        let body = build_prompt_request(&sample_graph(), "client-1");
        assert_eq!(body["client_id"], json!("client-1"));
        assert_eq!(body["prompt"]["9"]["class_type"], json!("SaveImage"));
    }
}
