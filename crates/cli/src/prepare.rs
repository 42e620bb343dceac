//! Applies the command-line overrides to a converted workflow.

use anyhow::bail;

use promptdeck_core::workflow::{ApiGraph, ConvertedWorkflow};
use promptdeck_core::workflow_params::{randomize_seeds, set_input_image, set_prompt_text};

use crate::args::Args;

/// Produce the graph to emit: prompt and image injected, seeds refreshed.
pub fn prepare_graph(converted: &ConvertedWorkflow, args: &Args) -> anyhow::Result<ApiGraph> {
    let mut graph = converted.api_graph.clone();

    if let Some(text) = &args.prompt {
        let node_id = select_node(
            args.prompt_node.as_deref(),
            &converted.default_prompt_node_id,
            "prompt",
        )?;
        tracing::info!(node_id, "Injecting prompt text");
        graph = set_prompt_text(&graph, node_id, text)?;
    }

    if let Some(filename) = &args.image {
        let node_id = select_node(
            args.image_node.as_deref(),
            &converted.default_image_node_id,
            "image",
        )?;
        tracing::info!(node_id, filename = %filename, "Injecting input image");
        graph = set_input_image(&graph, node_id, filename)?;
    }

    if args.randomize_seeds {
        let (seeded, changed) = randomize_seeds(&graph, &mut rand::rng());
        tracing::info!(changed, "Seeds randomized");
        graph = seeded;
    }

    Ok(graph)
}

/// Explicit selection wins; otherwise the default, which is empty when the
/// workflow has no node of that role.
fn select_node<'a>(explicit: Option<&'a str>, default: &'a str, role: &str) -> anyhow::Result<&'a str> {
    match explicit {
        Some(id) => Ok(id),
        None if !default.is_empty() => Ok(default),
        None => bail!("Workflow has no {role} node"),
    }
}
