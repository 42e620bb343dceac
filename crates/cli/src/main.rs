//! `promptdeck-convert` -- converts ComfyUI workflow files into API graphs.
//!
//! Loads an editor or API workflow from a `.json` file or from the text
//! metadata of a `.png`, optionally injects a prompt, an input image and
//! fresh seeds, and prints the resulting JSON on stdout. Logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default | Description                          |
//! |--------------------------|----------|---------|--------------------------------------|
//! | `RUST_LOG`               | no       | `promptdeck_cli=info,promptdeck_core=info` | Log filter |
//! | `PROMPTDECK_PROMPT_NODE` | no       | --      | Same as `--prompt-node`              |
//! | `PROMPTDECK_IMAGE_NODE`  | no       | --      | Same as `--image-node`               |
//! | `PROMPTDECK_CLIENT_ID`   | no       | --      | Same as `--client-id`                |
//! | `PROMPTDECK_JSON_LOGS`   | no       | `false` | Same as `--json-logs`                |

mod args;
mod prepare;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptdeck_core::workflow_loader::load_workflow_file;
use promptdeck_core::workflow_params::build_prompt_request;

use crate::args::Args;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "promptdeck_cli=info,promptdeck_core=info";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.json_logs);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Workflow conversion failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json_logs: bool) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    );

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let converted = load_workflow_file(&args.path)
        .with_context(|| format!("Failed to load workflow from {}", args.path.display()))?;

    tracing::info!(
        path = %args.path.display(),
        default_prompt = %converted.default_prompt_node_id,
        default_image = %converted.default_image_node_id,
        default_output = %converted.default_output_node_id,
        "Workflow loaded",
    );

    let graph = prepare::prepare_graph(&converted, args)?;

    let output = if args.full {
        let mut converted = converted;
        converted.api_graph = graph;
        serde_json::to_value(&converted)?
    } else if let Some(client_id) = &args.client_id {
        build_prompt_request(&graph, client_id)
    } else {
        serde_json::to_value(&graph)?
    };

    let text = serde_json::to_string_pretty(&output)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Output written");
        }
        None => println!("{text}"),
    }

    Ok(())
}
