//! Command-line arguments for `promptdeck-convert`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "promptdeck-convert")]
#[command(about = "Convert ComfyUI workflow files into API prompt graphs")]
#[command(version)]
pub struct Args {
    /// Workflow file: editor/API JSON, or a PNG with embedded workflow metadata
    pub path: PathBuf,

    /// Prompt node that receives --prompt (defaults to the first prompt node)
    #[arg(long, env = "PROMPTDECK_PROMPT_NODE")]
    pub prompt_node: Option<String>,

    /// Image node that receives --image (defaults to the first LoadImage node)
    #[arg(long, env = "PROMPTDECK_IMAGE_NODE")]
    pub image_node: Option<String>,

    /// Prompt text to write into the selected prompt node
    #[arg(long)]
    pub prompt: Option<String>,

    /// Image filename to write into the selected image node
    #[arg(long)]
    pub image: Option<String>,

    /// Replace literal sampler seeds with random values
    #[arg(long)]
    pub randomize_seeds: bool,

    /// Wrap the graph in a queue request body for this client id
    #[arg(long, env = "PROMPTDECK_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Print the full conversion result including node pickers
    #[arg(long, conflicts_with = "client_id")]
    pub full: bool,

    /// Write the JSON to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, env = "PROMPTDECK_JSON_LOGS")]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_only() {
        let args = Args::try_parse_from(["promptdeck-convert", "workflow.json"]).unwrap();
        assert_eq!(args.path, PathBuf::from("workflow.json"));
        assert!(args.prompt.is_none());
        assert!(!args.randomize_seeds);
        assert!(!args.full);
    }

    #[test]
    fn injection_flags() {
        let args = Args::try_parse_from([
            "promptdeck-convert",
            "render.png",
            "--prompt",
            "a castle",
            "--prompt-node",
            "6",
            "--image",
            "upload.png",
            "--randomize-seeds",
            "-o",
            "out.json",
        ])
        .unwrap();

        assert_eq!(args.prompt.as_deref(), Some("a castle"));
        assert_eq!(args.prompt_node.as_deref(), Some("6"));
        assert_eq!(args.image.as_deref(), Some("upload.png"));
        assert!(args.randomize_seeds);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn full_conflicts_with_client_id() {
        let result = Args::try_parse_from([
            "promptdeck-convert",
            "workflow.json",
            "--full",
            "--client-id",
            "abc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn path_is_required() {
        assert!(Args::try_parse_from(["promptdeck-convert"]).is_err());
    }
}
