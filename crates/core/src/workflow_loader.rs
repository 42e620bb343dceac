//! Loading workflows from `.json` and `.png` files.
//!
//! Stages fail fast in order: file type, PNG extraction, JSON parse, graph
//! rewrite, node classification.

use std::path::Path;

use crate::error::CoreError;
use crate::png_metadata::extract_workflow_text;
use crate::workflow::{convert_workflow, into_workflow_object, parse_workflow_json, ConvertedWorkflow};

/// Supported workflow file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowFileType {
    Json,
    Png,
}

impl WorkflowFileType {
    /// Resolve a file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> Result<Self, CoreError> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "png" => Ok(Self::Png),
            _ => Err(CoreError::UnsupportedFileType {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy())
            .unwrap_or_default();
        Self::from_extension(&extension)
    }
}

/// Read and convert a workflow file.
///
/// The file type is checked before the file is read.
pub fn load_workflow_file(path: &Path) -> Result<ConvertedWorkflow, CoreError> {
    let file_type = WorkflowFileType::from_path(path)?;
    let bytes = std::fs::read(path)
        .map_err(|e| CoreError::Io(format!("{}: {e}", path.display())))?;

    tracing::debug!(path = %path.display(), ?file_type, size = bytes.len(), "Loading workflow file");
    load_workflow_bytes(&bytes, file_type)
}

/// Convert workflow file contents of the given type.
pub fn load_workflow_bytes(
    bytes: &[u8],
    file_type: WorkflowFileType,
) -> Result<ConvertedWorkflow, CoreError> {
    let root = match file_type {
        WorkflowFileType::Json => {
            let value = serde_json::from_slice(bytes)
                .map_err(|e| CoreError::JsonParseFailed(e.to_string()))?;
            into_workflow_object(value)?
        }
        WorkflowFileType::Png => {
            let text = extract_workflow_text(bytes).ok_or(CoreError::PngExtractionFailed)?;
            parse_workflow_json(&text)?
        }
    };

    convert_workflow(&root)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn extensions_resolve_case_insensitively() {
        assert_eq!(WorkflowFileType::from_extension("json").unwrap(), WorkflowFileType::Json);
        assert_eq!(WorkflowFileType::from_extension("PNG").unwrap(), WorkflowFileType::Png);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = WorkflowFileType::from_extension("jpg").unwrap_err();
        assert_matches!(err, CoreError::UnsupportedFileType { ref extension } if extension == "jpg");
    }

    #[test]
    fn path_without_extension_is_unsupported() {
        assert_matches!(
            WorkflowFileType::from_path(Path::new("workflow")),
            Err(CoreError::UnsupportedFileType { .. })
        );
    }

    #[test]
    fn unsupported_file_is_rejected_before_read() {
        // The file does not exist; the type check must fail first.
        assert_matches!(
            load_workflow_file(Path::new("/nonexistent/workflow.webp")),
            Err(CoreError::UnsupportedFileType { .. })
        );
    }

    #[test]
    fn missing_json_file_is_io_error() {
        assert_matches!(
            load_workflow_file(Path::new("/nonexistent/workflow.json")),
            Err(CoreError::Io(_))
        );
    }

    #[test]
    fn invalid_json_bytes_are_parse_error() {
        assert_matches!(
            load_workflow_bytes(b"\xff\xfe not json", WorkflowFileType::Json),
            Err(CoreError::JsonParseFailed(_))
        );
    }

    #[test]
    fn json_array_is_parse_error() {
        assert_matches!(
            load_workflow_bytes(b"[]", WorkflowFileType::Json),
            Err(CoreError::JsonParseFailed(_))
        );
    }

    #[test]
    fn png_without_workflow_is_extraction_error() {
        assert_matches!(
            load_workflow_bytes(b"\x89PNG\r\n\x1a\n", WorkflowFileType::Png),
            Err(CoreError::PngExtractionFailed)
        );
    }

    #[test]
    fn api_json_bytes_convert() {
        let bytes = br#"{"9": {"class_type": "SaveImage", "inputs": {"filename_prefix": "x"}}}"#;
        let converted = load_workflow_bytes(bytes, WorkflowFileType::Json).unwrap();
        assert_eq!(converted.default_output_node_id, "9");
    }
}
