#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unsupported file type: '{extension}' (expected json or png)")]
    UnsupportedFileType { extension: String },

    #[error("No workflow metadata found in PNG file")]
    PngExtractionFailed,

    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseFailed(String),

    #[error("Invalid or empty workflow after processing")]
    EmptyRewrittenGraph,

    #[error("No prompt, image or output nodes found in workflow")]
    NoClassifiableNodes,

    #[error("Failed to read workflow file: {0}")]
    Io(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
