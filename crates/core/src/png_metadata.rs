//! Workflow extraction from PNG text metadata.
//!
//! ComfyUI's image exporter embeds the workflow JSON in `tEXt` chunks keyed
//! `workflow` (UI form) and `prompt` (API form). The chunk stream is walked
//! by hand first; if that finds nothing, the `png` decoder's parsed text
//! entries (`tEXt`, `zTXt`, `iTXt`) are checked for the same keywords.

use std::io::Cursor;

/// PNG file signature.
pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Text chunk keywords that carry a workflow.
pub const WORKFLOW_KEYWORDS: &[&str] = &["workflow", "prompt", "Workflow", "Prompt"];

/// Chunk length + type header size.
const CHUNK_HEADER_LEN: usize = 8;

/// Trailing CRC size.
const CHUNK_CRC_LEN: usize = 4;

/// Find the workflow string embedded in a PNG file's text metadata.
///
/// The manual walk returns the first matching `tEXt` chunk in file order. The
/// decoder fallback checks `tEXt`, then `zTXt`, then `iTXt` entries, so chunk
/// type decides precedence there rather than position. Returns `None` when no
/// chunk carries a workflow.
pub fn extract_workflow_text(png_bytes: &[u8]) -> Option<String> {
    find_text_chunk(png_bytes).or_else(|| find_decoded_text(png_bytes))
}

/// Walk the chunk stream looking for a workflow `tEXt` chunk.
///
/// A truncated or malformed chunk header ends the walk.
pub fn find_text_chunk(png_bytes: &[u8]) -> Option<String> {
    if !png_bytes.starts_with(PNG_SIGNATURE) {
        return None;
    }

    let mut pos = PNG_SIGNATURE.len();

    while let Some(header) = png_bytes.get(pos..pos + CHUNK_HEADER_LEN) {
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let chunk_type = &header[4..8];

        let data_start = pos + CHUNK_HEADER_LEN;
        let Some(data) = data_start
            .checked_add(length)
            .and_then(|data_end| png_bytes.get(data_start..data_end))
        else {
            tracing::debug!(offset = pos, length, "Truncated PNG chunk, stopping walk");
            return None;
        };

        if chunk_type == b"tEXt" {
            if let Some(text) = workflow_from_text_chunk(data) {
                return Some(text);
            }
        } else if chunk_type == b"IEND" {
            return None;
        }

        pos = data_start + length + CHUNK_CRC_LEN;
    }

    None
}

/// `tEXt` keyword and value are ISO-8859-1.
fn workflow_from_text_chunk(data: &[u8]) -> Option<String> {
    let null_pos = data.iter().position(|&b| b == 0)?;
    let keyword = latin1_to_string(&data[..null_pos]);

    if !is_workflow_keyword(&keyword) {
        return None;
    }
    Some(latin1_to_string(&data[null_pos + 1..]))
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Check the text entries the `png` decoder parsed from the header.
fn find_decoded_text(png_bytes: &[u8]) -> Option<String> {
    let decoder = png::Decoder::new(Cursor::new(png_bytes));
    let reader = match decoder.read_info() {
        Ok(reader) => reader,
        Err(e) => {
            tracing::debug!(error = %e, "PNG decoder could not read metadata");
            return None;
        }
    };
    let info = reader.info();

    let latin1 = info
        .uncompressed_latin1_text
        .iter()
        .filter(|chunk| is_workflow_keyword(&chunk.keyword))
        .map(|chunk| chunk.text.clone());
    let compressed = info
        .compressed_latin1_text
        .iter()
        .filter(|chunk| is_workflow_keyword(&chunk.keyword))
        .filter_map(|chunk| chunk.get_text().ok());
    let utf8 = info
        .utf8_text
        .iter()
        .filter(|chunk| is_workflow_keyword(&chunk.keyword))
        .filter_map(|chunk| chunk.get_text().ok());

    latin1.chain(compressed).chain(utf8).next()
}

fn is_workflow_keyword(keyword: &str) -> bool {
    WORKFLOW_KEYWORDS.contains(&keyword.trim())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
