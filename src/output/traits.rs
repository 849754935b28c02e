//! Output sink trait and record types
//!
//! This module defines the trait interface for chunk sinks and the record
//! written for every chunk.

use crate::chunk::DocumentChunk;
use crate::extract::PageDocument;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One chunk as written to the output
///
/// Optional fields are omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// `{url}#chunk-{chunk_index}`
    pub id: String,
    pub url: String,
    pub title: String,
    pub chunk_index: usize,
    pub text: String,
    /// Size in the configured measure's unit
    pub num_tokens_or_chars: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_path: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ChunkRecord {
    /// Builds the record for a chunk of `page`
    pub fn new(page: &PageDocument, chunk: &DocumentChunk) -> Self {
        Self {
            id: format!("{}#chunk-{}", page.url, chunk.chunk.chunk_index),
            url: page.url.clone(),
            title: page.title.clone(),
            chunk_index: chunk.chunk.chunk_index,
            text: chunk.chunk.text.clone(),
            num_tokens_or_chars: chunk.chunk.size,
            heading_path: chunk.heading_path.clone(),
            last_modified: page.last_modified.clone(),
        }
    }
}

/// Trait for chunk sinks
///
/// A sink receives each extracted page once, together with its chunks in
/// emission order.
pub trait ChunkSink {
    /// Records a page and its chunks
    ///
    /// # Arguments
    ///
    /// * `page` - The extracted page
    /// * `chunks` - The page's chunks in order
    ///
    /// # Returns
    ///
    /// The number of records written
    fn write_page(&mut self, page: &PageDocument, chunks: &[DocumentChunk]) -> OutputResult<usize>;

    /// Flushes buffered records
    fn flush(&mut self) -> OutputResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    fn create_test_page(last_modified: Option<&str>) -> PageDocument {
        PageDocument {
            url: "https://docs.example.com/guide/install".to_string(),
            title: "Install".to_string(),
            blocks: Vec::new(),
            last_modified: last_modified.map(|s| s.to_string()),
        }
    }

    fn create_test_chunk(heading_path: Option<Vec<String>>) -> DocumentChunk {
        DocumentChunk {
            heading_path,
            chunk: Chunk {
                chunk_index: 3,
                text: "Run the installer.".to_string(),
                size: 18,
                overlap_len: 0,
            },
        }
    }

    #[test]
    fn test_record_id() {
        let record = ChunkRecord::new(&create_test_page(None), &create_test_chunk(None));
        assert_eq!(record.id, "https://docs.example.com/guide/install#chunk-3");
        assert_eq!(record.num_tokens_or_chars, 18);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let record = ChunkRecord::new(&create_test_page(None), &create_test_chunk(None));
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("heading_path"));
        assert!(!object.contains_key("last_modified"));
        assert_eq!(object.len(), 6);
    }

    #[test]
    fn test_optional_fields_present() {
        let record = ChunkRecord::new(
            &create_test_page(Some("2015-10-21T07:28:00+00:00")),
            &create_test_chunk(Some(vec!["Setup".to_string()])),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["heading_path"], serde_json::json!(["Setup"]));
        assert_eq!(json["last_modified"], "2015-10-21T07:28:00+00:00");
        assert_eq!(json["chunk_index"], 3);
    }
}
