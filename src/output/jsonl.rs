//! JSON Lines and in-memory chunk sinks

use crate::chunk::DocumentChunk;
use crate::extract::PageDocument;
use crate::output::{ChunkRecord, ChunkSink, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per chunk, one per line
#[derive(Debug)]
pub struct JsonlSink<W: Write> {
    writer: W,
    records_written: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Creates (or truncates) a JSONL file
    ///
    /// # Arguments
    ///
    /// * `path` - Output file path; parent directories are created
    ///
    /// # Returns
    ///
    /// * `Ok(JsonlSink)` - Sink writing to the file
    /// * `Err(OutputError)` - The file could not be created
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    /// Returns the number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ChunkSink for JsonlSink<W> {
    fn write_page(&mut self, page: &PageDocument, chunks: &[DocumentChunk]) -> OutputResult<usize> {
        for chunk in chunks {
            let record = ChunkRecord::new(page, chunk);
            serde_json::to_writer(&mut self.writer, &record)?;
            self.writer.write_all(b"\n")?;
        }

        self.records_written += chunks.len();
        Ok(chunks.len())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps pages and records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub pages: Vec<PageDocument>,
    pub records: Vec<ChunkRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkSink for MemorySink {
    fn write_page(&mut self, page: &PageDocument, chunks: &[DocumentChunk]) -> OutputResult<usize> {
        self.pages.push(page.clone());
        self.records
            .extend(chunks.iter().map(|chunk| ChunkRecord::new(page, chunk)));
        Ok(chunks.len())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    fn create_test_page() -> PageDocument {
        PageDocument {
            url: "https://docs.example.com/guide/".to_string(),
            title: "Guide".to_string(),
            blocks: Vec::new(),
            last_modified: None,
        }
    }

    fn create_test_chunks() -> Vec<DocumentChunk> {
        (1..=2)
            .map(|chunk_index| DocumentChunk {
                heading_path: Some(vec!["Intro".to_string()]),
                chunk: Chunk {
                    chunk_index,
                    text: format!("chunk {}\nsecond line", chunk_index),
                    size: 20,
                    overlap_len: 0,
                },
            })
            .collect()
    }

    #[test]
    fn test_jsonl_one_record_per_line() {
        let mut sink = JsonlSink::new(Vec::new());
        let written = sink
            .write_page(&create_test_page(), &create_test_chunks())
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(sink.records_written(), 2);

        let bytes = sink.into_inner().unwrap();
        let output = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ChunkRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.id, "https://docs.example.com/guide/#chunk-1");
        assert_eq!(first.text, "chunk 1\nsecond line");
        assert_eq!(first.heading_path, Some(vec!["Intro".to_string()]));
    }

    #[test]
    fn test_jsonl_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chunks.jsonl");

        let mut sink = JsonlSink::create(&path).unwrap();
        sink.write_page(&create_test_page(), &create_test_chunks())
            .unwrap();
        sink.flush().unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.write_page(&create_test_page(), &create_test_chunks())
            .unwrap();
        sink.write_page(&create_test_page(), &[]).unwrap();

        assert_eq!(sink.pages.len(), 2);
        assert_eq!(sink.records.len(), 2);
    }
}
