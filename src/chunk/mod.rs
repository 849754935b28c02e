//! Chunking of extracted page text
//!
//! Two strategies are available:
//! - Budgeted accumulation packs whole units (rendered text blocks) under a
//!   measured size budget, seeding each chunk with the tail of the previous one
//! - A sliding character window over the concatenated text, snapping window
//!   edges to nearby paragraph breaks
//!
//! Sizes come from an injected [`Measure`]. Both strategies are pure and
//! deterministic.

mod budgeted;
mod measure;
mod sliding;

pub use budgeted::chunk_budgeted;
pub use measure::{CharMeasure, Measure, MeasureUnit, TokenMeasure};
pub use sliding::chunk_sliding;

use crate::extract::{BlockKind, PageDocument, TextBlock};
use serde::Deserialize;
use thiserror::Error;

/// Separator placed between units inside a chunk
pub const UNIT_SEPARATOR: &str = "\n\n";

/// Default lookahead, in characters, for snapping sliding windows to `\n\n`
pub const DEFAULT_LOOKAHEAD: usize = 200;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("Failed to load tokenizer: {0}")]
    Tokenizer(anyhow::Error),
}

/// A contiguous piece of page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position within the page, contiguous from the configured base
    pub chunk_index: usize,
    pub text: String,
    /// Measured size of `text`
    pub size: usize,
    /// Byte length of the prefix duplicated from the previous chunk
    pub overlap_len: usize,
}

impl Chunk {
    /// Text not shared with the previous chunk
    pub fn fresh_text(&self) -> &str {
        self.text.get(self.overlap_len..).unwrap_or("")
    }
}

/// Overlap actually applied for a budget
///
/// An overlap that is not smaller than the budget would never let a chunk
/// advance, so it is reduced to a quarter of the budget.
pub fn effective_overlap(budget: usize, overlap: usize) -> usize {
    if overlap >= budget {
        budget / 4
    } else {
        overlap
    }
}

/// Chunking strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkStrategy {
    Budgeted,
    SlidingWindow,
}

impl ChunkStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budgeted => "budgeted",
            Self::SlidingWindow => "sliding-window",
        }
    }
}

/// Parameters of a [`Chunker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerSettings {
    pub strategy: ChunkStrategy,
    /// Size budget (measured units) or window size (characters)
    pub budget: usize,
    pub overlap: usize,
    /// `chunk_index` of the first chunk of each page
    pub index_base: usize,
    /// Chunk each heading section on its own
    pub respect_sections: bool,
    /// Sliding-window lookahead in characters
    pub lookahead: usize,
}

impl Default for ChunkerSettings {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Budgeted,
            budget: 900,
            overlap: 120,
            index_base: 1,
            respect_sections: true,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

/// A chunk of a page together with its section context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Heading path of the section the chunk came from, when chunking per section
    pub heading_path: Option<Vec<String>>,
    pub chunk: Chunk,
}

/// Turns [`PageDocument`]s into ordered chunks
pub struct Chunker {
    settings: ChunkerSettings,
    measure: Box<dyn Measure>,
}

impl Chunker {
    /// Creates a chunker with an explicit measure
    pub fn new(settings: ChunkerSettings, measure: Box<dyn Measure>) -> Self {
        Self { settings, measure }
    }

    /// Creates a chunker measuring in `unit`
    ///
    /// # Returns
    ///
    /// * `Ok(Chunker)` - Ready to chunk pages
    /// * `Err(ChunkError)` - The tokenizer could not be loaded
    pub fn with_unit(settings: ChunkerSettings, unit: MeasureUnit) -> Result<Self, ChunkError> {
        let measure: Box<dyn Measure> = match unit {
            MeasureUnit::Tokens => Box::new(TokenMeasure::cl100k()?),
            MeasureUnit::Chars => Box::new(CharMeasure),
        };
        Ok(Self::new(settings, measure))
    }

    pub fn settings(&self) -> &ChunkerSettings {
        &self.settings
    }

    pub fn unit(&self) -> MeasureUnit {
        self.measure.unit()
    }

    /// Chunks one page
    ///
    /// With `respect_sections` each heading section is chunked separately so
    /// no chunk spans two sections; indexes continue across sections.
    /// Otherwise all blocks form a single unit sequence.
    ///
    /// # Returns
    ///
    /// Chunks in page order with contiguous `chunk_index` values starting at
    /// `index_base`
    pub fn chunk_page(&self, page: &PageDocument) -> Vec<DocumentChunk> {
        let mut next_index = self.settings.index_base;

        if !self.settings.respect_sections {
            let units: Vec<String> = page.blocks.iter().map(render_unit).collect();
            return self
                .chunk_units(&units, next_index)
                .into_iter()
                .map(|chunk| DocumentChunk {
                    heading_path: None,
                    chunk,
                })
                .collect();
        }

        let mut chunks = Vec::new();
        for (heading_path, blocks) in page.sections() {
            let units: Vec<String> = blocks.iter().map(render_unit).collect();
            let section_chunks = self.chunk_units(&units, next_index);
            next_index += section_chunks.len();

            chunks.extend(section_chunks.into_iter().map(|chunk| DocumentChunk {
                heading_path: Some(heading_path.to_vec()),
                chunk,
            }));
        }

        chunks
    }

    /// Chunks a unit sequence with the configured strategy
    pub fn chunk_units<S: AsRef<str>>(&self, units: &[S], first_index: usize) -> Vec<Chunk> {
        let settings = &self.settings;
        match settings.strategy {
            ChunkStrategy::Budgeted => chunk_budgeted(
                units,
                settings.budget,
                settings.overlap,
                self.measure.as_ref(),
                first_index,
            ),
            ChunkStrategy::SlidingWindow => {
                let text = units
                    .iter()
                    .map(|u| u.as_ref().trim())
                    .filter(|u| !u.is_empty())
                    .collect::<Vec<_>>()
                    .join(UNIT_SEPARATOR);

                let mut chunks = chunk_sliding(
                    &text,
                    settings.budget,
                    settings.overlap,
                    settings.lookahead,
                    first_index,
                );
                for chunk in &mut chunks {
                    chunk.size = self.measure.measure(&chunk.text);
                }
                chunks
            }
        }
    }
}

impl std::fmt::Debug for Chunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunker")
            .field("settings", &self.settings)
            .field("unit", &self.measure.unit())
            .finish()
    }
}

/// Renders a block as chunk text
///
/// List items get a `- ` marker, blockquotes a `> ` marker, and
/// preformatted blocks are fenced with their language tag.
pub fn render_unit(block: &TextBlock) -> String {
    match &block.kind {
        BlockKind::Paragraph | BlockKind::BareText => block.text.clone(),
        BlockKind::ListItem => format!("- {}", block.text),
        BlockKind::Blockquote => format!("> {}", block.text),
        BlockKind::Preformatted { language } => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or(""),
            block.text
        ),
    }
}
