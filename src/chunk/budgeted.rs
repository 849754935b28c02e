//! Budgeted accumulation of units into overlapping chunks

use crate::chunk::{effective_overlap, Chunk, Measure, UNIT_SEPARATOR};

/// Packs units into chunks whose measured size stays within `budget`
///
/// Units are appended (joined by a blank line) while the measured candidate
/// text fits. On overflow the buffer is flushed as a chunk and, when
/// `overlap` is non-zero, the next buffer is seeded with the trailing
/// `overlap`-sized slice of that chunk. A seed that leaves no room for the
/// next unit is dropped. A unit that alone exceeds the budget is emitted
/// unsplit as its own chunk.
///
/// # Arguments
///
/// * `units` - Text units in order; blank units are ignored
/// * `budget` - Maximum measured size of a chunk
/// * `overlap` - Measured size of the seed carried into the next chunk
/// * `measure` - Size policy
/// * `first_index` - `chunk_index` of the first emitted chunk
///
/// # Returns
///
/// Chunks with contiguous indexes starting at `first_index`
pub fn chunk_budgeted<S: AsRef<str>>(
    units: &[S],
    budget: usize,
    overlap: usize,
    measure: &dyn Measure,
    first_index: usize,
) -> Vec<Chunk> {
    let overlap = effective_overlap(budget, overlap);
    let mut packer = Packer {
        budget,
        overlap,
        measure,
        next_index: first_index,
        chunks: Vec::new(),
        parts: Vec::new(),
        seed_len: 0,
    };

    for unit in units {
        let unit = unit.as_ref().trim();
        if !unit.is_empty() {
            packer.push(unit);
        }
    }

    packer.flush();
    packer.chunks
}

struct Packer<'m> {
    budget: usize,
    overlap: usize,
    measure: &'m dyn Measure,
    next_index: usize,
    chunks: Vec<Chunk>,
    /// Buffered parts; `parts[0]` is the seed when `seed_len > 0`
    parts: Vec<String>,
    /// Byte length of the seed plus its separator, 0 when unseeded
    seed_len: usize,
}

impl Packer<'_> {
    fn push(&mut self, unit: &str) {
        loop {
            if self.parts.is_empty() {
                if self.measure.measure(unit) > self.budget {
                    self.emit(unit.to_string(), 0);
                    self.seed_from_last();
                } else {
                    self.parts.push(unit.to_string());
                }
                return;
            }

            let candidate = self.joined_with(unit);
            if self.measure.measure(&candidate) <= self.budget {
                self.parts.push(unit.to_string());
                return;
            }

            if self.only_seed() {
                self.parts.clear();
                self.seed_len = 0;
            } else {
                self.flush();
            }
        }
    }

    fn flush(&mut self) {
        if self.parts.is_empty() || self.only_seed() {
            self.parts.clear();
            self.seed_len = 0;
            return;
        }

        let text = self.parts.join(UNIT_SEPARATOR);
        let overlap_len = self.seed_len;
        self.parts.clear();
        self.seed_len = 0;
        self.emit(text, overlap_len);
        self.seed_from_last();
    }

    fn emit(&mut self, text: String, overlap_len: usize) {
        let size = self.measure.measure(&text);
        self.chunks.push(Chunk {
            chunk_index: self.next_index,
            text,
            size,
            overlap_len,
        });
        self.next_index += 1;
    }

    fn seed_from_last(&mut self) {
        if self.overlap == 0 {
            return;
        }
        let Some(last) = self.chunks.last() else {
            return;
        };

        let seed = self.measure.tail(&last.text, self.overlap);
        let seed = seed.trim_start();
        if !seed.trim().is_empty() {
            self.seed_len = seed.len() + UNIT_SEPARATOR.len();
            self.parts.push(seed.to_string());
        }
    }

    fn only_seed(&self) -> bool {
        self.seed_len > 0 && self.parts.len() == 1
    }

    fn joined_with(&self, unit: &str) -> String {
        let mut text = self.parts.join(UNIT_SEPARATOR);
        text.push_str(UNIT_SEPARATOR);
        text.push_str(unit);
        text
    }
}
