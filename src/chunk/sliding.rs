//! Sliding character window over concatenated text

use crate::chunk::{effective_overlap, Chunk};

const PARAGRAPH_BREAK: [char; 2] = ['\n', '\n'];

/// Splits `text` into fixed-size character windows
///
/// Each window covers `size` characters. If its right edge falls inside a
/// paragraph, the edge is pushed to just past the nearest `\n\n` found within
/// `lookahead` characters. An edge already sitting right after a `\n\n` is
/// left alone. The next window starts `overlap` characters
/// before the previous end, and always strictly after the previous start.
/// An `overlap` of `size` or more is reduced to `size / 4`.
///
/// Sizes are in characters; windows whose text trims to nothing are skipped
/// without consuming an index.
pub fn chunk_sliding(
    text: &str,
    size: usize,
    overlap: usize,
    lookahead: usize,
    first_index: usize,
) -> Vec<Chunk> {
    let size = size.max(1);
    let overlap = effective_overlap(size, overlap);
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut next_index = first_index;
    let mut start: usize = 0;
    let mut prev_end: usize = 0;

    while start < total {
        let mut end = (start + size).min(total);
        if end < total && !ends_at_break(&chars, start, end) {
            // A break straddling the edge starts one character back
            let from = (end - 1).max(start);
            if let Some(brk) = find_break(&chars, from, (end + lookahead).min(total)) {
                end = brk + PARAGRAPH_BREAK.len();
            }
        }

        let window: String = chars[start..end].iter().collect();
        let leading = window.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed = window.trim();

        if !trimmed.is_empty() {
            let overlap_chars = prev_end
                .saturating_sub(start)
                .saturating_sub(leading)
                .min(trimmed.chars().count());
            let overlap_len = trimmed
                .char_indices()
                .nth(overlap_chars)
                .map_or(trimmed.len(), |(offset, _)| offset);

            chunks.push(Chunk {
                chunk_index: next_index,
                text: trimmed.to_string(),
                size: trimmed.chars().count(),
                overlap_len,
            });
            next_index += 1;
        }

        if end >= total {
            break;
        }

        prev_end = end;
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

fn ends_at_break(chars: &[char], start: usize, end: usize) -> bool {
    end >= start + PARAGRAPH_BREAK.len()
        && chars[end - PARAGRAPH_BREAK.len()..end] == PARAGRAPH_BREAK
}

/// Position of the first `\n\n` lying entirely within `chars[from..to]`
fn find_break(chars: &[char], from: usize, to: usize) -> Option<usize> {
    if to < from + PARAGRAPH_BREAK.len() {
        return None;
    }
    chars[from..to]
        .windows(PARAGRAPH_BREAK.len())
        .position(|pair| pair == PARAGRAPH_BREAK)
        .map(|offset| from + offset)
}
