use serde::{Deserialize, Serialize};

/// Target length of a chunk, in characters.
pub const TARGET_CHUNK_CHARS: usize = 500;
/// Characters shared between consecutive chunks for context.
pub const CHUNK_OVERLAP_CHARS: usize = 50;

/// A contiguous passage of document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The actual text content of this chunk
    pub text: String,
    /// Character offset of this chunk in the extracted document text
    pub start_position: usize,
}

/// Split document text into overlapping chunks of at most
/// [`TARGET_CHUNK_CHARS`] characters.
///
/// Split points prefer natural boundaries inside the target window: a
/// paragraph break first, then a sentence end, then any whitespace, with a
/// hard character cut only when none of those fall past the overlap region.
/// The same input always produces the same chunk sequence, and every chunk's
/// text is exactly the source slice starting at its recorded offset.
pub fn split_into_chunks(text: &str) -> Vec<TextChunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    // Byte offset of every character, so slicing stays on char boundaries
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = chars.len();
    let byte_at = |pos: usize| {
        if pos == total {
            text.len()
        } else {
            offsets[pos]
        }
    };

    // A document that fits in one chunk is returned whole
    if total <= TARGET_CHUNK_CHARS {
        return vec![TextChunk {
            text: text.to_string(),
            start_position: 0,
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let remaining = total - start;
        if remaining <= TARGET_CHUNK_CHARS {
            chunks.push(TextChunk {
                text: text[byte_at(start)..].to_string(),
                start_position: start,
            });
            break;
        }

        let cut = find_cut(&chars, start, start + TARGET_CHUNK_CHARS);
        chunks.push(TextChunk {
            text: text[byte_at(start)..byte_at(cut)].to_string(),
            start_position: start,
        });

        // Next chunk re-covers the tail of this one
        start = cut - CHUNK_OVERLAP_CHARS;
    }

    chunks
}

/// Pick the cut position for a chunk starting at `start` whose window ends at
/// `window_end` (exclusive char position, strictly inside the text).
///
/// A cut must land past the overlap region so that every chunk is longer than
/// the overlap it shares with its successor.
fn find_cut(chars: &[char], start: usize, window_end: usize) -> usize {
    let floor = start + CHUNK_OVERLAP_CHARS + 1;

    // Prefer a paragraph break: cut just after a blank line
    for cut in (floor..=window_end).rev() {
        if cut >= 2 && chars[cut - 1] == '\n' && chars[cut - 2] == '\n' {
            return cut;
        }
    }

    // Then a sentence end followed by whitespace
    for cut in (floor..=window_end).rev() {
        if matches!(chars[cut - 1], '.' | '!' | '?') && chars[cut].is_whitespace() {
            return cut;
        }
    }

    // Then any word boundary
    for cut in (floor..=window_end).rev() {
        if chars[cut - 1].is_whitespace() {
            return cut;
        }
    }

    // No usable boundary in the window: hard cut
    window_end
}
