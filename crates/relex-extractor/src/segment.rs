//! Sentence segmentation
//!
//! Splits raw text into an ordered map of sentences keyed by starting
//! byte offset. The boundary rule is deliberately abbreviation-naive:
//! a run of one or more `.` characters followed by a non-`.` character
//! starts a new sentence. Abbreviation handling (e.g. "e.g.") belongs to
//! the upstream text-cleaning collaborator.

use std::collections::BTreeMap;

/// Ordered mapping from sentence-start offset to the sentence substring,
/// leading whitespace included. Keys partition `[0, text.len())`.
pub type SentenceMap = BTreeMap<usize, String>;

/// Byte offsets at which a new sentence begins (excluding offset 0)
pub fn sentence_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut dot_seen = false;

    for (pos, ch) in text.char_indices() {
        if ch == '.' {
            dot_seen = true;
        } else if dot_seen {
            boundaries.push(pos);
            dot_seen = false;
        }
    }

    boundaries
}

/// Split text into sentences keyed by starting offset.
///
/// The trailing segment from the last boundary to the end of text is
/// always emitted, even when empty; text without a `.` yields exactly
/// one sentence spanning the whole input.
pub fn segment(text: &str) -> SentenceMap {
    let mut sentences = SentenceMap::new();
    let mut previous = 0;

    for boundary in sentence_boundaries(text) {
        sentences.insert(previous, text[previous..boundary].to_string());
        previous = boundary;
    }
    sentences.insert(previous, text[previous..].to_string());

    sentences
}

/// Offset one past the end of the sentence starting at `start`
pub fn sentence_end(sentence: &str, start: usize) -> usize {
    start + sentence.len()
}
