//! Entity/sentence association
//!
//! Maps each entity mention to the sentence that contains it. The
//! association map uses a strict boundary-exclusive containment test:
//! a mention starting exactly at a sentence-start offset belongs to
//! neither neighboring sentence.

use std::collections::BTreeMap;

use relex_core::{EntityMention, Result};

use crate::segment::{segment, sentence_end, SentenceMap};

/// Ordered mapping from sentence-start offset to the mentions whose
/// start falls strictly inside that sentence's span. Every key of the
/// segmentation appears, mapped to an empty list when nothing matches.
pub type SentenceEntities = BTreeMap<usize, Vec<EntityMention>>;

/// Start offset of the sentence a mention was extracted from: the
/// greatest recorded sentence-start offset strictly less than the
/// mention's start, defaulting to the first sentence.
pub fn sentence_start_for(mention: &EntityMention, sentences: &SentenceMap) -> usize {
    sentences
        .range(..mention.start_char)
        .next_back()
        .map(|(start, _)| *start)
        .unwrap_or(0)
}

/// Sentence substring a mention was extracted from
pub fn sentence_for<'a>(
    mention: &EntityMention,
    sentences: &'a SentenceMap,
) -> Result<&'a str> {
    mention.validate()?;
    let start = sentence_start_for(mention, sentences);
    // The default key 0 always exists: segmentation emits at least one sentence
    Ok(sentences
        .get(&start)
        .map(String::as_str)
        .unwrap_or_default())
}

/// True when the mention starts strictly inside `[start, end)`,
/// exclusive at both ends
pub fn is_in_sentence(mention: &EntityMention, start: usize, end: usize) -> bool {
    mention.start_char > start && mention.start_char < end
}

/// Group mentions by containing sentence.
///
/// Fails with `InvalidEntity` on the first malformed mention instead of
/// silently skipping it.
pub fn associate(entities: &[EntityMention], text: &str) -> Result<SentenceEntities> {
    let sentences = segment(text);
    let mut association: SentenceEntities = sentences
        .keys()
        .map(|start| (*start, Vec::new()))
        .collect();

    for mention in entities {
        mention.validate()?;
        for (start, sentence) in &sentences {
            let end = sentence_end(sentence, *start);
            if is_in_sentence(mention, *start, end) {
                association.entry(*start).or_default().push(mention.clone());
                break;
            }
        }
    }

    Ok(association)
}
