//! Relex Extractor - Heuristic relation extraction
//!
//! Implements the rule-based relation extraction pipeline:
//! sentence segmentation, entity/sentence association, a generic
//! trigger-based rule evaluator, and transitive relation composition,
//! driven by a fixed domain rule catalog.

use relex_core::{EntityMention, Relation, Result};

/// Trait for relation extractors over pre-recognized entity mentions
pub trait RelationExtractor: Send + Sync {
    fn extract(&self, text: &str, entities: &[EntityMention]) -> Result<Vec<Relation>>;
}

pub mod associate;
pub mod catalog;
pub mod compose;
pub mod rule;
pub mod segment;

pub use associate::{associate, is_in_sentence, sentence_for, sentence_start_for, SentenceEntities};
pub use catalog::HeuristicCatalog;
pub use compose::{compose, ArgPosition, CompositionRule};
pub use rule::{extract_relation, more_specific_occurrence_exists, Rule};
pub use segment::{segment, SentenceMap};
