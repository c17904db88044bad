//! Relation-label vocabulary
//!
//! Immutable configuration mapping relation labels to human-readable
//! phrasings, plus the set of symmetric relations. Passed into the
//! catalog as a value rather than living in process-wide mutable state.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::Relation;

/// Vocabulary for the relation labels a catalog emits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelVocabulary {
    /// Human-readable phrase per label (e.g. "is responsible for")
    display_phrases: HashMap<String, String>,
    /// Labels whose relations hold in both directions
    symmetric: HashSet<String>,
}

impl LabelVocabulary {
    /// Empty vocabulary
    pub fn new() -> Self {
        Self {
            display_phrases: HashMap::new(),
            symmetric: HashSet::new(),
        }
    }

    /// Vocabulary for the requirements-document domain
    pub fn requirements_domain() -> Self {
        let mut vocab = Self::new();

        vocab.add_phrase("COLLABORATION", "collaborates with");
        vocab.add_phrase("RESPONSIBLE", "is responsible for");
        vocab.add_phrase("PROVIDED", "is provided to");
        vocab.add_phrase("APPROVAL", "approves");
        vocab.add_phrase("REJECTION", "rejects");
        vocab.add_phrase("DEFINED_BY", "is defined by");
        vocab.add_phrase("COMPLY_WITH", "complies with");
        vocab.add_phrase("COMPOSED_BY", "is composed of");
        vocab.add_phrase("COMMUNICATE_WITH", "communicates with");

        vocab.mark_symmetric("COLLABORATION");
        vocab.mark_symmetric("COMMUNICATE_WITH");

        vocab
    }

    /// Register a display phrase for a label
    pub fn add_phrase(&mut self, label: impl Into<String>, phrase: impl Into<String>) {
        self.display_phrases.insert(label.into(), phrase.into());
    }

    /// Mark a label as symmetric
    pub fn mark_symmetric(&mut self, label: impl Into<String>) {
        self.symmetric.insert(label.into());
    }

    /// Display phrase for a label, falling back to the label itself
    pub fn phrase<'a>(&'a self, label: &'a str) -> &'a str {
        self.display_phrases
            .get(label)
            .map(String::as_str)
            .unwrap_or(label)
    }

    pub fn is_symmetric(&self, label: &str) -> bool {
        self.symmetric.contains(label)
    }

    /// Human-readable rendering of a relation
    /// (e.g. "supplier is responsible for ecu")
    pub fn describe(&self, relation: &Relation) -> String {
        format!(
            "{} {} {}",
            relation.source,
            self.phrase(&relation.label),
            relation.target
        )
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::requirements_domain()
    }
}
