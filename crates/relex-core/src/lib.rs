//! Relex Core - Domain models and shared types
//!
//! This crate defines the abstractions shared across the relex system:
//! - Entity mentions produced by an upstream recognizer
//! - Relation records (label, source, target)
//! - The relation-label vocabulary
//! - Common error types
//! - The extraction report returned at the export boundary

pub mod vocab;

pub use vocab::LabelVocabulary;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for relex operations
#[derive(Error, Debug)]
pub enum RelexError {
    /// A mention supplied by the upstream recognizer violates its contract.
    /// Fails immediately rather than silently skipping the mention.
    #[error("invalid entity mention: {0}")]
    InvalidEntity(String),

    /// A rule was invoked with malformed parameters. A programming error
    /// in the catalog, not a runtime condition to retry.
    #[error("invalid rule configuration: {0}")]
    InvalidRule(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RelexError>;

// ============================================================================
// Entity Mentions
// ============================================================================

/// A labeled span of text identified by the upstream entity recognizer.
///
/// Offsets are byte offsets into the document text the mention was
/// recognized in. Invariant: `start_char < end_char`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Surface text of the mention
    pub text: String,
    /// Offset of the first byte of the mention
    pub start_char: usize,
    /// Offset one past the last byte of the mention
    pub end_char: usize,
    /// Entity label (e.g. "ROLE", "DOCUMENT", "COMPONENT")
    pub label: String,
}

impl EntityMention {
    /// Create a new mention
    pub fn new(
        text: impl Into<String>,
        start_char: usize,
        end_char: usize,
        label: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            start_char,
            end_char,
            label: label.into(),
        }
    }

    /// Check the upstream contract: non-empty text and label, valid span
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(RelexError::InvalidEntity("empty mention text".into()));
        }
        if self.label.is_empty() {
            return Err(RelexError::InvalidEntity(format!(
                "mention {:?} has an empty label",
                self.text
            )));
        }
        if self.start_char >= self.end_char {
            return Err(RelexError::InvalidEntity(format!(
                "mention {:?} has an invalid span {}..{}",
                self.text, self.start_char, self.end_char
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Relations
// ============================================================================

/// A typed relation between two entity mentions.
///
/// Source and target hold the lower-cased mention texts. Formatting to the
/// legacy `LABEL(source,target)` string happens only through `Display`,
/// at the export boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub label: String,
    pub source: String,
    pub target: String,
}

impl Relation {
    /// Create a relation, lower-casing both argument texts
    pub fn new(
        label: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            source: source.into().to_lowercase(),
            target: target.into().to_lowercase(),
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({},{})", self.label, self.source, self.target)
    }
}

/// A trigger phrase with its direction flag.
///
/// `active = true`: the relation points from the entity appearing before
/// the trigger to the entity appearing after it. `active = false` reverses
/// the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub text: String,
    pub active: bool,
}

impl TriggerSpec {
    pub fn new(text: impl Into<String>, active: bool) -> Self {
        Self {
            text: text.into(),
            active,
        }
    }
}

// ============================================================================
// Extraction Report
// ============================================================================

/// Result of one extraction pass over a document, ready for export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Unique identifier for this extraction run
    pub id: Uuid,
    /// Extracted relations, in catalog order
    pub relations: Vec<Relation>,
    /// Number of relations per label, in label order
    pub counts_by_label: BTreeMap<String, usize>,
    /// Extraction timestamp
    pub created_at: DateTime<Utc>,
}

impl ExtractionReport {
    /// Wrap a relation set in a fresh report
    pub fn new(relations: Vec<Relation>) -> Self {
        let mut counts_by_label = BTreeMap::new();
        for relation in &relations {
            *counts_by_label.entry(relation.label.clone()).or_insert(0) += 1;
        }
        Self {
            id: Uuid::new_v4(),
            relations,
            counts_by_label,
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Upstream collaborator seam: produces entity mentions for a document.
///
/// The extraction engine only ever consumes the mentions this trait
/// yields; model handles and tokenizer internals stay behind it.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntityMention>>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_validate_ok() {
        let mention = EntityMention::new("supplier", 4, 12, "ROLE");
        assert!(mention.validate().is_ok());
    }

    #[test]
    fn test_mention_validate_rejects_bad_span() {
        let mention = EntityMention::new("supplier", 12, 12, "ROLE");
        let err = mention.validate().unwrap_err();
        assert!(matches!(err, RelexError::InvalidEntity(_)));
    }

    #[test]
    fn test_mention_validate_rejects_empty_text() {
        let mention = EntityMention::new("", 0, 4, "ROLE");
        assert!(mention.validate().is_err());
    }

    #[test]
    fn test_relation_lowercases_arguments() {
        let relation = Relation::new("COLLABORATION", "Supplier", "Purchaser");
        assert_eq!(relation.source, "supplier");
        assert_eq!(relation.target, "purchaser");
    }

    #[test]
    fn test_relation_display_format() {
        let relation = Relation::new("RESPONSIBLE", "supplier", "ECU");
        assert_eq!(relation.to_string(), "RESPONSIBLE(supplier,ecu)");
    }

    #[test]
    fn test_report_counts_by_label() {
        let report = ExtractionReport::new(vec![
            Relation::new("RESPONSIBLE", "supplier", "ecu"),
            Relation::new("RESPONSIBLE", "purchaser", "documents"),
            Relation::new("COLLABORATION", "supplier", "purchaser"),
        ]);

        assert_eq!(report.counts_by_label.get("RESPONSIBLE"), Some(&2));
        assert_eq!(report.counts_by_label.get("COLLABORATION"), Some(&1));
    }

    #[test]
    fn test_report_json_carries_counts() {
        let report = ExtractionReport::new(vec![
            Relation::new("RESPONSIBLE", "supplier", "ecu"),
            Relation::new("RESPONSIBLE", "purchaser", "documents"),
        ]);

        let json: serde_json::Value =
            serde_json::to_value(&report).unwrap();
        assert_eq!(json["counts_by_label"]["RESPONSIBLE"], 2);
    }

    #[test]
    fn test_mention_json_round_trip() {
        let json = r#"{"text":"ECU","start_char":26,"end_char":29,"label":"COMPONENT"}"#;
        let mention: EntityMention = serde_json::from_str(json).unwrap();
        assert_eq!(mention, EntityMention::new("ECU", 26, 29, "COMPONENT"));
    }

    #[test]
    fn test_mention_json_missing_field_fails() {
        // A recognizer payload without a label must not deserialize
        let json = r#"{"text":"ECU","start_char":26,"end_char":29}"#;
        assert!(serde_json::from_str::<EntityMention>(json).is_err());
    }
}
