//! Domain rule catalog
//!
//! The fixed table of relation rules for requirements documents, plus the
//! post-hoc composition rules. Labels whose heuristics are not authored
//! yet are carried as reserved entries that return an empty set.

use tracing::{debug, info};

use relex_core::{EntityMention, LabelVocabulary, Relation, Result};

use crate::associate::associate;
use crate::compose::{compose, ArgPosition, CompositionRule};
use crate::rule::{extract_relation, Rule};
use crate::segment::segment;
use crate::RelationExtractor;

/// One row of the catalog
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    /// A rule with authored heuristics
    Heuristic(Rule),
    /// Reserved for future rule authoring; yields nothing
    Reserved { label: String },
}

impl CatalogEntry {
    pub fn label(&self) -> &str {
        match self {
            Self::Heuristic(rule) => &rule.label,
            Self::Reserved { label } => label,
        }
    }
}

/// The heuristic extractor for the requirements-document domain
pub struct HeuristicCatalog {
    entries: Vec<CatalogEntry>,
    compositions: Vec<CompositionRule>,
    vocab: LabelVocabulary,
}

impl HeuristicCatalog {
    /// Catalog with the requirements-domain rules and vocabulary
    pub fn new() -> Self {
        Self::with_vocabulary(LabelVocabulary::requirements_domain())
    }

    /// Catalog with the requirements-domain rules and a caller-supplied
    /// label vocabulary
    pub fn with_vocabulary(vocab: LabelVocabulary) -> Self {
        let mut catalog = Self {
            entries: Vec::new(),
            compositions: Vec::new(),
            vocab,
        };
        catalog.init_rules();
        catalog.init_compositions();
        catalog.init_reserved();
        catalog
    }

    fn init_rules(&mut self) {
        const DELIVERABLES: &[&str] = &[
            "COMPONENT", "SYSTEM", "HARDWARE", "DOCUMENT", "STANDARD", "CRITERIA",
            "PROCESS", "UNIT", "PHASE",
        ];

        self.add_rule(
            Rule::new("COLLABORATION")
                .with_sources(&["ROLE"])
                .with_targets(&["ROLE"]),
        );
        self.add_rule(
            Rule::new("RESPONSIBLE")
                .with_sources(&["ROLE"])
                .with_targets(&["COMPONENT", "SYSTEM", "HARDWARE", "DOCUMENT"]),
        );
        self.add_rule(
            Rule::new("APPROVAL")
                .with_sources(&["ROLE"])
                .with_targets(DELIVERABLES)
                .with_trigger("approve", true)
                .with_trigger("validate", true),
        );
        self.add_rule(
            Rule::new("REJECTION")
                .with_sources(&["ROLE"])
                .with_targets(DELIVERABLES)
                .with_trigger("reject", true)
                .with_trigger("invalidate", true),
        );
        self.add_rule(
            Rule::new("DEFINED_BY")
                .with_sources(&["STANDARD", "PROCESS"])
                .with_targets(&["DOCUMENT"])
                .with_trigger("define", false)
                .with_trigger("defined", true),
        );
        self.add_rule(
            Rule::new("COMPLY_WITH")
                .with_sources(&["DOCUMENT", "ROLE", "ORG"])
                .with_targets(&["STANDARD", "CRITERIA"])
                .with_trigger("comply", true)
                .with_trigger("complies", true),
        );
        self.add_rule(
            Rule::new("COMPOSED_BY")
                .with_sources(&["COMPONENT", "SYSTEM", "HARDWARE"])
                .with_targets(&["COMPONENT", "SYSTEM", "HARDWARE"])
                .with_trigger("compose", false)
                .with_trigger("composed", true),
        );
        self.add_rule(
            Rule::new("COMMUNICATE_WITH")
                .with_sources(&["COMPONENT", "SYSTEM", "HARDWARE"])
                .with_targets(&["COMPONENT", "SYSTEM", "HARDWARE"])
                .with_trigger("communicate", true)
                .with_trigger("sends message", true)
                .with_trigger("send message", true)
                .with_trigger("send messages", true),
        );
    }

    fn init_compositions(&mut self) {
        // Whoever a role is responsible for producing gets provided to
        // that role's collaborators
        self.add_composition(CompositionRule::new(
            "RESPONSIBLE",
            ArgPosition::Right,
            "COLLABORATION",
            ArgPosition::Right,
            "PROVIDED",
        ));
    }

    fn init_reserved(&mut self) {
        for label in [
            "CONTROLS",
            "CONNECTED_TO",
            "ALTERNATIVE_LABEL",
            "HAS_FEATURE",
            "HAS_CONDITION",
            "HAS_VALUE",
            "HAS_UNIT",
            "PERFORMS",
            "OPERATES",
            "HAS_PHASE",
        ] {
            self.entries.push(CatalogEntry::Reserved {
                label: label.to_string(),
            });
        }
    }

    fn add_rule(&mut self, rule: Rule) {
        self.entries.push(CatalogEntry::Heuristic(rule));
    }

    fn add_composition(&mut self, rule: CompositionRule) {
        self.compositions.push(rule);
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Labels with authored heuristics, in catalog order
    pub fn authored_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| matches!(e, CatalogEntry::Heuristic(_)))
            .map(CatalogEntry::label)
            .collect()
    }

    /// Labels reserved for future rule authoring
    pub fn reserved_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| matches!(e, CatalogEntry::Reserved { .. }))
            .map(CatalogEntry::label)
            .collect()
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocab
    }
}

impl Default for HeuristicCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationExtractor for HeuristicCatalog {
    fn extract(&self, text: &str, entities: &[EntityMention]) -> Result<Vec<Relation>> {
        let sentences = segment(text);
        let association = associate(entities, text)?;
        debug!(
            sentences = sentences.len(),
            mentions = entities.len(),
            "running heuristic catalog"
        );

        let mut relations = Vec::new();
        for entry in &self.entries {
            match entry {
                CatalogEntry::Heuristic(rule) => {
                    let extracted = extract_relation(rule, &sentences, &association)?;
                    debug!(label = %rule.label, count = extracted.len(), "rule evaluated");
                    relations.extend(extracted);
                }
                CatalogEntry::Reserved { .. } => {}
            }
        }

        for composition in &self.compositions {
            let derived = compose(&relations, composition);
            debug!(
                label = %composition.new_label,
                count = derived.len(),
                "composition evaluated"
            );
            relations.extend(derived);
        }

        info!(relations = relations.len(), "extraction pass complete");
        Ok(relations)
    }
}
