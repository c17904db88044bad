//! Generic relation rule evaluation
//!
//! A `Rule` pairs a relation label with optional source/target label
//! filters and an ordered trigger list. With triggers the rule fires on
//! entity pairs straddling a trigger occurrence in the direction its
//! `active` flag dictates; without triggers it falls back to the
//! nearest-preceding-entity heuristic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use relex_core::{EntityMention, Relation, RelexError, Result, TriggerSpec};

use crate::associate::SentenceEntities;
use crate::segment::SentenceMap;

/// Immutable configuration for one relation rule.
///
/// Absent label filters mean any mention in the sentence may act as
/// source/target; an empty trigger list selects positional mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub label: String,
    pub source_labels: Option<Vec<String>>,
    pub target_labels: Option<Vec<String>>,
    pub triggers: Vec<TriggerSpec>,
}

impl Rule {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source_labels: None,
            target_labels: None,
            triggers: Vec::new(),
        }
    }

    /// Restrict source candidates to the given entity labels
    pub fn with_sources(mut self, labels: &[&str]) -> Self {
        self.source_labels = Some(labels.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Restrict target candidates to the given entity labels
    pub fn with_targets(mut self, labels: &[&str]) -> Self {
        self.target_labels = Some(labels.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Append a trigger phrase
    pub fn with_trigger(mut self, text: &str, active: bool) -> Self {
        self.triggers.push(TriggerSpec::new(text, active));
        self
    }
}

/// True when another trigger phrase is a strictly longer prefix-extension
/// of `candidate` and occurs in the sentence at the same starting offset
/// as `candidate`'s first occurrence.
///
/// Prefers "defined" over "define" when both are candidate triggers: the
/// shorter candidate is suppressed, not the occurrence itself.
pub fn more_specific_occurrence_exists(
    candidate: &str,
    triggers: &[TriggerSpec],
    sentence: &str,
) -> bool {
    let Some(candidate_pos) = sentence.find(candidate) else {
        return false;
    };

    triggers.iter().any(|trigger| {
        trigger.text.len() > candidate.len()
            && trigger.text.starts_with(candidate)
            && sentence.find(&trigger.text) == Some(candidate_pos)
    })
}

/// Evaluate a rule over the sentence map and its entity association.
///
/// Returns the derived relations, deduplicated by `(source, target)`,
/// in sentence order. Never mutates its inputs.
pub fn extract_relation(
    rule: &Rule,
    sentences: &SentenceMap,
    association: &SentenceEntities,
) -> Result<Vec<Relation>> {
    if rule.label.is_empty() {
        return Err(RelexError::InvalidRule("empty relation label".into()));
    }
    if rule.triggers.iter().any(|trigger| trigger.text.is_empty()) {
        // An empty phrase matches at offset 0 of every sentence
        return Err(RelexError::InvalidRule(format!(
            "rule {:?} has an empty trigger phrase",
            rule.label
        )));
    }
    for start in association.keys() {
        if !sentences.contains_key(start) {
            return Err(RelexError::InvalidRule(format!(
                "association references unknown sentence offset {start}"
            )));
        }
    }

    let mut relations = Vec::new();

    for (sentence_start, mentions) in association {
        let sentence = &sentences[sentence_start];
        let sources = candidates(mentions, rule.source_labels.as_deref());
        let targets = candidates(mentions, rule.target_labels.as_deref());

        if rule.triggers.is_empty() {
            extract_positional(rule, &sources, &targets, &mut relations);
        } else {
            extract_triggered(
                rule,
                sentence,
                *sentence_start,
                &sources,
                &targets,
                &mut relations,
            );
        }
    }

    Ok(relations)
}

/// Trigger mode: emit pairs straddling each surviving trigger occurrence
fn extract_triggered(
    rule: &Rule,
    sentence: &str,
    sentence_start: usize,
    sources: &[&EntityMention],
    targets: &[&EntityMention],
    relations: &mut Vec<Relation>,
) {
    for trigger in &rule.triggers {
        let Some(relative) = sentence.find(&trigger.text) else {
            continue;
        };
        if more_specific_occurrence_exists(&trigger.text, &rule.triggers, sentence) {
            continue;
        }

        let trigger_offset = sentence_start + relative;
        debug!(
            label = %rule.label,
            trigger = %trigger.text,
            offset = trigger_offset,
            "trigger phrase matched"
        );

        for source in sources {
            for target in targets {
                if same_argument_text(source, target) {
                    continue;
                }
                let straddles = if trigger.active {
                    source.start_char < trigger_offset && target.start_char > trigger_offset
                } else {
                    target.start_char < trigger_offset && source.start_char > trigger_offset
                };
                if straddles {
                    push_unique(
                        relations,
                        Relation::new(&rule.label, &source.text, &target.text),
                    );
                }
            }
        }
    }
}

/// Positional mode: each target pairs with its nearest preceding source
fn extract_positional(
    rule: &Rule,
    sources: &[&EntityMention],
    targets: &[&EntityMention],
    relations: &mut Vec<Relation>,
) {
    for target in targets {
        let preceding = sources
            .iter()
            .filter(|source| source.start_char < target.start_char)
            .max_by_key(|source| source.start_char);

        if let Some(source) = preceding {
            if same_argument_text(source, target) {
                continue;
            }
            push_unique(
                relations,
                Relation::new(&rule.label, &source.text, &target.text),
            );
        }
    }
}

/// True when both mentions carry the same argument text once lowercased.
/// Must match the lowercasing `Relation::new` applies, or a pair of
/// case variants would slip through and emit a self-relation.
fn same_argument_text(source: &EntityMention, target: &EntityMention) -> bool {
    source.text.to_lowercase() == target.text.to_lowercase()
}

/// Mentions whose label passes the filter; no filter admits every mention
fn candidates<'a>(
    mentions: &'a [EntityMention],
    filter: Option<&[String]>,
) -> Vec<&'a EntityMention> {
    mentions
        .iter()
        .filter(|mention| match filter {
            Some(labels) => labels.iter().any(|label| *label == mention.label),
            None => true,
        })
        .collect()
}

fn push_unique(relations: &mut Vec<Relation>, relation: Relation) {
    if !relations.contains(&relation) {
        relations.push(relation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::associate::associate;
    use crate::segment::segment;

    const TWO_SENTENCES: &str =
        "The supplier provides the ECU. Under supplier request, the Purchaser \
         will provide documents identified in this section except the external \
         standards available on the market";

    fn two_sentence_mentions() -> Vec<EntityMention> {
        vec![
            EntityMention::new("supplier", 4, 12, "ROLE"),
            EntityMention::new("ECU", 26, 29, "COMPONENT"),
            EntityMention::new("supplier", 37, 45, "ROLE"),
            EntityMention::new("Purchaser", 59, 68, "ROLE"),
            EntityMention::new("documents", 82, 91, "DOCUMENT"),
            EntityMention::new("external standards", 130, 148, "STANDARD"),
        ]
    }

    fn run(rule: &Rule, text: &str, mentions: &[EntityMention]) -> Vec<Relation> {
        let sentences = segment(text);
        let association = associate(mentions, text).unwrap();
        extract_relation(rule, &sentences, &association).unwrap()
    }

    #[test]
    fn test_collaboration_positional() {
        let rule = Rule::new("COLLABORATION")
            .with_sources(&["ROLE"])
            .with_targets(&["ROLE"]);
        let relations = run(&rule, TWO_SENTENCES, &two_sentence_mentions());
        assert_eq!(
            relations,
            vec![Relation::new("COLLABORATION", "supplier", "purchaser")]
        );
    }

    #[test]
    fn test_responsibilities_positional() {
        let rule = Rule::new("RESPONSIBLE")
            .with_sources(&["ROLE"])
            .with_targets(&["COMPONENT", "SYSTEM", "HARDWARE", "DOCUMENT"]);
        let relations = run(&rule, TWO_SENTENCES, &two_sentence_mentions());
        assert_eq!(
            relations,
            vec![
                Relation::new("RESPONSIBLE", "supplier", "ecu"),
                Relation::new("RESPONSIBLE", "purchaser", "documents"),
            ]
        );
    }

    #[test]
    fn test_approval_trigger() {
        let text = "The supplier will validate documents provided by the purchaser \
                    in accordance to appropriate criteria";
        let mentions = vec![
            EntityMention::new("supplier", 4, 12, "ROLE"),
            EntityMention::new("documents", 27, 36, "DOCUMENT"),
            EntityMention::new("purchaser", 53, 62, "ROLE"),
        ];
        let rule = Rule::new("APPROVAL")
            .with_sources(&["ROLE"])
            .with_targets(&[
                "COMPONENT", "SYSTEM", "HARDWARE", "DOCUMENT", "STANDARD", "CRITERIA",
                "PROCESS", "UNIT", "PHASE",
            ])
            .with_trigger("approve", true)
            .with_trigger("validate", true);

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![Relation::new("APPROVAL", "supplier", "documents")]
        );
    }

    #[test]
    fn test_rejection_trigger() {
        let text = "The supplier will reject documents provided by the purchaser if \
                    they do not fulfill all requirements defined in the chapter";
        let mentions = vec![
            EntityMention::new("supplier", 4, 12, "ROLE"),
            EntityMention::new("documents", 25, 34, "DOCUMENT"),
            EntityMention::new("purchaser", 51, 60, "ROLE"),
            EntityMention::new("requirements", 88, 100, "STANDARD"),
        ];
        let rule = Rule::new("REJECTION")
            .with_sources(&["ROLE"])
            .with_targets(&[
                "COMPONENT", "SYSTEM", "HARDWARE", "DOCUMENT", "STANDARD", "CRITERIA",
                "PROCESS", "UNIT", "PHASE",
            ])
            .with_trigger("reject", true)
            .with_trigger("invalidate", true);

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![
                Relation::new("REJECTION", "supplier", "documents"),
                Relation::new("REJECTION", "supplier", "requirements"),
            ]
        );
    }

    #[test]
    fn test_definition_prefers_longer_trigger() {
        let text = "The requirements are defined in the document.";
        let mentions = vec![
            EntityMention::new("requirements", 4, 16, "STANDARD"),
            EntityMention::new("document", 36, 44, "DOCUMENT"),
        ];
        // "define" alone would point the wrong way; "defined" wins at the
        // same offset with the opposite polarity
        let rule = Rule::new("DEFINED_BY")
            .with_sources(&["STANDARD", "PROCESS"])
            .with_targets(&["DOCUMENT"])
            .with_trigger("define", false)
            .with_trigger("defined", true);

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![Relation::new("DEFINED_BY", "requirements", "document")]
        );
    }

    #[test]
    fn test_compliance_trigger() {
        let text = "The Supplier will comply with the requirements defined in the document.";
        let mentions = vec![
            EntityMention::new("Supplier", 4, 12, "ROLE"),
            EntityMention::new("requirements", 34, 46, "STANDARD"),
            EntityMention::new("document", 62, 70, "DOCUMENT"),
        ];
        let rule = Rule::new("COMPLY_WITH")
            .with_sources(&["DOCUMENT", "ROLE", "ORG"])
            .with_targets(&["STANDARD", "CRITERIA"])
            .with_trigger("comply", true)
            .with_trigger("complies", true);

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![Relation::new("COMPLY_WITH", "supplier", "requirements")]
        );
    }

    #[test]
    fn test_composition_active_direction() {
        let text = "The A380 is composed by a left wing, a right wing and different systems.";
        let mentions = vec![
            EntityMention::new("A380", 4, 8, "SYSTEM"),
            EntityMention::new("left wing", 26, 35, "COMPONENT"),
            EntityMention::new("right wing", 39, 49, "COMPONENT"),
            EntityMention::new("different systems", 54, 71, "SYSTEM"),
        ];
        let rule = composition_rule();

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![
                Relation::new("COMPOSED_BY", "a380", "left wing"),
                Relation::new("COMPOSED_BY", "a380", "right wing"),
                Relation::new("COMPOSED_BY", "a380", "different systems"),
            ]
        );
    }

    #[test]
    fn test_composition_passive_direction() {
        let text = "The left wing composes the A380.";
        let mentions = vec![
            EntityMention::new("left wing", 4, 13, "COMPONENT"),
            EntityMention::new("A380", 27, 31, "SYSTEM"),
        ];
        let rule = composition_rule();

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![Relation::new("COMPOSED_BY", "a380", "left wing")]
        );
    }

    fn composition_rule() -> Rule {
        Rule::new("COMPOSED_BY")
            .with_sources(&["COMPONENT", "SYSTEM", "HARDWARE"])
            .with_targets(&["COMPONENT", "SYSTEM", "HARDWARE"])
            .with_trigger("compose", false)
            .with_trigger("composed", true)
    }

    #[test]
    fn test_communication_multi_word_trigger() {
        let text = "The ECU send messages to the A380 and the LRI";
        let mentions = vec![
            EntityMention::new("ECU", 4, 7, "COMPONENT"),
            EntityMention::new("A380", 29, 33, "SYSTEM"),
            EntityMention::new("LRI", 42, 45, "COMPONENT"),
        ];
        let rule = Rule::new("COMMUNICATE_WITH")
            .with_sources(&["COMPONENT", "SYSTEM", "HARDWARE"])
            .with_targets(&["COMPONENT", "SYSTEM", "HARDWARE"])
            .with_trigger("communicate", true)
            .with_trigger("sends message", true)
            .with_trigger("send message", true)
            .with_trigger("send messages", true);

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![
                Relation::new("COMMUNICATE_WITH", "ecu", "a380"),
                Relation::new("COMMUNICATE_WITH", "ecu", "lri"),
            ]
        );
    }

    #[test]
    fn test_duplicate_pair_emitted_once() {
        // Both triggers fire on the same pair; the set keeps one instance
        let text = "The supplier will approve and validate documents.";
        let mentions = vec![
            EntityMention::new("supplier", 4, 12, "ROLE"),
            EntityMention::new("documents", 39, 48, "DOCUMENT"),
        ];
        let rule = Rule::new("APPROVAL")
            .with_sources(&["ROLE"])
            .with_targets(&["DOCUMENT"])
            .with_trigger("approve", true)
            .with_trigger("validate", true);

        let relations = run(&rule, text, &mentions);
        assert_eq!(
            relations,
            vec![Relation::new("APPROVAL", "supplier", "documents")]
        );
    }

    #[test]
    fn test_positional_skips_identical_texts() {
        let text = "The supplier informs the supplier chain";
        let mentions = vec![
            EntityMention::new("supplier", 4, 12, "ROLE"),
            EntityMention::new("supplier", 25, 33, "ROLE"),
        ];
        let rule = Rule::new("COLLABORATION")
            .with_sources(&["ROLE"])
            .with_targets(&["ROLE"]);
        assert!(run(&rule, text, &mentions).is_empty());
    }

    #[test]
    fn test_trigger_skips_unicode_case_variants() {
        // "Écu" and "écu" lowercase to the same argument text; the pair
        // must be rejected the same way an ASCII case variant would be
        let text = "The Écu talks to the écu now";
        let mentions = vec![
            EntityMention::new("Écu", 4, 8, "COMPONENT"),
            EntityMention::new("écu", 22, 26, "COMPONENT"),
        ];
        let rule = Rule::new("COMMUNICATE_WITH")
            .with_sources(&["COMPONENT"])
            .with_targets(&["COMPONENT"])
            .with_trigger("talks", true);

        assert!(run(&rule, text, &mentions).is_empty());
    }

    #[test]
    fn test_positional_skips_unicode_case_variants() {
        let text = "The Écu and the écu";
        let mentions = vec![
            EntityMention::new("Écu", 4, 8, "COMPONENT"),
            EntityMention::new("écu", 17, 21, "COMPONENT"),
        ];
        let rule = Rule::new("CONNECTED_TO")
            .with_sources(&["COMPONENT"])
            .with_targets(&["COMPONENT"]);

        assert!(run(&rule, text, &mentions).is_empty());
    }

    #[test]
    fn test_empty_trigger_phrase_is_invalid() {
        let rule = Rule::new("APPROVAL").with_trigger("", true);
        let sentences = segment("Some text.");
        let association = associate(&[], "Some text.").unwrap();
        let err = extract_relation(&rule, &sentences, &association).unwrap_err();
        assert!(matches!(err, RelexError::InvalidRule(_)));
    }

    #[test]
    fn test_more_specific_occurrence() {
        let sentence = "The Purchaser has defined requirements in the document.";
        let triggers = vec![
            TriggerSpec::new("define", true),
            TriggerSpec::new("defined", false),
        ];
        assert!(more_specific_occurrence_exists("define", &triggers, sentence));
        assert!(!more_specific_occurrence_exists("defined", &triggers, sentence));
        assert!(!more_specific_occurrence_exists("approve", &triggers, sentence));
    }

    #[test]
    fn test_empty_label_is_invalid() {
        let rule = Rule::new("");
        let sentences = segment("Some text.");
        let association = associate(&[], "Some text.").unwrap();
        let err = extract_relation(&rule, &sentences, &association).unwrap_err();
        assert!(matches!(err, RelexError::InvalidRule(_)));
    }

    #[test]
    fn test_mismatched_association_is_invalid() {
        let rule = Rule::new("COLLABORATION");
        let sentences = segment("Some text.");
        let mut association = SentenceEntities::new();
        association.insert(99, Vec::new());
        let err = extract_relation(&rule, &sentences, &association).unwrap_err();
        assert!(matches!(err, RelexError::InvalidRule(_)));
    }

    #[test]
    fn test_no_match_returns_empty_set() {
        let rule = Rule::new("COMPLY_WITH")
            .with_sources(&["ROLE"])
            .with_targets(&["STANDARD"])
            .with_trigger("comply", true);
        let relations = run(&rule, "Nothing relevant here.", &[]);
        assert!(relations.is_empty());
    }
}
