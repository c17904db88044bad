//! Transitive relation composition
//!
//! Derives new relations by joining two existing relations on a shared
//! argument. One hop only; no recursion. Each derived label is produced
//! by an explicit `CompositionRule` invocation.

use serde::{Deserialize, Serialize};

use relex_core::Relation;

/// Which argument of a relation a composition rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgPosition {
    Left,
    Right,
}

impl ArgPosition {
    fn pick<'a>(&self, relation: &'a Relation) -> &'a str {
        match self {
            Self::Left => &relation.source,
            Self::Right => &relation.target,
        }
    }

    fn opposite<'a>(&self, relation: &'a Relation) -> &'a str {
        match self {
            Self::Left => &relation.target,
            Self::Right => &relation.source,
        }
    }
}

/// One-hop derivation: the positions name the argument carried into the
/// output on each side; the opposite arguments must agree (the join key).
///
/// `RESPONSIBLE(a,b)` + `COLLABORATION(a,c)` at `Right`/`Right` under
/// `PROVIDED` yields `PROVIDED(b,c)`, joined on `a`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionRule {
    pub first_label: String,
    pub first_position: ArgPosition,
    pub second_label: String,
    pub second_position: ArgPosition,
    pub new_label: String,
}

impl CompositionRule {
    pub fn new(
        first_label: impl Into<String>,
        first_position: ArgPosition,
        second_label: impl Into<String>,
        second_position: ArgPosition,
        new_label: impl Into<String>,
    ) -> Self {
        Self {
            first_label: first_label.into(),
            first_position,
            second_label: second_label.into(),
            second_position,
            new_label: new_label.into(),
        }
    }
}

/// Derive new relations from the existing set, deduplicated.
///
/// Reads the input set only; running the same composition twice over the
/// same inputs yields the same output.
pub fn compose(relations: &[Relation], rule: &CompositionRule) -> Vec<Relation> {
    let mut derived: Vec<Relation> = Vec::new();

    for first in relations.iter().filter(|r| r.label == rule.first_label) {
        let new_source = rule.first_position.pick(first);
        let join_key = rule.first_position.opposite(first);

        for second in relations.iter().filter(|r| r.label == rule.second_label) {
            if rule.second_position.opposite(second) != join_key {
                continue;
            }
            let relation = Relation::new(
                &rule.new_label,
                new_source,
                rule.second_position.pick(second),
            );
            if !derived.contains(&relation) {
                derived.push(relation);
            }
        }
    }

    derived
}
