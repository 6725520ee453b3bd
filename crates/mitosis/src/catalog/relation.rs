//! Relation definitions between entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// The relation links to a single far object.
    ToOne,
    /// The relation links to a collection of far objects.
    ToMany,
}

/// A relation definition on an entity.
///
/// Every relation declares the name of its reciprocal inverse on the target
/// entity. The cloner relies on the inverse's cardinality to classify the far
/// side as owned (deep-copied) or shared (referenced), so a relation without a
/// semantically meaningful inverse must still declare one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name (unique within the entity).
    pub name: String,
    /// Target entity name.
    pub target: String,
    /// Relation cardinality.
    pub cardinality: Cardinality,
    /// Whether a to-many relation preserves insertion order.
    #[serde(default)]
    pub ordered: bool,
    /// Name of the reciprocal relation declared on the target entity.
    pub inverse: String,
    /// Annotation map (string key -> string value).
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl RelationDef {
    /// Create a to-one relation.
    pub fn to_one(
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::ToOne,
            ordered: false,
            inverse: inverse.into(),
            annotations: HashMap::new(),
        }
    }

    /// Create an unordered to-many relation.
    pub fn to_many(
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::ToMany,
            ordered: false,
            inverse: inverse.into(),
            annotations: HashMap::new(),
        }
    }

    /// Mark a to-many relation as an ordered sequence.
    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    /// Attach an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Check if this relation links to many far objects.
    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }

    /// Check whether an annotation key is present, regardless of its value.
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }
}
