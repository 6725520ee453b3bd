//! Schema - the full set of entity definitions, built once at startup.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::entity::EntityDef;
use super::relation::RelationDef;
use crate::error::Error;

/// The complete schema: entity definitions keyed by name.
///
/// The schema is assembled (or loaded from JSON) once at startup, validated,
/// and treated as read-only from then on. The cloner never mutates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Entity definitions keyed by name.
    pub entities: HashMap<String, EntityDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Get an entity by name.
    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// List all entity names.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve the reciprocal inverse of a relation.
    ///
    /// The inverse is the relation declared on the target entity whose name
    /// the given relation carries in its `inverse` field.
    pub fn inverse_of(&self, entity: &str, relation: &RelationDef) -> Result<&RelationDef, Error> {
        let target = self
            .entity(&relation.target)
            .ok_or_else(|| Error::UnknownRelationTarget {
                entity: entity.to_string(),
                relation: relation.name.clone(),
                target: relation.target.clone(),
            })?;
        target
            .relation(&relation.inverse)
            .ok_or_else(|| Error::MissingInverse {
                entity: entity.to_string(),
                relation: relation.name.clone(),
                target: relation.target.clone(),
                inverse: relation.inverse.clone(),
            })
    }

    /// Validate the schema.
    ///
    /// Checks that attribute and relation names are unique within each entity,
    /// that every relation targets a defined entity, and that every relation's
    /// declared inverse exists on the target and points back at it.
    pub fn validate(&self) -> Result<(), Error> {
        for entity in self.entities.values() {
            let mut seen = HashSet::new();
            for attr in &entity.attributes {
                if !seen.insert(attr.name.as_str()) {
                    return Err(Error::DuplicateName {
                        entity: entity.name.clone(),
                        name: attr.name.clone(),
                    });
                }
            }
            let mut seen = HashSet::new();
            for rel in &entity.relations {
                if !seen.insert(rel.name.as_str()) {
                    return Err(Error::DuplicateName {
                        entity: entity.name.clone(),
                        name: rel.name.clone(),
                    });
                }

                let inverse = self.inverse_of(&entity.name, rel)?;
                if inverse.target != entity.name || inverse.inverse != rel.name {
                    return Err(Error::MissingInverse {
                        entity: entity.name.clone(),
                        relation: rel.name.clone(),
                        target: rel.target.clone(),
                        inverse: rel.inverse.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether relation names are unique across the entire schema.
    ///
    /// This is the precondition for safely propagating a caller-supplied
    /// relation-exclusion set down the copy chain: a name excluded at the root
    /// suppresses identically-named relations at every depth. Callers enabling
    /// propagation should check this once at schema-load time.
    pub fn relation_names_globally_unique(&self) -> bool {
        let mut seen = HashSet::new();
        self.entities
            .values()
            .flat_map(|e| e.relations.iter())
            .all(|r| seen.insert(r.name.as_str()))
    }

    /// Load and validate a schema from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let schema: Schema =
            serde_json::from_str(json).map_err(|e| Error::SchemaFormat(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serialize the schema to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SchemaFormat(e.to_string()))
    }
}
