//! Crate error types.

use thiserror::Error;

use crate::catalog::AttributeType;
use crate::store::ObjectId;

/// Errors raised while defining schemas, mutating the store, or cloning.
///
/// Every error is fatal to the clone call that raised it: errors bubble
/// through the recursive walk unchanged and nothing is committed.
#[derive(Debug, Error)]
pub enum Error {
    /// The object handle is not attached to the store's scope.
    #[error("object {0} is not attached to the store")]
    DetachedObject(ObjectId),

    /// An entity name could not be resolved against the schema.
    #[error("entity {0} is not defined in the schema")]
    UnknownEntity(String),

    /// An attribute name could not be resolved against its entity.
    #[error("entity {entity} has no attribute {attribute}")]
    UnknownAttribute {
        /// Entity name.
        entity: String,
        /// Attribute name.
        attribute: String,
    },

    /// A relation name could not be resolved against its entity.
    #[error("entity {entity} has no relation {relation}")]
    UnknownRelation {
        /// Entity name.
        entity: String,
        /// Relation name.
        relation: String,
    },

    /// A relation targets an entity that is not defined.
    #[error("relation {entity}.{relation} targets unknown entity {target}")]
    UnknownRelationTarget {
        /// Source entity name.
        entity: String,
        /// Relation name.
        relation: String,
        /// Missing target entity name.
        target: String,
    },

    /// A relation's declared inverse does not exist on the target entity, or
    /// does not point back at the relation.
    #[error("relation {entity}.{relation} has no reciprocal inverse {target}.{inverse}")]
    MissingInverse {
        /// Source entity name.
        entity: String,
        /// Relation name.
        relation: String,
        /// Target entity name.
        target: String,
        /// Declared inverse relation name.
        inverse: String,
    },

    /// A duplicate attribute or relation name within one entity.
    #[error("entity {entity} declares {name} more than once")]
    DuplicateName {
        /// Entity name.
        entity: String,
        /// Duplicated attribute or relation name.
        name: String,
    },

    /// A link value's arity does not match the relation's cardinality.
    #[error("link value does not match the cardinality of {entity}.{relation}")]
    LinkCardinality {
        /// Entity name.
        entity: String,
        /// Relation name.
        relation: String,
    },

    /// An excluded attribute is required and has no default to fall back on.
    #[error("attribute {entity}.{attribute} is excluded but required with no default")]
    ExcludedRequiredAttribute {
        /// Entity name.
        entity: String,
        /// Attribute name.
        attribute: String,
    },

    /// A `rebuild` annotation asks for a fresh UUID on a non-UUID attribute.
    #[error("rebuild \"uuid\" needs a uuid attribute, {entity}.{attribute} is {actual:?}")]
    RebuildUuidType {
        /// Entity name.
        entity: String,
        /// Attribute name.
        attribute: String,
        /// The attribute's actual type.
        actual: AttributeType,
    },

    /// A `rebuild` annotation asks for the current time on a non-timestamp
    /// attribute.
    #[error("rebuild \"now\" needs a timestamp attribute, {entity}.{attribute} is {actual:?}")]
    RebuildTimestampType {
        /// Entity name.
        entity: String,
        /// Attribute name.
        attribute: String,
        /// The attribute's actual type.
        actual: AttributeType,
    },

    /// A parent-following annotation could not be resolved and no fallback
    /// policy rescued it.
    #[error("cannot resolve parent value for {entity}.{attribute}")]
    FollowParent {
        /// Entity name.
        entity: String,
        /// Attribute name.
        attribute: String,
    },

    /// The schema's JSON representation could not be parsed.
    #[error("schema format error: {0}")]
    SchemaFormat(String),
}
