//! Semantic catalog: entity, attribute, and relation descriptors.
//!
//! The catalog is the static schema the cloner reflects over. It is built once
//! at startup (in code or from JSON), validated, and never mutated afterwards.

mod attribute;
mod entity;
mod relation;
mod schema;
mod types;

pub use attribute::AttributeDef;
pub use entity::EntityDef;
pub use relation::{Cardinality, RelationDef};
pub use schema::Schema;
pub use types::AttributeType;
