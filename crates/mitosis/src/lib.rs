//! Mitosis - policy-driven deep copy of schema-described object graphs.
//!
//! Given a root object in a [`Store`] and a [`Schema`] describing entities,
//! attributes, and relations (with cardinality and mandatory inverses), the
//! [`Cloner`] produces a structurally equivalent but distinct copy of the
//! reachable subgraph. Per-attribute annotations control whether a value is
//! excluded, regenerated, inherited from the parent in the copy chain, or
//! copied verbatim; each relation's inverse cardinality decides whether the
//! far side is deep-copied (owned) or referenced as-is (shared).

pub mod catalog;
pub mod clone;
pub mod error;
pub mod store;
pub mod value;

pub use catalog::{AttributeDef, AttributeType, Cardinality, EntityDef, RelationDef, Schema};
pub use clone::{CloneOptions, Cloner, KeyConfig};
pub use error::Error;
pub use store::{Link, Object, ObjectId, Store};
pub use value::Value;
