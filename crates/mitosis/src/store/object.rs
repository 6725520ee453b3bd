//! Objects and the links between them.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::value::Value;

/// Stable handle for an object inside a [`Store`](crate::store::Store).
///
/// Objects refer to each other through these handles rather than through
/// direct references, so cyclic relationship graphs are plain index
/// relationships with no ownership cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The value an object holds for one relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// A single far object.
    One(ObjectId),
    /// An ordered sequence of far objects.
    OrderedMany(Vec<ObjectId>),
    /// An unordered set of far objects.
    UnorderedMany(BTreeSet<ObjectId>),
}

impl Link {
    /// An empty to-many link of the given ordering kind.
    pub fn empty_many(ordered: bool) -> Link {
        if ordered {
            Link::OrderedMany(Vec::new())
        } else {
            Link::UnorderedMany(BTreeSet::new())
        }
    }

    /// The linked object ids, in sequence order for ordered links and in
    /// ascending id order for unordered ones.
    pub fn ids(&self) -> Vec<ObjectId> {
        match self {
            Link::One(id) => vec![*id],
            Link::OrderedMany(ids) => ids.clone(),
            Link::UnorderedMany(ids) => ids.iter().copied().collect(),
        }
    }

    /// Number of linked objects.
    pub fn len(&self) -> usize {
        match self {
            Link::One(_) => 1,
            Link::OrderedMany(ids) => ids.len(),
            Link::UnorderedMany(ids) => ids.len(),
        }
    }

    /// Check if no objects are linked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the link contains the given id.
    pub fn contains(&self, id: ObjectId) -> bool {
        match self {
            Link::One(other) => *other == id,
            Link::OrderedMany(ids) => ids.contains(&id),
            Link::UnorderedMany(ids) => ids.contains(&id),
        }
    }

    /// Add an id to a to-many link. No-op on duplicates and on to-one links.
    pub(crate) fn add(&mut self, id: ObjectId) {
        match self {
            Link::One(_) => {}
            Link::OrderedMany(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Link::UnorderedMany(ids) => {
                ids.insert(id);
            }
        }
    }

    /// Remove an id from a to-many link.
    pub(crate) fn remove(&mut self, id: ObjectId) {
        match self {
            Link::One(_) => {}
            Link::OrderedMany(ids) => ids.retain(|other| *other != id),
            Link::UnorderedMany(ids) => {
                ids.remove(&id);
            }
        }
    }
}

/// A live object: an instance of an entity inside a store.
///
/// Two objects of the same entity are distinct identities even when every
/// attribute value matches; identity is the [`ObjectId`], not the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub(crate) entity: String,
    pub(crate) values: HashMap<String, Value>,
    pub(crate) links: HashMap<String, Link>,
}

impl Object {
    /// The name of this object's entity.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The stored value for an attribute.
    pub fn value(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// The stored link for a relation, if any has been set.
    pub fn link(&self, relation: &str) -> Option<&Link> {
        self.links.get(relation)
    }
}
