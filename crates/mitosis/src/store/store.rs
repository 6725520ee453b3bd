//! In-memory transactional store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use super::object::{Link, Object, ObjectId};
use crate::catalog::{Cardinality, Schema};
use crate::error::Error;
use crate::value::Value;

/// An arena of schema-described objects with a pending scope layered on top.
///
/// Objects created or modified since the last commit live in the pending
/// overlay. Reads see the overlay first, so objects built earlier in a walk
/// are visible to later steps of the same walk, but nothing reaches the
/// committed map until [`Store::commit`]. Dropping the overlay with
/// [`Store::discard_pending`] leaves the committed state untouched.
pub struct Store {
    schema: Arc<Schema>,
    committed: HashMap<ObjectId, Object>,
    pending: HashMap<ObjectId, Object>,
    next_id: u64,
}

impl Store {
    /// Create an empty store over a schema.
    pub fn new(schema: Schema) -> Self {
        Self::with_schema(Arc::new(schema))
    }

    /// Create an empty store over a shared schema.
    pub fn with_schema(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            committed: HashMap::new(),
            pending: HashMap::new(),
            next_id: 1,
        }
    }

    /// The schema this store is described by.
    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Create a new blank object of the given entity inside the pending scope.
    ///
    /// Attributes start at their declared default, or null when no default is
    /// declared. No links are set.
    pub fn create_object(&mut self, entity: &str) -> Result<ObjectId, Error> {
        let def = self
            .schema
            .entity(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))?;

        let values = def
            .attributes
            .iter()
            .map(|a| (a.name.clone(), a.default.clone().unwrap_or(Value::Null)))
            .collect();

        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.pending.insert(
            id,
            Object {
                entity: entity.to_string(),
                values,
                links: HashMap::new(),
            },
        );
        trace!(id = %id, entity, "created object");
        Ok(id)
    }

    /// Look up an object, pending scope first.
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.pending.get(&id).or_else(|| self.committed.get(&id))
    }

    /// The stored value of one attribute.
    pub fn attribute(&self, id: ObjectId, attribute: &str) -> Option<&Value> {
        self.object(id).and_then(|o| o.value(attribute))
    }

    /// The stored link of one relation.
    pub fn link(&self, id: ObjectId, relation: &str) -> Option<&Link> {
        self.object(id).and_then(|o| o.link(relation))
    }

    /// Write an attribute value, copying a committed object into the pending
    /// scope on first touch.
    pub fn set_attribute(
        &mut self,
        id: ObjectId,
        attribute: &str,
        value: Value,
    ) -> Result<(), Error> {
        let entity_name = self
            .object(id)
            .ok_or(Error::DetachedObject(id))?
            .entity
            .clone();
        {
            let def = self
                .schema
                .entity(&entity_name)
                .ok_or_else(|| Error::UnknownEntity(entity_name.clone()))?;
            if def.attribute(attribute).is_none() {
                return Err(Error::UnknownAttribute {
                    entity: entity_name,
                    attribute: attribute.to_string(),
                });
            }
        }
        self.object_mut(id)?
            .values
            .insert(attribute.to_string(), value);
        Ok(())
    }

    /// Set a relation's link and keep the reciprocal inverse consistent.
    ///
    /// Targets no longer referenced lose this object from their inverse;
    /// newly referenced targets gain it (a to-one inverse is overwritten, a
    /// to-many inverse collection grows). Maintenance is single-step: it does
    /// not chase the former partner of an overwritten to-one inverse.
    pub fn set_link(&mut self, id: ObjectId, relation: &str, link: Link) -> Result<(), Error> {
        let schema = Arc::clone(&self.schema);
        let entity_name = self
            .object(id)
            .ok_or(Error::DetachedObject(id))?
            .entity
            .clone();
        let entity = schema
            .entity(&entity_name)
            .ok_or_else(|| Error::UnknownEntity(entity_name.clone()))?;
        let rel = entity
            .relation(relation)
            .ok_or_else(|| Error::UnknownRelation {
                entity: entity_name.clone(),
                relation: relation.to_string(),
            })?;

        let arity_ok = matches!(
            (&link, rel.cardinality),
            (Link::One(_), Cardinality::ToOne)
                | (Link::OrderedMany(_), Cardinality::ToMany)
                | (Link::UnorderedMany(_), Cardinality::ToMany)
        );
        if !arity_ok {
            return Err(Error::LinkCardinality {
                entity: entity_name,
                relation: relation.to_string(),
            });
        }

        let inverse = schema.inverse_of(&entity_name, rel)?;

        let old_ids = self
            .object(id)
            .and_then(|o| o.link(relation))
            .map(Link::ids)
            .unwrap_or_default();
        let new_ids = link.ids();

        // all targets must be attached before any reciprocal edit happens
        for target in &new_ids {
            if self.object(*target).is_none() {
                return Err(Error::DetachedObject(*target));
            }
        }

        self.object_mut(id)?.links.insert(relation.to_string(), link);

        for target in &old_ids {
            if new_ids.contains(target) {
                continue;
            }
            let obj = self.object_mut(*target)?;
            let unset_to_one = match obj.links.get_mut(&inverse.name) {
                Some(Link::One(_)) => true,
                Some(many) => {
                    many.remove(id);
                    false
                }
                None => false,
            };
            if unset_to_one {
                obj.links.remove(&inverse.name);
            }
        }

        for target in &new_ids {
            if old_ids.contains(target) {
                continue;
            }
            let obj = self.object_mut(*target)?;
            match inverse.cardinality {
                Cardinality::ToOne => {
                    obj.links.insert(inverse.name.clone(), Link::One(id));
                }
                Cardinality::ToMany => {
                    obj.links
                        .entry(inverse.name.clone())
                        .or_insert_with(|| Link::empty_many(inverse.ordered))
                        .add(id);
                }
            }
        }

        trace!(id = %id, relation, targets = new_ids.len(), "set link");
        Ok(())
    }

    /// Whether the pending scope holds uncommitted objects or modifications.
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Merge the pending scope into the committed state.
    pub fn commit(&mut self) -> Result<(), Error> {
        debug!(objects = self.pending.len(), "committing pending scope");
        for (id, obj) in self.pending.drain() {
            self.committed.insert(id, obj);
        }
        Ok(())
    }

    /// Drop the pending scope, keeping the committed state untouched.
    pub fn discard_pending(&mut self) {
        debug!(objects = self.pending.len(), "discarding pending scope");
        self.pending.clear();
    }

    /// All visible ids of one entity, in ascending id order.
    pub fn ids_of_entity(&self, entity: &str) -> Vec<ObjectId> {
        let committed = self
            .committed
            .iter()
            .filter(|(id, _)| !self.pending.contains_key(id));
        let mut ids: Vec<ObjectId> = self
            .pending
            .iter()
            .chain(committed)
            .filter(|(_, o)| o.entity == entity)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of visible objects of one entity.
    pub fn count(&self, entity: &str) -> usize {
        self.ids_of_entity(entity).len()
    }

    /// Mutable access, copying a committed object into the pending scope on
    /// first touch.
    fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object, Error> {
        match self.pending.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let committed = self
                    .committed
                    .get(&id)
                    .cloned()
                    .ok_or(Error::DetachedObject(id))?;
                Ok(slot.insert(committed))
            }
        }
    }
}
