//! Policy-driven deep copy of an object graph.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::config::{CloneOptions, KeyConfig};
use crate::catalog::{AttributeDef, AttributeType, Cardinality};
use crate::error::Error;
use crate::store::{Link, ObjectId, Store};
use crate::value::Value;

/// The object one level up the current copy chain.
///
/// Back-edge suppression keys off the original's entity; parent-following
/// attribute resolution reads values from the already-materialized replica,
/// so a regenerated parent value (a fresh id, say) is what children inherit.
#[derive(Debug, Clone, Copy)]
struct Ancestor {
    original: ObjectId,
    replica: ObjectId,
}

/// Deep-copies object subgraphs according to schema annotations.
///
/// For every relation the cloner decides, from the cardinality of the
/// relation's inverse, whether the far side is owned (inverse to-one: exactly
/// one referrer, deep-copied) or shared (inverse to-many: the copy references
/// the same far identity, never a duplicate). Attribute values are excluded,
/// regenerated, inherited from the parent copy, or carried over verbatim.
///
/// The walk is synchronous, depth-first, and fail-fast: the first error at
/// any depth aborts the whole operation and nothing is committed.
///
/// ```
/// use mitosis::{AttributeDef, AttributeType, Cloner, EntityDef, Schema, Store};
///
/// let schema = Schema::new().with_entity(
///     EntityDef::new("Note").with_attribute(AttributeDef::new("name", AttributeType::String)),
/// );
/// let mut store = Store::new(schema);
/// let note = store.create_object("Note").unwrap();
///
/// let copy = Cloner::new().clone_object(&mut store, note).unwrap();
/// assert_ne!(copy, note);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cloner {
    keys: KeyConfig,
}

impl Cloner {
    /// Create a cloner with the default annotation key names.
    pub fn new() -> Self {
        Self {
            keys: KeyConfig::default(),
        }
    }

    /// Create a cloner with remapped annotation key names.
    pub fn with_keys(keys: KeyConfig) -> Self {
        Self { keys }
    }

    /// Deep-copy the subgraph under `source` with default options.
    pub fn clone_object(&self, store: &mut Store, source: ObjectId) -> Result<ObjectId, Error> {
        self.clone_object_with(store, source, &CloneOptions::default())
    }

    /// Deep-copy the subgraph under `source`.
    ///
    /// After the whole subgraph has been materialized, commits the store's
    /// pending scope exactly once iff `commit_on_return` is set and the scope
    /// reports pending changes. On error nothing is committed; the caller may
    /// drop the partial copy with [`Store::discard_pending`].
    pub fn clone_object_with(
        &self,
        store: &mut Store,
        source: ObjectId,
        options: &CloneOptions,
    ) -> Result<ObjectId, Error> {
        debug!(source = %source, "cloning object graph");
        let replica = self.clone_recursive(
            store,
            source,
            None,
            &options.excluded_relations,
            options.propagate_exclusions,
        )?;
        if options.commit_on_return && store.has_pending_changes() {
            store.commit()?;
        }
        Ok(replica)
    }

    fn clone_recursive(
        &self,
        store: &mut Store,
        source: ObjectId,
        ancestor: Option<Ancestor>,
        excluded: &HashSet<String>,
        propagate: bool,
    ) -> Result<ObjectId, Error> {
        let entity_name = store
            .object(source)
            .ok_or(Error::DetachedObject(source))?
            .entity()
            .to_string();
        let schema = store.schema();
        let entity = schema
            .entity(&entity_name)
            .ok_or_else(|| Error::UnknownEntity(entity_name.clone()))?;

        let replica = store.create_object(&entity_name)?;

        for attr in &entity.attributes {
            self.resolve_attribute(store, source, replica, &entity_name, attr, ancestor)?;
        }

        let empty = HashSet::new();
        let child_excluded = if propagate { excluded } else { &empty };

        for rel in &entity.relations {
            if excluded.contains(&rel.name) || rel.has_annotation(&self.keys.exclude) {
                trace!(relation = %rel.name, "relation excluded");
                continue;
            }

            // skip the edge that produced this recursive call
            if let Some(anc) = ancestor {
                let ancestor_entity = store
                    .object(anc.original)
                    .ok_or(Error::DetachedObject(anc.original))?
                    .entity();
                if rel.target == ancestor_entity {
                    trace!(relation = %rel.name, "back-edge suppressed");
                    continue;
                }
            }

            let inverse = schema.inverse_of(&entity_name, rel)?;

            // inverse to-many: the far side is a shared resource. Reference
            // the same identities instead of duplicating them; the far side's
            // reverse collection grows to include the replica.
            if inverse.is_to_many() {
                if let Some(link) = store.link(source, &rel.name).cloned() {
                    trace!(relation = %rel.name, "shared edge, referencing far side");
                    store.set_link(replica, &rel.name, link)?;
                }
                continue;
            }

            // inverse to-one: the far side is owned by exactly one referrer,
            // so the replica needs a deep copy of it.
            let next = Ancestor {
                original: source,
                replica,
            };
            match rel.cardinality {
                Cardinality::ToOne => {
                    if let Some(Link::One(far)) = store.link(source, &rel.name).cloned() {
                        let far_replica =
                            self.clone_recursive(store, far, Some(next), child_excluded, propagate)?;
                        store.set_link(replica, &rel.name, Link::One(far_replica))?;
                    }
                }
                Cardinality::ToMany => {
                    let far_ids = store
                        .link(source, &rel.name)
                        .map(Link::ids)
                        .unwrap_or_default();
                    let mut replicas = Vec::with_capacity(far_ids.len());
                    for far in far_ids {
                        replicas.push(self.clone_recursive(
                            store,
                            far,
                            Some(next),
                            child_excluded,
                            propagate,
                        )?);
                    }
                    if !replicas.is_empty() {
                        let link = if rel.ordered {
                            Link::OrderedMany(replicas)
                        } else {
                            Link::UnorderedMany(replicas.into_iter().collect())
                        };
                        store.set_link(replica, &rel.name, link)?;
                    }
                }
            }
        }

        Ok(replica)
    }

    /// Compute and store one attribute of the replica.
    ///
    /// Resolution order: exclusion, regeneration, parent inheritance,
    /// verbatim copy. Exclusion and the "blank" fallback leave the replica at
    /// its initialized default.
    fn resolve_attribute(
        &self,
        store: &mut Store,
        source: ObjectId,
        replica: ObjectId,
        entity_name: &str,
        attr: &AttributeDef,
        ancestor: Option<Ancestor>,
    ) -> Result<(), Error> {
        if attr.has_annotation(&self.keys.exclude) {
            if attr.can_be_blank() {
                return Ok(());
            }
            return Err(Error::ExcludedRequiredAttribute {
                entity: entity_name.to_string(),
                attribute: attr.name.clone(),
            });
        }

        let mut value = store
            .attribute(source, &attr.name)
            .cloned()
            .unwrap_or(Value::Null);

        if let Some(action) = attr.annotation(&self.keys.rebuild) {
            match action.to_ascii_lowercase().as_str() {
                "uuid" => {
                    if attr.attribute_type != AttributeType::Uuid {
                        return Err(Error::RebuildUuidType {
                            entity: entity_name.to_string(),
                            attribute: attr.name.clone(),
                            actual: attr.attribute_type,
                        });
                    }
                    value = Value::new_uuid();
                }
                "now" => {
                    if attr.attribute_type != AttributeType::Timestamp {
                        return Err(Error::RebuildTimestampType {
                            entity: entity_name.to_string(),
                            attribute: attr.name.clone(),
                            actual: attr.attribute_type,
                        });
                    }
                    value = Value::now();
                }
                // unrecognized generators fall through to the copied value
                _ => {}
            }
        }

        if let Some(parent_attribute) = attr.annotation(&self.keys.follow_parent) {
            match self.parent_value(store, ancestor, parent_attribute, attr) {
                Some(inherited) => value = inherited,
                None => {
                    let fallback = attr
                        .annotation(&self.keys.without_parent)
                        .map(str::to_ascii_lowercase);
                    match fallback.as_deref() {
                        Some("keep") => {}
                        Some("blank") if attr.can_be_blank() => return Ok(()),
                        _ => {
                            return Err(Error::FollowParent {
                                entity: entity_name.to_string(),
                                attribute: attr.name.clone(),
                            });
                        }
                    }
                }
            }
        }

        store.set_attribute(replica, &attr.name, value)
    }

    /// The ancestor replica's value for the named attribute, if the ancestor
    /// exists, declares the attribute, and its type matches exactly.
    fn parent_value(
        &self,
        store: &Store,
        ancestor: Option<Ancestor>,
        parent_attribute: &str,
        attr: &AttributeDef,
    ) -> Option<Value> {
        let anc = ancestor?;
        let schema = store.schema();
        let parent_entity = store.object(anc.replica)?.entity();
        let parent_def = schema.entity(parent_entity)?.attribute(parent_attribute)?;
        if parent_def.attribute_type != attr.attribute_type {
            return None;
        }
        store.attribute(anc.replica, parent_attribute).cloned()
    }
}
