//! End-to-end cloning tests over a notes-style object graph.

use std::collections::BTreeSet;

use mitosis::{
    AttributeDef, AttributeType, CloneOptions, Cloner, EntityDef, Error, KeyConfig, Link, ObjectId,
    RelationDef, Schema, Store, Value,
};

/// Note owns its items, pages (ordered), parts-of-items, and detail; tags and
/// labels are shared resources referenced from items.
fn notes_schema() -> Schema {
    let note = EntityDef::new("Note")
        .with_attribute(AttributeDef::new("id", AttributeType::Uuid).with_annotation("rebuild", "uuid"))
        .with_attribute(
            AttributeDef::new("created_at", AttributeType::Timestamp).with_annotation("rebuild", "now"),
        )
        .with_attribute(AttributeDef::new("name", AttributeType::String))
        .with_attribute(AttributeDef::optional("body", AttributeType::Bytes))
        .with_attribute(AttributeDef::new("pinned", AttributeType::Bool).with_default(Value::Bool(false)))
        .with_attribute(AttributeDef::new("rating", AttributeType::Int64))
        .with_relation(RelationDef::to_many("items", "Item", "note"))
        .with_relation(RelationDef::to_many("pages", "Page", "note").ordered())
        .with_relation(RelationDef::to_one("detail", "NoteDetail", "note"));

    let item = EntityDef::new("Item")
        .with_attribute(AttributeDef::new("name", AttributeType::String))
        .with_attribute(AttributeDef::new("position", AttributeType::Int64))
        .with_attribute(
            AttributeDef::new("note_id", AttributeType::Uuid)
                .with_annotation("followParent", "id")
                .with_annotation("withoutParent", "keep"),
        )
        .with_relation(RelationDef::to_one("note", "Note", "items"))
        .with_relation(RelationDef::to_one("tag", "Tag", "items"))
        .with_relation(RelationDef::to_many("labels", "Label", "items"))
        .with_relation(RelationDef::to_many("parts", "Part", "item"));

    let part = EntityDef::new("Part")
        .with_attribute(AttributeDef::new("name", AttributeType::String))
        .with_relation(RelationDef::to_one("item", "Item", "parts"));

    let page = EntityDef::new("Page")
        .with_attribute(AttributeDef::new("seq", AttributeType::Int64))
        .with_relation(RelationDef::to_one("note", "Note", "pages"));

    let detail = EntityDef::new("NoteDetail")
        .with_attribute(AttributeDef::optional("content", AttributeType::String))
        .with_relation(RelationDef::to_one("note", "Note", "detail"));

    let tag = EntityDef::new("Tag")
        .with_attribute(AttributeDef::new("name", AttributeType::String))
        .with_relation(RelationDef::to_many("items", "Item", "tag"));

    let label = EntityDef::new("Label")
        .with_attribute(AttributeDef::new("name", AttributeType::String))
        .with_relation(RelationDef::to_many("items", "Item", "labels"));

    let schema = Schema::new()
        .with_entity(note)
        .with_entity(item)
        .with_entity(part)
        .with_entity(page)
        .with_entity(detail)
        .with_entity(tag)
        .with_entity(label);
    schema.validate().unwrap();
    schema
}

fn new_note(store: &mut Store) -> ObjectId {
    let note = store.create_object("Note").unwrap();
    store.set_attribute(note, "id", Value::new_uuid()).unwrap();
    store
        .set_attribute(note, "created_at", Value::Timestamp(1_600_000_000_000_000))
        .unwrap();
    store
        .set_attribute(note, "name", Value::String("note".into()))
        .unwrap();
    store
        .set_attribute(note, "body", Value::Bytes(b"hello world".to_vec()))
        .unwrap();
    store.set_attribute(note, "pinned", Value::Bool(true)).unwrap();
    store.set_attribute(note, "rating", Value::Int64(10)).unwrap();
    note
}

fn new_item(store: &mut Store, note: ObjectId, i: i64) -> ObjectId {
    let item = store.create_object("Item").unwrap();
    store
        .set_attribute(item, "name", Value::String(format!("item{i}")))
        .unwrap();
    store.set_attribute(item, "position", Value::Int64(i)).unwrap();
    let note_id = store.attribute(note, "id").cloned().unwrap();
    store.set_attribute(item, "note_id", note_id).unwrap();
    store.set_link(item, "note", Link::One(note)).unwrap();
    item
}

#[test]
fn test_single_object_clone_is_independent() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    store.commit().unwrap();

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();

    assert_ne!(replica, note);
    assert_eq!(store.count("Note"), 2);

    // plain attributes are copied verbatim
    assert_eq!(store.attribute(replica, "name"), store.attribute(note, "name"));
    assert_eq!(store.attribute(replica, "body"), store.attribute(note, "body"));
    assert_eq!(store.attribute(replica, "pinned"), store.attribute(note, "pinned"));
    assert_eq!(store.attribute(replica, "rating"), store.attribute(note, "rating"));

    // regenerated attributes are fresh
    assert_ne!(store.attribute(replica, "id"), store.attribute(note, "id"));
    assert_ne!(
        store.attribute(replica, "created_at"),
        store.attribute(note, "created_at")
    );

    // mutating the replica leaves the original untouched
    store
        .set_attribute(replica, "name", Value::String("changed".into()))
        .unwrap();
    assert_eq!(store.attribute(note, "name"), Some(&Value::String("note".into())));
}

#[test]
fn test_one_to_many_owned_children_are_deep_copied() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let items: Vec<ObjectId> = (0..10).map(|i| new_item(&mut store, note, i)).collect();
    store.commit().unwrap();
    assert_eq!(store.link(note, "items").unwrap().len(), 10);

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();

    let replica_items = store.link(replica, "items").unwrap().ids();
    assert_eq!(replica_items.len(), 10);
    assert_eq!(store.count("Note"), 2);
    assert_eq!(store.count("Item"), 20);

    let replica_id = store.attribute(replica, "id").cloned().unwrap();
    for item in &replica_items {
        // new identities, back-reference points at the replica
        assert!(!items.contains(item));
        assert_eq!(store.link(*item, "note"), Some(&Link::One(replica)));
        // note_id follows the parent replica's regenerated id
        assert_eq!(store.attribute(*item, "note_id"), Some(&replica_id));
    }
}

#[test]
fn test_one_to_one_owned_detail_is_deep_copied() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let detail = store.create_object("NoteDetail").unwrap();
    store
        .set_attribute(detail, "content", Value::String("description".into()))
        .unwrap();
    store.set_link(detail, "note", Link::One(note)).unwrap();
    store.commit().unwrap();

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();

    let replica_detail = match store.link(replica, "detail") {
        Some(Link::One(id)) => *id,
        other => panic!("expected to-one detail link, got {other:?}"),
    };
    assert_ne!(replica_detail, detail);
    assert_eq!(store.link(replica_detail, "note"), Some(&Link::One(replica)));
    assert_eq!(
        store.attribute(replica_detail, "content"),
        Some(&Value::String("description".into()))
    );
    assert_eq!(store.count("NoteDetail"), 2);
}

#[test]
fn test_shared_tag_is_referenced_not_duplicated() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let tag = store.create_object("Tag").unwrap();
    store
        .set_attribute(tag, "name", Value::String("urgent".into()))
        .unwrap();
    let n = 3;
    for i in 0..n {
        let item = new_item(&mut store, note, i);
        store.set_link(item, "tag", Link::One(tag)).unwrap();
    }
    store.commit().unwrap();
    assert_eq!(store.link(tag, "items").unwrap().len(), 3);

    Cloner::new().clone_object(&mut store, note).unwrap();

    // N new children, but still exactly one tag
    assert_eq!(store.count("Item"), 6);
    assert_eq!(store.count("Tag"), 1);
    // the tag's reverse collection grew by N
    assert_eq!(store.link(tag, "items").unwrap().len(), 6);
}

#[test]
fn test_many_to_many_labels_are_not_duplicated() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let l1 = store.create_object("Label").unwrap();
    store.set_attribute(l1, "name", Value::String("red".into())).unwrap();
    let l2 = store.create_object("Label").unwrap();
    store.set_attribute(l2, "name", Value::String("blue".into())).unwrap();

    for i in 0..2 {
        let item = new_item(&mut store, note, i);
        store
            .set_link(item, "labels", Link::UnorderedMany([l1, l2].into_iter().collect()))
            .unwrap();
    }
    store.commit().unwrap();
    assert_eq!(store.link(l1, "items").unwrap().len(), 2);
    assert_eq!(store.link(l2, "items").unwrap().len(), 2);

    Cloner::new().clone_object(&mut store, note).unwrap();

    assert_eq!(store.count("Label"), 2);
    // each label's reverse count grew by the number of cloned items
    assert_eq!(store.link(l1, "items").unwrap().len(), 4);
    assert_eq!(store.link(l2, "items").unwrap().len(), 4);
}

#[test]
fn test_ordered_relation_preserves_order() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let pages: Vec<ObjectId> = (0..30)
        .map(|i| {
            let page = store.create_object("Page").unwrap();
            store.set_attribute(page, "seq", Value::Int64(i)).unwrap();
            page
        })
        .collect();
    store
        .set_link(note, "pages", Link::OrderedMany(pages.clone()))
        .unwrap();
    store.commit().unwrap();

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();

    let replica_pages = store.link(replica, "pages").unwrap().ids();
    assert_eq!(replica_pages.len(), 30);
    for (i, page) in replica_pages.iter().enumerate() {
        assert!(!pages.contains(page));
        assert_eq!(store.attribute(*page, "seq"), Some(&Value::Int64(i as i64)));
    }
}

#[test]
fn test_back_edge_is_not_rewalked() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    new_item(&mut store, note, 0);
    store.commit().unwrap();

    // the child's to-one back-reference must not re-clone the owner
    Cloner::new().clone_object(&mut store, note).unwrap();
    assert_eq!(store.count("Note"), 2);
    assert_eq!(store.count("Item"), 2);
}

#[test]
fn test_cloning_a_child_shares_its_owner() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let item = new_item(&mut store, note, 0);
    store.commit().unwrap();

    // from the item's side the note is a shared resource (inverse to-many)
    let replica = Cloner::new().clone_object(&mut store, item).unwrap();

    assert_eq!(store.count("Note"), 1);
    assert_eq!(store.link(replica, "note"), Some(&Link::One(note)));
    assert_eq!(store.link(note, "items").unwrap().len(), 2);
}

#[test]
fn test_excluded_relation_annotation_skips_subgraph() {
    let mut schema = notes_schema();
    // mark Note.items as excluded in the schema itself
    let note_def = schema.entities.get_mut("Note").unwrap();
    for rel in &mut note_def.relations {
        if rel.name == "items" {
            rel.annotations.insert("exclude".into(), String::new());
        }
    }
    let mut store = Store::new(schema);
    let note = new_note(&mut store);
    new_item(&mut store, note, 0);
    store.commit().unwrap();

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();

    assert!(store.link(replica, "items").is_none());
    assert_eq!(store.count("Item"), 1);
}

#[test]
fn test_excluded_relation_names_apply_at_root() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    for i in 0..10 {
        new_item(&mut store, note, i);
    }
    store.commit().unwrap();

    let options = CloneOptions::new().excluding(["items"]);
    let replica = Cloner::new()
        .clone_object_with(&mut store, note, &options)
        .unwrap();

    assert!(store.link(replica, "items").is_none());
    assert_eq!(store.count("Item"), 10);
}

#[test]
fn test_exclusion_propagation_reaches_deeper_levels() {
    let schema = notes_schema();
    assert!(schema.relation_names_globally_unique());

    let mut store = Store::new(schema);
    let note = new_note(&mut store);
    let item = new_item(&mut store, note, 0);
    let part = store.create_object("Part").unwrap();
    store
        .set_attribute(part, "name", Value::String("bolt".into()))
        .unwrap();
    store.set_link(part, "item", Link::One(item)).unwrap();
    store.commit().unwrap();

    // without propagation the exclusion set resets per level, so the
    // item-level "parts" relation is still cloned
    let options = CloneOptions::new().excluding(["parts"]);
    Cloner::new()
        .clone_object_with(&mut store, note, &options)
        .unwrap();
    assert_eq!(store.count("Part"), 2);

    // with propagation the name suppresses the relation at every depth
    let options = CloneOptions::new().excluding(["parts"]).propagate_exclusions();
    let replica = Cloner::new()
        .clone_object_with(&mut store, note, &options)
        .unwrap();
    assert_eq!(store.count("Part"), 2);
    let replica_item = store.link(replica, "items").unwrap().ids()[0];
    assert!(store.link(replica_item, "parts").is_none());
}

#[test]
fn test_commit_boundary() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    store.commit().unwrap();

    // commit_on_return = false leaves the scope pending
    let options = CloneOptions::new().without_commit();
    Cloner::new()
        .clone_object_with(&mut store, note, &options)
        .unwrap();
    assert!(store.has_pending_changes());
    store.discard_pending();
    assert_eq!(store.count("Note"), 1);

    // default options commit exactly once
    Cloner::new().clone_object(&mut store, note).unwrap();
    assert!(!store.has_pending_changes());
    assert_eq!(store.count("Note"), 2);
}

#[test]
fn test_descendant_failure_aborts_without_commit() {
    // Item.name carries an illegal rebuild generator for its type
    let mut schema = notes_schema();
    let item_def = schema.entities.get_mut("Item").unwrap();
    for attr in &mut item_def.attributes {
        if attr.name == "name" {
            attr.annotations.insert("rebuild".into(), "uuid".into());
        }
    }
    let mut store = Store::new(schema);
    let note = new_note(&mut store);
    new_item(&mut store, note, 0);
    store.commit().unwrap();

    let err = Cloner::new().clone_object(&mut store, note).unwrap_err();
    assert!(matches!(err, Error::RebuildUuidType { .. }));

    // nothing was committed; dropping the scope restores the old counts
    assert!(store.has_pending_changes());
    store.discard_pending();
    assert_eq!(store.count("Note"), 1);
    assert_eq!(store.count("Item"), 1);
}

#[test]
fn test_follow_parent_type_mismatch_uses_fallback() {
    // note_title names a parent attribute of a different type, so the
    // inherited value never resolves and "keep" retains the item's own value
    let mut schema = notes_schema();
    let item_def = schema.entities.get_mut("Item").unwrap();
    item_def.attributes.push(
        AttributeDef::optional("note_title", AttributeType::Int64)
            .with_annotation("followParent", "name")
            .with_annotation("withoutParent", "keep"),
    );
    let mut store = Store::new(schema);
    let note = new_note(&mut store);
    let item = new_item(&mut store, note, 0);
    store.set_attribute(item, "note_title", Value::Int64(7)).unwrap();
    store.commit().unwrap();

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();
    let replica_item = store.link(replica, "items").unwrap().ids()[0];
    assert_eq!(store.attribute(replica_item, "note_title"), Some(&Value::Int64(7)));
}

#[test]
fn test_custom_annotation_keys() {
    let note = EntityDef::new("Note")
        .with_attribute(AttributeDef::new("id", AttributeType::Uuid).with_annotation("copy.rebuild", "uuid"))
        .with_attribute(
            AttributeDef::optional("draft", AttributeType::String).with_annotation("copy.exclude", ""),
        );
    let schema = Schema::new().with_entity(note);
    schema.validate().unwrap();

    let mut store = Store::new(schema);
    let note = store.create_object("Note").unwrap();
    store.set_attribute(note, "id", Value::new_uuid()).unwrap();
    store
        .set_attribute(note, "draft", Value::String("wip".into()))
        .unwrap();
    store.commit().unwrap();

    let keys = KeyConfig {
        exclude: "copy.exclude".into(),
        rebuild: "copy.rebuild".into(),
        follow_parent: "copy.followParent".into(),
        without_parent: "copy.withoutParent".into(),
    };
    let replica = Cloner::with_keys(keys)
        .clone_object(&mut store, note)
        .unwrap();

    assert_ne!(store.attribute(replica, "id"), store.attribute(note, "id"));
    assert_eq!(store.attribute(replica, "draft"), Some(&Value::Null));
}

#[test]
fn test_unordered_collections_keep_set_semantics() {
    let mut store = Store::new(notes_schema());
    let note = new_note(&mut store);
    let items: BTreeSet<ObjectId> = (0..5).map(|i| new_item(&mut store, note, i)).collect();
    store.commit().unwrap();

    let replica = Cloner::new().clone_object(&mut store, note).unwrap();
    let replica_items: BTreeSet<ObjectId> = store.link(replica, "items").unwrap().ids().into_iter().collect();

    assert_eq!(replica_items.len(), 5);
    assert!(replica_items.is_disjoint(&items));
}
