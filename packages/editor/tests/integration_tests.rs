//! Integration tests for editor crate

use schemaforge_common::{FileStore, MemoryStore, StateStore};
use schemaforge_editor::{
    AttributeUpdate, EditorError, Mutation, Workbench, WorkbenchSettings, LEGACY_STATE_KEY, STATE_KEY,
};
use schemaforge_parser::{Kind, ParseError, SeqSlot, SCHEMA_DIALECT};
use serde_json::json;

fn add_root_child() -> Mutation {
    Mutation::AddChild {
        parent_id: None,
        slot: SeqSlot::Root,
    }
}

#[test]
fn test_document_lifecycle() {
    let mut workbench = Workbench::new(WorkbenchSettings::default());

    let id = workbench
        .apply(&add_root_child())
        .unwrap()
        .created_id()
        .unwrap()
        .to_string();
    workbench
        .apply(&Mutation::UpdateAttribute {
            node_id: id.clone(),
            update: AttributeUpdate::Name("age".to_string()),
        })
        .unwrap();
    workbench
        .apply(&Mutation::UpdateAttribute {
            node_id: id.clone(),
            update: AttributeUpdate::Kind(Kind::Integer),
        })
        .unwrap();

    let output = workbench.document().output();
    assert_eq!(output["$schema"], SCHEMA_DIALECT);
    assert_eq!(output["properties"]["age"], json!({"type": "integer"}));
    assert_eq!(workbench.document().rendered().node_at("properties.age"), Some(id.as_str()));
}

#[test]
fn test_undo_only_touches_the_edited_tab() {
    let mut workbench = Workbench::new(WorkbenchSettings::default());
    workbench.add_tab();

    // edit tab 1, then move over to tab 2
    workbench.activate(0);
    workbench.apply(&add_root_child()).unwrap();
    workbench.activate(1);
    let tab_two_before = workbench.document().schema().clone();

    assert!(workbench.undo().unwrap());

    assert!(workbench.tabs()[0].document.schema().root.children().is_empty());
    assert_eq!(workbench.document().schema(), &tab_two_before);
    assert_eq!(workbench.active_index(), 1);

    assert!(workbench.redo().unwrap());
    assert_eq!(workbench.tabs()[0].document.schema().root.children().len(), 1);
}

#[test]
fn test_rename_propagates_within_one_tab_only() {
    let source = json!({
        "type": "object",
        "properties": {"home": {"$ref": "#/$defs/Address"}},
        "$defs": {"Address": {"type": "object"}}
    })
    .to_string();

    let mut workbench = Workbench::new(WorkbenchSettings::default());
    workbench.import_document(&source).unwrap();
    workbench.add_tab();
    workbench.import_document(&source).unwrap();
    workbench.activate(0);

    let def_id = workbench.document().schema().definitions[0].id.clone();
    workbench
        .apply(&Mutation::UpdateAttribute {
            node_id: def_id,
            update: AttributeUpdate::Name("Location".to_string()),
        })
        .unwrap();

    let first = workbench.tabs()[0].document.output();
    assert_eq!(first["properties"]["home"]["$ref"], "#/$defs/Location");
    assert!(first["$defs"].get("Location").is_some());

    let second = workbench.tabs()[1].document.output();
    assert_eq!(second["properties"]["home"]["$ref"], "#/$defs/Address");
}

#[test]
fn test_malformed_import_leaves_tab_unchanged() {
    let mut workbench = Workbench::new(WorkbenchSettings::default());
    workbench.apply(&add_root_child()).unwrap();
    let before = workbench.document().schema().clone();
    let history = workbench.history().len();

    let err = workbench.import_document("{\"type\": ").unwrap_err();
    assert!(matches!(err, EditorError::Parse(ParseError::Json(_))));

    let err = workbench.import_document("[1, 2]").unwrap_err();
    assert!(matches!(err, EditorError::Parse(ParseError::InvalidShape { .. })));

    assert_eq!(workbench.document().schema(), &before);
    assert_eq!(workbench.history().len(), history);
}

#[test]
fn test_untitled_import_gets_default_title() {
    let mut workbench = Workbench::new(WorkbenchSettings::default());
    workbench.import_document(r#"{"type": "string"}"#).unwrap();
    assert_eq!(workbench.document().title(), "Imported Schema");
    assert_eq!(workbench.document().output()["title"], "Imported Schema");

    workbench
        .import_document(r#"{"title": "Person", "type": "object"}"#)
        .unwrap();
    assert_eq!(workbench.document().title(), "Person");
}

#[test]
fn test_import_never_reuses_ids() {
    let mut workbench = Workbench::new(WorkbenchSettings::default());
    for _ in 0..3 {
        workbench.apply(&add_root_child()).unwrap();
    }
    let counter = workbench.document().schema().ids.peek();

    workbench
        .import_document(r#"{"type": "object", "properties": {"a": {"type": "string"}}}"#)
        .unwrap();

    let imported = &workbench.document().schema().root.children()[0];
    let n: u64 = imported.id.trim_start_matches("item_").parse().unwrap();
    assert!(n >= counter);
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());

    let mut workbench = Workbench::new(WorkbenchSettings::default());
    workbench.apply(&add_root_child()).unwrap();
    workbench.add_tab();
    workbench.save(&mut store).unwrap();

    let restored = Workbench::load(&mut store, WorkbenchSettings::default()).unwrap();
    assert_eq!(restored.tabs().len(), 2);
    assert_eq!(restored.active_index(), 1);
    assert_eq!(restored.document().title(), "Schema 2");
    assert_eq!(
        restored.tabs()[0].document.schema(),
        workbench.tabs()[0].document.schema()
    );
}

#[test]
fn test_legacy_state_migrates_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store
        .set(
            LEGACY_STATE_KEY,
            r#"{"title": "Legacy", "rootSchemaType": "object", "schemaDefinition": [{"id": "item_7", "name": "n", "type": "number", "exclusiveMinimum": true, "minimum": 3}], "nextId": 8}"#,
        )
        .unwrap();

    let workbench = Workbench::load(&mut store, WorkbenchSettings::default()).unwrap();
    assert_eq!(workbench.tabs().len(), 1);
    assert_eq!(workbench.document().title(), "Legacy");

    let node = &workbench.document().schema().root.children()[0];
    assert_eq!(node.exclusive_minimum, Some(serde_json::Number::from(3)));
    assert_eq!(node.minimum, None);
    assert_eq!(workbench.document().output()["properties"]["n"], json!({"type": "number", "exclusiveMinimum": 3}));
    assert!(workbench.document().schema().ids.peek() >= 8);

    assert!(store.get(LEGACY_STATE_KEY).unwrap().is_none());
    assert!(store.get(STATE_KEY).unwrap().is_some());
}

#[test]
fn test_out_of_range_active_index_is_clamped() {
    let state = json!({
        "schemas": [{"title": "A"}, {"title": "B"}],
        "activeSchemaIndex": 9
    });
    let mut store = MemoryStore::new().with_entry(STATE_KEY, &state.to_string());

    let workbench = Workbench::load(&mut store, WorkbenchSettings::default()).unwrap();
    assert_eq!(workbench.active_index(), 1);
    assert_eq!(workbench.document().title(), "B");
}

#[test]
fn test_empty_saved_list_opens_default_tab() {
    let mut store = MemoryStore::new().with_entry(STATE_KEY, r#"{"schemas": [], "activeSchemaIndex": 0}"#);

    let workbench = Workbench::load(&mut store, WorkbenchSettings::default()).unwrap();
    assert_eq!(workbench.tabs().len(), 1);
    assert_eq!(workbench.document().title(), "New Schema");
}

#[test]
fn test_reset_forgets_saved_state() {
    let mut store = MemoryStore::new();
    let mut workbench = Workbench::new(WorkbenchSettings::default());
    workbench.add_tab();
    workbench.save(&mut store).unwrap();

    workbench.reset(&mut store).unwrap();
    assert_eq!(workbench.tabs().len(), 1);
    assert!(store.entries.is_empty());
}
