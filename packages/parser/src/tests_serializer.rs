/// Serializer output shape and identity map paths
use crate::*;
use serde_json::{json, Number};

fn doc_with(children: Vec<SchemaNode>) -> SchemaDocument {
    let mut doc = SchemaDocument::new();
    let ids = &mut doc.ids;
    doc.root = RootSlot::Children(children.into_iter().map(|c| create_node(ids, c)).collect());
    doc
}

#[test]
fn test_object_root_with_required_property() {
    let mut age = SchemaNode::named("age", Kind::Integer);
    age.required = true;
    age.minimum = Some(Number::from(0));

    let out = serialize(&doc_with(vec![age]));

    assert_eq!(
        out.value,
        json!({
            "$schema": SCHEMA_DIALECT,
            "type": "object",
            "properties": {"age": {"type": "integer", "minimum": 0}},
            "required": ["age"]
        })
    );
    assert_eq!(out.node_at("properties.age"), Some("item_0"));
}

#[test]
fn test_unnamed_properties_are_skipped() {
    let doc = doc_with(vec![SchemaNode::new(Kind::String), SchemaNode::named("x", Kind::Boolean)]);
    let out = serialize(&doc);

    assert_eq!(out.value["properties"], json!({"x": {"type": "boolean"}}));
    assert_eq!(out.identity_map.len(), 1);
}

#[test]
fn test_title_and_dialect_are_optional() {
    let mut doc = SchemaDocument::default();
    doc.include_schema_dialect = false;
    let out = serialize(&doc);
    assert_eq!(
        out.value,
        json!({
            "title": "New Schema",
            "description": "A schema generated by the JSON Schema Builder",
            "type": "object"
        })
    );
}

#[test]
fn test_reference_emits_only_ref() {
    let node = create_node(
        &mut IdGenerator::new(),
        SchemaNode {
            kind: Kind::Ref,
            reference: "#/$defs/Address".to_string(),
            description: "ignored".to_string(),
            ..Default::default()
        },
    );

    assert_eq!(serialize_node(&node).value, json!({"$ref": "#/$defs/Address"}));
}

#[test]
fn test_exclusive_bounds_are_numeric() {
    let node = create_node(
        &mut IdGenerator::new(),
        SchemaNode {
            kind: Kind::Number,
            exclusive_minimum: Some(Number::from(5)),
            maximum: Some(Number::from(10)),
            ..Default::default()
        },
    );

    assert_eq!(
        serialize_node(&node).value,
        json!({"type": "number", "maximum": 10, "exclusiveMinimum": 5})
    );
}

#[test]
fn test_annotation_fallbacks() {
    let node = SchemaNode {
        default_value: Some("not json".to_string()),
        const_value: Some("42".to_string()),
        examples: "plain".to_string(),
        ..Default::default()
    };

    let value = serialize_node(&node).value;
    assert_eq!(value["default"], json!("not json"));
    assert_eq!(value["const"], json!(42));
    assert_eq!(value["examples"], json!(["plain"]));
}

#[test]
fn test_nested_paths() {
    let mut list = SchemaNode::named("tags", Kind::Array);
    list.items = Some(Box::new(SchemaNode::new(Kind::OneOf)));
    list.items.as_mut().unwrap().one_of_schemas = vec![SchemaNode::new(Kind::String), SchemaNode::new(Kind::Null)];

    let mut address = SchemaNode::named("address", Kind::Object);
    address.properties.push(list);
    address.additional_properties = AdditionalPropertiesMode::Schema;

    let out = serialize(&doc_with(vec![address]));
    let paths: Vec<&str> = out.identity_map.keys().map(String::as_str).collect();

    assert_eq!(
        paths,
        vec![
            "properties.address",
            "properties.address.additionalProperties",
            "properties.address.properties.tags",
            "properties.address.properties.tags.items",
            "properties.address.properties.tags.items.oneOf[0]",
            "properties.address.properties.tags.items.oneOf[1]",
        ]
    );
    assert_eq!(
        out.value["properties"]["address"]["properties"]["tags"]["items"],
        json!({"oneOf": [{"type": "string"}, {"type": "null"}]})
    );
    assert_eq!(out.value["properties"]["address"]["additionalProperties"], json!({"type": "string"}));
}

#[test]
fn test_additional_properties_disallow() {
    let mut doc = doc_with(Vec::new());
    doc.additional_properties = AdditionalPropertiesMode::Disallow;
    doc.min_properties = Some(1);

    let out = serialize(&doc);
    assert_eq!(out.value["additionalProperties"], json!(false));
    assert_eq!(out.value["minProperties"], json!(1));
}

#[test]
fn test_empty_composites_keep_their_keyword() {
    let node = node_of_kind(&mut IdGenerator::new(), Kind::AnyOf);
    assert_eq!(serialize_node(&node).value, json!({"anyOf": []}));
}

#[test]
fn test_conditional_on_primitive_node() {
    let mut ids = IdGenerator::new();
    let mut node = node_of_kind(&mut ids, Kind::String);
    node.if_schema = Some(Box::new(node_of_kind(&mut ids, Kind::String)));
    node.else_schema = Some(Box::new(node_of_kind(&mut ids, Kind::Null)));

    let out = serialize_node(&node);
    assert_eq!(
        out.value,
        json!({"type": "string", "if": {"type": "string"}, "else": {"type": "null"}})
    );
    assert_eq!(out.node_at("else"), Some("item_2"));
}

#[test]
fn test_then_without_if_is_not_emitted() {
    let mut ids = IdGenerator::new();
    let mut node = node_of_kind(&mut ids, Kind::Boolean);
    node.then_schema = Some(Box::new(node_of_kind(&mut ids, Kind::String)));
    assert_eq!(serialize_node(&node).value, json!({"type": "boolean"}));
}

#[test]
fn test_function_envelope() {
    let mut doc = doc_with(vec![SchemaNode::named("city", Kind::String)]);
    doc.root_kind = Kind::Function;
    let ids = &mut doc.ids;
    doc.definitions.push(create_node(ids, SchemaNode {
        name: "Unit".to_string(),
        is_definition: true,
        enum_values: vec![json!("c"), json!("f")],
        ..Default::default()
    }));

    let out = serialize(&doc);
    assert_eq!(
        out.value,
        json!({
            "type": "function",
            "function": {
                "name": "unnamed_function",
                "description": "",
                "parameters": {
                    "type": "object",
                    "properties": {"city": {"type": "string"}},
                    "$defs": {"Unit": {"type": "string", "enum": ["c", "f"]}}
                }
            }
        })
    );
    assert!(out.node_at("function.parameters.properties.city").is_some());
    assert!(out.node_at("function.parameters.$defs.Unit").is_some());
}

#[test]
fn test_function_without_parameters_lists_empty_properties() {
    let mut doc = SchemaDocument::new();
    doc.root_kind = Kind::Function;
    doc.title = "ping".to_string();

    let out = serialize(&doc);
    assert_eq!(out.value["function"]["name"], json!("ping"));
    assert_eq!(out.value["function"]["parameters"]["properties"], json!({}));
}

#[test]
fn test_primitive_root_merges_into_top_level() {
    let mut doc = SchemaDocument::new();
    doc.root_kind = Kind::String;
    doc.include_schema_dialect = false;
    doc.reset_root();
    if let RootSlot::Single(node) = &mut doc.root {
        node.format = "email".to_string();
    }

    let out = serialize(&doc);
    assert_eq!(out.value, json!({"type": "string", "format": "email"}));
    assert_eq!(out.node_at(""), Some("item_0"));
}

#[test]
fn test_pretty_string_indent() {
    let out = serialize_node(&SchemaNode::default());
    assert_eq!(out.to_pretty_string(4), "{\n    \"type\": \"string\"\n}");
}
