use schemaforge_parser::*;
use serde_json::{json, Value};

fn normalize(value: &Value) -> Value {
    let parsed = parse_document(value, IdGenerator::new()).unwrap();
    serialize(&parsed.value).value
}

fn assert_idempotent(value: Value) {
    let once = normalize(&value);
    let twice = normalize(&once);
    assert_eq!(once, twice, "re-serialization drifted for {}", value);
}

#[test]
fn test_required_integer_property_round_trip() {
    let source = json!({
        "type": "object",
        "properties": {"age": {"type": "integer", "minimum": 0}},
        "required": ["age"]
    });

    let parsed = parse_document(&source, IdGenerator::new()).unwrap();
    let age = &parsed.value.root.children()[0];
    assert_eq!(age.name, "age");
    assert_eq!(age.kind, Kind::Integer);
    assert_eq!(age.minimum, Some(serde_json::Number::from(0)));
    assert!(age.required);

    let mut doc = parsed.value;
    doc.include_schema_dialect = false;
    assert_eq!(serialize(&doc).value, source);
}

#[test]
fn test_legacy_exclusive_minimum() {
    let source = json!({"type": "number", "exclusiveMinimum": true, "minimum": 5});

    let mut doc = parse_document(&source, IdGenerator::new()).unwrap().value;
    let node = doc.root.single().unwrap();
    assert_eq!(node.exclusive_minimum, Some(serde_json::Number::from(5)));
    assert_eq!(node.minimum, None);

    doc.include_schema_dialect = false;
    assert_eq!(serialize(&doc).value, json!({"type": "number", "exclusiveMinimum": 5}));
}

#[test]
fn test_rich_document_is_idempotent() {
    assert_idempotent(json!({
        "$schema": SCHEMA_DIALECT,
        "title": "Order",
        "description": "An order",
        "type": "object",
        "properties": {
            "id": {"type": "string", "format": "uuid", "pattern": "^[a-f0-9-]+$"},
            "total": {"type": "number", "exclusiveMinimum": 0, "maximum": 1000},
            "status": {"type": "string", "enum": ["new", "paid"], "default": "new"},
            "lines": {
                "type": "array",
                "minItems": 1,
                "uniqueItems": true,
                "items": {"$ref": "#/$defs/Line"}
            },
            "contact": {
                "anyOf": [
                    {"type": "string", "format": "email"},
                    {"type": "null"}
                ]
            },
            "meta": {
                "type": "object",
                "additionalProperties": {"type": "string"},
                "maxProperties": 4
            },
            "flags": {"not": {"type": "boolean"}},
            "shape": {
                "allOf": [{"type": "object", "properties": {"x": {"type": "integer"}}}],
                "if": {"properties": {"x": {"const": 0}}},
                "then": {"description": "origin"}
            }
        },
        "required": ["id", "lines"],
        "additionalProperties": false,
        "$defs": {
            "Line": {
                "type": "object",
                "properties": {
                    "sku": {"type": "string", "minLength": 3},
                    "qty": {"type": "integer", "minimum": 1, "examples": [1, 2]}
                },
                "required": ["sku"]
            }
        }
    }));
}

#[test]
fn test_every_root_kind_is_idempotent() {
    let roots = [
        json!({"type": "array", "items": {"type": "integer"}}),
        json!({"oneOf": [{"type": "string"}, {"type": "integer"}]}),
        json!({"allOf": []}),
        json!({"anyOf": [{"$ref": "#/$defs/A"}], "$defs": {"A": {"type": "null"}}}),
        json!({"not": {"type": "string"}}),
        json!({"type": "boolean", "default": true}),
        json!({"type": "object", "if": {"type": "object"}, "then": {"type": "object"}, "else": {"type": "object"}}),
        json!({
            "type": "function",
            "function": {
                "name": "lookup",
                "description": "Find a thing",
                "parameters": {
                    "type": "object",
                    "properties": {"q": {"type": "string"}},
                    "required": ["q"]
                }
            }
        }),
    ];

    for root in roots {
        assert_idempotent(root);
    }
}

#[test]
fn test_function_envelope_round_trip_preserves_name() {
    let out = normalize(&json!({
        "type": "function",
        "function": {"name": "noop", "parameters": {"type": "object"}}
    }));

    assert_eq!(
        out,
        json!({
            "type": "function",
            "function": {
                "name": "noop",
                "description": "",
                "parameters": {"type": "object", "properties": {}}
            }
        })
    );
}

#[test]
fn test_identity_map_points_at_parsed_nodes() {
    let parsed = parse_document(
        &json!({"type": "object", "properties": {"a": {"type": "array", "items": {"type": "string"}}}}),
        IdGenerator::new(),
    )
    .unwrap();
    let out = serialize(&parsed.value);

    let a = &parsed.value.root.children()[0];
    assert_eq!(out.node_at("properties.a"), Some(a.id.as_str()));
    assert_eq!(out.node_at("properties.a.items"), Some(a.items.as_ref().unwrap().id.as_str()));
}
