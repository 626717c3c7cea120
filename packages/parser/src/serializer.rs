use crate::ast::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-2020-12/schema#";

/// Emitted path (`properties.address.items`, `oneOf[1]`) → originating node id
pub type IdentityMap = BTreeMap<String, String>;

/// A rendered document together with its identity map
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDocument {
    pub value: Value,
    pub identity_map: IdentityMap,
}

impl SerializedDocument {
    /// Id of the node rendered at `path`
    pub fn node_at(&self, path: &str) -> Option<&str> {
        self.identity_map.get(path).map(String::as_str)
    }

    pub fn to_pretty_string(&self, indent: usize) -> String {
        to_pretty_string(&self.value, indent)
    }
}

/// Serializer converts a node tree into a JSON Schema document
///
/// Every node it renders is recorded in the identity map under the path of
/// the sub-document it produced, so an external view of the output can be
/// traced back to the editable node.
pub struct Serializer {
    identity_map: IdentityMap,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            identity_map: IdentityMap::new(),
        }
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity_map
    }

    pub fn into_identity_map(self) -> IdentityMap {
        self.identity_map
    }

    /// Serialize a whole document, including its envelope and `$defs`
    pub fn serialize_document(&mut self, doc: &SchemaDocument) -> Value {
        if doc.root_kind == Kind::Function {
            return self.serialize_function(doc);
        }

        let mut schema = Map::new();
        if doc.include_schema_dialect {
            schema.insert("$schema".into(), Value::from(SCHEMA_DIALECT));
        }
        if !doc.title.is_empty() {
            schema.insert("title".into(), Value::from(doc.title.as_str()));
        }
        if !doc.description.is_empty() {
            schema.insert("description".into(), Value::from(doc.description.as_str()));
        }

        match doc.root_kind {
            Kind::Object => {
                schema.insert("type".into(), Value::from("object"));
                self.write_object_shape(&mut schema, &ObjectShape::of_document(doc), "");
            }
            Kind::OneOf | Kind::AllOf | Kind::AnyOf => {
                let keyword = doc.root_kind.as_str();
                let options = self.serialize_options(doc.root.children(), keyword);
                schema.insert(keyword.into(), options);
            }
            Kind::Array => {
                schema.insert("type".into(), Value::from("array"));
                if let Some(items) = doc.root.single() {
                    schema.insert("items".into(), self.serialize_node(items, "items"));
                }
            }
            Kind::Not => {
                let negated = match doc.root.single() {
                    Some(node) => self.serialize_node(node, "not"),
                    None => Value::Object(Map::new()),
                };
                schema.insert("not".into(), negated);
            }
            _ => {
                // primitive roots merge the single node into the top level
                if let Some(Value::Object(fields)) =
                    doc.root.single().map(|node| self.serialize_node(node, ""))
                {
                    schema.extend(fields);
                }
            }
        }

        self.write_conditional(
            &mut schema,
            doc.if_schema.as_deref(),
            doc.then_schema.as_deref(),
            doc.else_schema.as_deref(),
            "",
        );
        self.write_definitions(&mut schema, &doc.definitions, "");

        Value::Object(schema)
    }

    fn serialize_function(&mut self, doc: &SchemaDocument) -> Value {
        let base = "function.parameters";

        let mut parameters = Map::new();
        parameters.insert("type".into(), Value::from("object"));
        self.write_object_shape(&mut parameters, &ObjectShape::of_document(doc), base);
        self.write_conditional(
            &mut parameters,
            doc.if_schema.as_deref(),
            doc.then_schema.as_deref(),
            doc.else_schema.as_deref(),
            base,
        );
        self.write_definitions(&mut parameters, &doc.definitions, base);

        let name = if doc.title.is_empty() {
            "unnamed_function"
        } else {
            doc.title.as_str()
        };

        let mut function = Map::new();
        function.insert("name".into(), Value::from(name));
        function.insert("description".into(), Value::from(doc.description.as_str()));
        function.insert("parameters".into(), Value::Object(parameters));

        let mut envelope = Map::new();
        envelope.insert("type".into(), Value::from("function"));
        envelope.insert("function".into(), Value::Object(function));
        Value::Object(envelope)
    }

    /// Serialize one node rendered at `path`
    pub fn serialize_node(&mut self, node: &SchemaNode, path: &str) -> Value {
        self.identity_map.insert(path.to_string(), node.id.clone());

        let mut schema = Map::new();

        if node.kind == Kind::Ref {
            schema.insert("$ref".into(), Value::from(node.reference.as_str()));
            return Value::Object(schema);
        }

        if let Some(keyword) = node.kind.type_keyword() {
            schema.insert("type".into(), Value::from(keyword));
        }
        if !node.description.is_empty() {
            schema.insert("description".into(), Value::from(node.description.as_str()));
        }
        if let Some(raw) = node.default_value.as_deref().filter(|s| !s.is_empty()) {
            schema.insert("default".into(), annotation(raw, false));
        }
        if let Some(raw) = node.const_value.as_deref().filter(|s| !s.is_empty()) {
            schema.insert("const".into(), annotation(raw, false));
        }
        if !node.examples.is_empty() {
            schema.insert("examples".into(), annotation(&node.examples, true));
        }

        match node.kind {
            Kind::String => {
                if !node.pattern.is_empty() {
                    schema.insert("pattern".into(), Value::from(node.pattern.as_str()));
                }
                if !node.format.is_empty() {
                    schema.insert("format".into(), Value::from(node.format.as_str()));
                }
                insert_count(&mut schema, "minLength", node.min_length);
                insert_count(&mut schema, "maxLength", node.max_length);
            }
            Kind::Number | Kind::Integer => {
                let bounds = [
                    ("minimum", &node.minimum),
                    ("maximum", &node.maximum),
                    ("exclusiveMinimum", &node.exclusive_minimum),
                    ("exclusiveMaximum", &node.exclusive_maximum),
                ];
                for (key, bound) in bounds {
                    if let Some(n) = bound {
                        schema.insert(key.into(), Value::Number(n.clone()));
                    }
                }
            }
            Kind::Object => {
                self.write_object_shape(&mut schema, &ObjectShape::of_node(node), path);
            }
            Kind::Array => {
                if let Some(items) = node.items.as_deref() {
                    let items = self.serialize_node(items, &join(path, "items"));
                    schema.insert("items".into(), items);
                }
                insert_count(&mut schema, "minItems", node.min_items);
                insert_count(&mut schema, "maxItems", node.max_items);
                if node.unique_items {
                    schema.insert("uniqueItems".into(), Value::Bool(true));
                }
            }
            Kind::OneOf | Kind::AllOf | Kind::AnyOf => {
                let keyword = node.kind.as_str();
                let options = self.serialize_options(options_of(node), &join(path, keyword));
                schema.insert(keyword.into(), options);
            }
            Kind::Not => {
                let negated = match node.not_schema.as_deref() {
                    Some(inner) => self.serialize_node(inner, &join(path, "not")),
                    None => Value::Object(Map::new()),
                };
                schema.insert("not".into(), negated);
            }
            _ => {}
        }

        if node.kind.is_primitive() && !node.enum_values.is_empty() {
            schema.insert("enum".into(), Value::Array(node.enum_values.clone()));
        }

        self.write_conditional(
            &mut schema,
            node.if_schema.as_deref(),
            node.then_schema.as_deref(),
            node.else_schema.as_deref(),
            path,
        );

        Value::Object(schema)
    }

    fn serialize_options(&mut self, options: &[SchemaNode], base: &str) -> Value {
        Value::Array(
            options
                .iter()
                .enumerate()
                .map(|(i, option)| self.serialize_node(option, &index(base, i)))
                .collect(),
        )
    }

    fn write_object_shape(&mut self, schema: &mut Map<String, Value>, shape: &ObjectShape, path: &str) {
        let mut properties = Map::new();
        let mut required = Vec::new();
        let properties_path = join(path, "properties");

        for prop in shape.properties.iter().filter(|p| !p.name.is_empty()) {
            let value = self.serialize_node(prop, &join(&properties_path, &prop.name));
            properties.insert(prop.name.clone(), value);
            if prop.required {
                required.push(Value::from(prop.name.as_str()));
            }
        }

        if !properties.is_empty() || shape.always_list_properties {
            schema.insert("properties".into(), Value::Object(properties));
        }
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }

        match shape.additional_properties {
            AdditionalPropertiesMode::Allow => {}
            AdditionalPropertiesMode::Disallow => {
                schema.insert("additionalProperties".into(), Value::Bool(false));
            }
            AdditionalPropertiesMode::Schema => {
                if let Some(extra) = shape.additional_properties_schema {
                    let value = self.serialize_node(extra, &join(path, "additionalProperties"));
                    schema.insert("additionalProperties".into(), value);
                }
            }
        }

        insert_count(schema, "minProperties", shape.min_properties);
        insert_count(schema, "maxProperties", shape.max_properties);
    }

    fn write_conditional(
        &mut self,
        schema: &mut Map<String, Value>,
        if_schema: Option<&SchemaNode>,
        then_schema: Option<&SchemaNode>,
        else_schema: Option<&SchemaNode>,
        path: &str,
    ) {
        let Some(condition) = if_schema else {
            return;
        };

        let value = self.serialize_node(condition, &join(path, "if"));
        schema.insert("if".into(), value);
        if let Some(branch) = then_schema {
            let value = self.serialize_node(branch, &join(path, "then"));
            schema.insert("then".into(), value);
        }
        if let Some(branch) = else_schema {
            let value = self.serialize_node(branch, &join(path, "else"));
            schema.insert("else".into(), value);
        }
    }

    fn write_definitions(&mut self, schema: &mut Map<String, Value>, definitions: &[SchemaNode], path: &str) {
        let defs_path = join(path, "$defs");
        let mut defs = Map::new();
        for def in definitions.iter().filter(|d| !d.name.is_empty()) {
            let value = self.serialize_node(def, &join(&defs_path, &def.name));
            defs.insert(def.name.clone(), value);
        }
        if !defs.is_empty() {
            schema.insert("$defs".into(), Value::Object(defs));
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// The object-like attributes shared by object nodes and the document root
struct ObjectShape<'a> {
    properties: &'a [SchemaNode],
    additional_properties: AdditionalPropertiesMode,
    additional_properties_schema: Option<&'a SchemaNode>,
    min_properties: Option<u64>,
    max_properties: Option<u64>,
    always_list_properties: bool,
}

impl<'a> ObjectShape<'a> {
    fn of_node(node: &'a SchemaNode) -> Self {
        Self {
            properties: &node.properties,
            additional_properties: node.additional_properties,
            additional_properties_schema: node.additional_properties_schema.as_deref(),
            min_properties: node.min_properties,
            max_properties: node.max_properties,
            always_list_properties: false,
        }
    }

    fn of_document(doc: &'a SchemaDocument) -> Self {
        Self {
            properties: doc.root.children(),
            additional_properties: doc.additional_properties,
            additional_properties_schema: doc.additional_properties_schema.as_deref(),
            min_properties: doc.min_properties,
            max_properties: doc.max_properties,
            always_list_properties: doc.root_kind == Kind::Function,
        }
    }
}

fn options_of(node: &SchemaNode) -> &[SchemaNode] {
    match node.kind {
        Kind::OneOf => &node.one_of_schemas,
        Kind::AllOf => &node.all_of_schemas,
        Kind::AnyOf => &node.any_of_schemas,
        _ => &[],
    }
}

/// Raw annotation text parsed as JSON, falling back to the literal text
fn annotation(raw: &str, wrap_in_array: bool) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) if wrap_in_array => Value::Array(vec![Value::from(raw)]),
        Err(_) => Value::from(raw),
    }
}

fn insert_count(schema: &mut Map<String, Value>, key: &str, count: Option<u64>) {
    if let Some(n) = count {
        schema.insert(key.into(), Value::from(n));
    }
}

/// `base.key`, or `key` at the top level
pub fn join(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", base, key)
    }
}

/// `base[i]`
pub fn index(base: &str, i: usize) -> String {
    format!("{}[{}]", base, i)
}

/// Render a whole document and its identity map
pub fn serialize(doc: &SchemaDocument) -> SerializedDocument {
    let mut serializer = Serializer::new();
    let value = serializer.serialize_document(doc);
    SerializedDocument {
        value,
        identity_map: serializer.into_identity_map(),
    }
}

/// Render a single detached node, rooted at the empty path
pub fn serialize_node(node: &SchemaNode) -> SerializedDocument {
    let mut serializer = Serializer::new();
    let value = serializer.serialize_node(node, "");
    SerializedDocument {
        value,
        identity_map: serializer.into_identity_map(),
    }
}

/// Pretty-print with a configurable indent width
pub fn to_pretty_string(value: &Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(out).unwrap_or_default(),
        // writing a Value into memory cannot fail
        Err(_) => value.to_string(),
    }
}
