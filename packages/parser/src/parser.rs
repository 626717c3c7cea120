use crate::ast::*;
use crate::error::{describe, ParseError, ParseResult, ParseWarning};
use crate::factory::create_node;
use crate::id_generator::IdGenerator;
use crate::serializer::{index, join};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

/// Context for the node being produced
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub name: String,
    pub required: bool,
    pub is_definition: bool,
}

impl ParseContext {
    pub fn property(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            is_definition: false,
        }
    }

    pub fn definition(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            is_definition: true,
        }
    }
}

/// A parse result together with the non-fatal warnings raised on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub warnings: Vec<ParseWarning>,
}

/// One kind-inference rule; rules are tried in order and the first match wins.
type KindRule = fn(&Map<String, Value>) -> Option<Kind>;

/// `$ref` > composite keyword > explicit type > structural inference
const KIND_RULES: [KindRule; 4] = [
    infer_reference,
    infer_composite,
    infer_explicit_type,
    infer_structure,
];

fn infer_reference(schema: &Map<String, Value>) -> Option<Kind> {
    schema.contains_key("$ref").then_some(Kind::Ref)
}

fn infer_composite(schema: &Map<String, Value>) -> Option<Kind> {
    [Kind::OneOf, Kind::AllOf, Kind::AnyOf, Kind::Not]
        .into_iter()
        .find(|kind| schema.contains_key(kind.as_str()))
}

fn infer_explicit_type(schema: &Map<String, Value>) -> Option<Kind> {
    schema
        .get("type")
        .and_then(Value::as_str)
        .and_then(Kind::from_type_keyword)
}

fn infer_structure(schema: &Map<String, Value>) -> Option<Kind> {
    let untyped = !schema.contains_key("type");
    (untyped && (schema.contains_key("properties") || schema.contains_key("if"))).then_some(Kind::Object)
}

/// Infer the kind of a schema, or `None` when no rule applies
pub fn infer_kind(schema: &Map<String, Value>) -> Option<Kind> {
    KIND_RULES.iter().find_map(|rule| rule(schema))
}

/// Fold the legacy boolean form and the modern numeric form of an exclusive
/// bound into a single (inclusive, exclusive) pair where at most one is set.
pub fn normalize_bound(inclusive: Option<Number>, exclusive: Option<&Value>) -> (Option<Number>, Option<Number>) {
    match exclusive {
        Some(Value::Bool(true)) => (None, inclusive),
        Some(Value::Number(n)) => (None, Some(n.clone())),
        _ => (inclusive, None),
    }
}

/// Parser builds node trees from arbitrary JSON Schema documents
///
/// Templates are built bottom-up without identities, then handed to the
/// factory in one call so ids are assigned parent-first.
pub struct Parser {
    warnings: Vec<ParseWarning>,
    references: Vec<(String, String)>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }

    fn warn(&mut self, warning: ParseWarning) {
        warn!(%warning, "schema import");
        self.warnings.push(warning);
    }

    /// Parse one schema into a fully built node
    pub fn parse_node(
        &mut self,
        schema: &Value,
        ctx: ParseContext,
        path: &str,
        ids: &mut IdGenerator,
    ) -> SchemaNode {
        let template = self.template(schema, ctx, path);
        create_node(ids, template)
    }

    /// Id-less node template for `schema`
    pub fn template(&mut self, schema: &Value, ctx: ParseContext, path: &str) -> SchemaNode {
        let empty = Map::new();
        let schema = schema.as_object().unwrap_or(&empty);

        let kind = match infer_kind(schema) {
            Some(kind) => kind,
            None => {
                let warning = match schema.get("type") {
                    Some(found) => ParseWarning::UnknownType {
                        path: path.to_string(),
                        found: type_label(found),
                    },
                    None => ParseWarning::Untyped {
                        path: path.to_string(),
                    },
                };
                self.warn(warning);
                Kind::Object
            }
        };

        let mut node = SchemaNode {
            name: ctx.name,
            kind,
            required: ctx.required,
            is_definition: ctx.is_definition,
            ..Default::default()
        };
        read_attributes(&mut node, schema);

        match kind {
            Kind::Ref => {
                node.reference = text(schema, "$ref");
                self.references.push((path.to_string(), node.reference.clone()));
                // a reference is terminal
                return node;
            }
            Kind::Object => {
                let shape = self.object_shape(schema, path);
                node.properties = shape.properties;
                node.additional_properties = shape.additional_properties;
                node.additional_properties_schema = shape.additional_properties_schema;
                node.min_properties = shape.min_properties;
                node.max_properties = shape.max_properties;
            }
            Kind::Array => {
                node.items = Some(Box::new(self.items(schema, path)));
            }
            Kind::OneOf | Kind::AllOf | Kind::AnyOf => {
                let options = self.options(schema, kind.as_str(), &join(path, kind.as_str()));
                match kind {
                    Kind::OneOf => node.one_of_schemas = options,
                    Kind::AllOf => node.all_of_schemas = options,
                    _ => node.any_of_schemas = options,
                }
            }
            Kind::Not => {
                node.not_schema = schema
                    .get("not")
                    .map(|inner| Box::new(self.template(inner, ParseContext::default(), &join(path, "not"))));
            }
            _ => {}
        }

        let (if_schema, then_schema, else_schema) = self.conditional(schema, path);
        node.if_schema = if_schema;
        node.then_schema = then_schema;
        node.else_schema = else_schema;

        node
    }

    fn object_shape(&mut self, schema: &Map<String, Value>, path: &str) -> ParsedObject {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let properties_path = join(path, "properties");
        let properties = match schema.get("properties").and_then(Value::as_object) {
            Some(props) => props
                .iter()
                .map(|(name, prop)| {
                    let ctx = ParseContext::property(name.clone(), required.contains(&name.as_str()));
                    self.template(prop, ctx, &join(&properties_path, name))
                })
                .collect(),
            None => Vec::new(),
        };

        let (additional_properties, additional_properties_schema) = match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => (AdditionalPropertiesMode::Disallow, None),
            Some(extra @ Value::Object(_)) => {
                let template = self.template(extra, ParseContext::default(), &join(path, "additionalProperties"));
                (AdditionalPropertiesMode::Schema, Some(Box::new(template)))
            }
            _ => (AdditionalPropertiesMode::Allow, None),
        };

        ParsedObject {
            properties,
            additional_properties,
            additional_properties_schema,
            min_properties: count(schema, "minProperties"),
            max_properties: count(schema, "maxProperties"),
        }
    }

    fn items(&mut self, schema: &Map<String, Value>, path: &str) -> SchemaNode {
        let items_path = join(path, "items");
        match schema.get("items") {
            Some(items @ Value::Object(_)) => self.template(items, ParseContext::default(), &items_path),
            _ => {
                self.warn(ParseWarning::MissingItems { path: items_path });
                SchemaNode::default()
            }
        }
    }

    fn options(&mut self, schema: &Map<String, Value>, keyword: &str, base: &str) -> Vec<SchemaNode> {
        schema
            .get(keyword)
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| self.template(option, ParseContext::default(), &index(base, i)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn conditional(&mut self, schema: &Map<String, Value>, path: &str) -> Branches {
        let mut branch = |key: &str| {
            schema
                .get(key)
                .map(|s| Box::new(self.template(s, ParseContext::default(), &join(path, key))))
        };
        (branch("if"), branch("then"), branch("else"))
    }

    /// Parse a whole document: a bare schema or a function envelope
    pub fn parse_document(&mut self, value: &Value, ids: IdGenerator) -> ParseResult<SchemaDocument> {
        let Value::Object(schema) = value else {
            return Err(ParseError::invalid_shape("object", describe(value)));
        };

        let mut doc = SchemaDocument::with_ids(ids);

        let envelope = schema.get("function").and_then(Value::as_object);
        let root = match envelope {
            Some(function) if schema.get("type").and_then(Value::as_str) == Some("function") => {
                doc.root_kind = Kind::Function;
                doc.title = text(function, "name");
                doc.description = text(function, "description");
                debug!(name = %doc.title, "unwrapping function envelope");
                let parameters = function.get("parameters").and_then(Value::as_object);
                return self.finish_function(doc, parameters);
            }
            _ => schema,
        };

        doc.title = text(root, "title");
        doc.description = text(root, "description");
        doc.include_schema_dialect = root.contains_key("$schema");

        let definitions = self.definitions(root, "");
        self.root_slot(&mut doc, root);
        let (if_schema, then_schema, else_schema) = self.conditional(root, "");
        doc.if_schema = if_schema;
        doc.then_schema = then_schema;
        doc.else_schema = else_schema;

        self.build(doc, definitions)
    }

    fn finish_function(
        &mut self,
        mut doc: SchemaDocument,
        parameters: Option<&Map<String, Value>>,
    ) -> ParseResult<SchemaDocument> {
        let empty = Map::new();
        let parameters = parameters.unwrap_or(&empty);
        let base = "function.parameters";

        let definitions = self.definitions(parameters, base);
        let (properties, rest) = self.object_shape(parameters, base).split();
        doc.root = RootSlot::Children(properties);
        doc.apply_object_shape(rest);
        let (if_schema, then_schema, else_schema) = self.conditional(parameters, base);
        doc.if_schema = if_schema;
        doc.then_schema = then_schema;
        doc.else_schema = else_schema;

        self.build(doc, definitions)
    }

    fn root_slot(&mut self, doc: &mut SchemaDocument, schema: &Map<String, Value>) {
        let kind = match infer_composite(schema).or_else(|| infer_explicit_type(schema)) {
            Some(kind) => kind,
            None if schema.contains_key("type") || schema.contains_key("$ref") => {
                let found = match schema.get("type") {
                    Some(found) => type_label(found),
                    None => "$ref".to_string(),
                };
                self.warn(ParseWarning::UnknownRootType { found });
                doc.root_kind = Kind::Object;
                doc.root = RootSlot::Children(Vec::new());
                return;
            }
            None => {
                if !has_object_shape(schema) {
                    self.warn(ParseWarning::UntypedRoot);
                }
                Kind::Object
            }
        };

        doc.root_kind = kind;
        doc.root = match kind {
            Kind::Object => {
                let (properties, rest) = self.object_shape(schema, "").split();
                doc.apply_object_shape(rest);
                RootSlot::Children(properties)
            }
            Kind::OneOf | Kind::AllOf | Kind::AnyOf => {
                RootSlot::Children(self.options(schema, kind.as_str(), kind.as_str()))
            }
            Kind::Array => RootSlot::Single(Box::new(self.items(schema, ""))),
            Kind::Not => {
                let negated = match schema.get("not") {
                    Some(inner) => self.template(inner, ParseContext::default(), "not"),
                    None => SchemaNode::default(),
                };
                RootSlot::Single(Box::new(negated))
            }
            _ => {
                let mut stripped = schema.clone();
                for key in ["$schema", "title", "description", "$defs", "definitions", "if", "then", "else"] {
                    stripped.remove(key);
                }
                RootSlot::Single(Box::new(self.template(&Value::Object(stripped), ParseContext::default(), "")))
            }
        };
    }

    fn definitions(&mut self, schema: &Map<String, Value>, path: &str) -> Vec<SchemaNode> {
        let (key, defs) = match (schema.get("$defs"), schema.get("definitions")) {
            (Some(Value::Object(defs)), _) => ("$defs", defs),
            (None, Some(Value::Object(defs))) => ("definitions", defs),
            _ => return Vec::new(),
        };
        let defs_path = join(path, key);
        defs.iter()
            .map(|(name, def)| self.template(def, ParseContext::definition(name.clone()), &join(&defs_path, name)))
            .collect()
    }

    /// Assign identities to every template and check references
    fn build(&mut self, mut doc: SchemaDocument, definitions: Vec<SchemaNode>) -> ParseResult<SchemaDocument> {
        let ids = &mut doc.ids;
        doc.root = match std::mem::take(&mut doc.root) {
            RootSlot::Children(children) => {
                RootSlot::Children(children.into_iter().map(|c| create_node(ids, c)).collect())
            }
            RootSlot::Single(node) => RootSlot::Single(Box::new(create_node(ids, *node))),
        };
        doc.definitions = definitions.into_iter().map(|d| create_node(ids, d)).collect();
        for branch in [
            &mut doc.additional_properties_schema,
            &mut doc.if_schema,
            &mut doc.then_schema,
            &mut doc.else_schema,
        ] {
            if let Some(template) = branch.take() {
                *branch = Some(Box::new(create_node(ids, *template)));
            }
        }

        let dangling: Vec<_> = self
            .references
            .iter()
            .filter_map(|(path, reference)| {
                let name = reference.strip_prefix("#/$defs/")?;
                doc.definition(name)
                    .is_none()
                    .then(|| ParseWarning::UnresolvedRef {
                        path: path.clone(),
                        reference: reference.clone(),
                    })
            })
            .collect();
        for warning in dangling {
            self.warn(warning);
        }

        Ok(doc)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

type Branches = (
    Option<Box<SchemaNode>>,
    Option<Box<SchemaNode>>,
    Option<Box<SchemaNode>>,
);

struct ParsedObject {
    properties: Vec<SchemaNode>,
    additional_properties: AdditionalPropertiesMode,
    additional_properties_schema: Option<Box<SchemaNode>>,
    min_properties: Option<u64>,
    max_properties: Option<u64>,
}

impl ParsedObject {
    /// Properties apart from the attributes the document root mirrors
    fn split(self) -> (Vec<SchemaNode>, RootObject) {
        let rest = RootObject {
            additional_properties: self.additional_properties,
            additional_properties_schema: self.additional_properties_schema,
            min_properties: self.min_properties,
            max_properties: self.max_properties,
        };
        (self.properties, rest)
    }
}

/// Object attributes the document root mirrors
struct RootObject {
    additional_properties: AdditionalPropertiesMode,
    additional_properties_schema: Option<Box<SchemaNode>>,
    min_properties: Option<u64>,
    max_properties: Option<u64>,
}

impl SchemaDocument {
    fn apply_object_shape(&mut self, shape: RootObject) {
        self.additional_properties = shape.additional_properties;
        self.additional_properties_schema = shape.additional_properties_schema;
        self.min_properties = shape.min_properties;
        self.max_properties = shape.max_properties;
    }
}

fn read_attributes(node: &mut SchemaNode, schema: &Map<String, Value>) {
    node.description = text(schema, "description");
    node.pattern = text(schema, "pattern");
    node.format = text(schema, "format");
    node.min_length = count(schema, "minLength");
    node.max_length = count(schema, "maxLength");
    node.min_items = count(schema, "minItems");
    node.max_items = count(schema, "maxItems");
    node.unique_items = schema.get("uniqueItems").and_then(Value::as_bool).unwrap_or(false);

    (node.minimum, node.exclusive_minimum) = normalize_bound(number(schema, "minimum"), schema.get("exclusiveMinimum"));
    (node.maximum, node.exclusive_maximum) = normalize_bound(number(schema, "maximum"), schema.get("exclusiveMaximum"));

    node.default_value = schema.get("default").map(raw_text);
    node.const_value = schema.get("const").map(raw_text);
    node.examples = schema.get("examples").map(raw_text).unwrap_or_default();
    node.enum_values = schema
        .get("enum")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
}

/// An untyped root still reads as an object when it carries object keywords
fn has_object_shape(schema: &Map<String, Value>) -> bool {
    ["properties", "additionalProperties", "if", "then", "else"]
        .iter()
        .any(|key| schema.contains_key(*key))
}

fn text(schema: &Map<String, Value>, key: &str) -> String {
    schema
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn count(schema: &Map<String, Value>, key: &str) -> Option<u64> {
    schema.get(key).and_then(Value::as_u64)
}

fn number(schema: &Map<String, Value>, key: &str) -> Option<Number> {
    match schema.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// Annotation values are kept as pretty JSON text for editing
fn raw_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn type_label(found: &Value) -> String {
    match found {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse one schema into a node
pub fn parse_schema(value: &Value, ctx: ParseContext, ids: &mut IdGenerator) -> Parsed<SchemaNode> {
    let mut parser = Parser::new();
    let node = parser.parse_node(value, ctx, "", ids);
    Parsed {
        value: node,
        warnings: parser.into_warnings(),
    }
}

/// Parse a whole document, allocating identities from `ids`
pub fn parse_document(value: &Value, ids: IdGenerator) -> ParseResult<Parsed<SchemaDocument>> {
    let mut parser = Parser::new();
    let doc = parser.parse_document(value, ids)?;
    Ok(Parsed {
        value: doc,
        warnings: parser.into_warnings(),
    })
}

/// Parse document text; syntax errors surface as [`ParseError::Json`]
pub fn parse_document_str(source: &str, ids: IdGenerator) -> ParseResult<Parsed<SchemaDocument>> {
    let value: Value = serde_json::from_str(source)?;
    parse_document(&value, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Parsed<SchemaNode> {
        parse_schema(&value, ParseContext::default(), &mut IdGenerator::new())
    }

    #[test]
    fn test_kind_inference_precedence() {
        let cases = [
            (json!({"$ref": "#/$defs/A", "type": "object"}), Kind::Ref),
            (json!({"type": "string", "oneOf": []}), Kind::OneOf),
            (json!({"allOf": [], "anyOf": []}), Kind::AllOf),
            (json!({"not": {}}), Kind::Not),
            (json!({"type": "integer"}), Kind::Integer),
            (json!({"properties": {}}), Kind::Object),
            (json!({"if": {"type": "object"}}), Kind::Object),
        ];

        for (schema, expected) in cases {
            assert_eq!(parse(schema.clone()).value.kind, expected, "{}", schema);
        }
    }

    #[test]
    fn test_untyped_schema_falls_back_to_object_with_warning() {
        let parsed = parse(json!({"description": "anything"}));
        assert_eq!(parsed.value.kind, Kind::Object);
        assert!(parsed.value.properties.is_empty());
        assert_eq!(parsed.warnings, vec![ParseWarning::Untyped { path: String::new() }]);

        let parsed = parse(json!({"type": ["string", "null"]}));
        assert_eq!(parsed.value.kind, Kind::Object);
        assert!(matches!(parsed.warnings[0], ParseWarning::UnknownType { .. }));
    }

    #[test]
    fn test_normalize_bound_forms() {
        let five = Some(Number::from(5));
        assert_eq!(normalize_bound(five.clone(), Some(&json!(true))), (None, five.clone()));
        assert_eq!(normalize_bound(five.clone(), Some(&json!(false))), (five.clone(), None));
        assert_eq!(normalize_bound(five.clone(), None), (five.clone(), None));
        assert_eq!(
            normalize_bound(five, Some(&json!(7))),
            (None, Some(Number::from(7)))
        );
    }

    #[test]
    fn test_properties_are_named_and_marked_required() {
        let parsed = parse(json!({
            "type": "object",
            "properties": {
                "id": {"type": "integer"},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["id"]
        }));

        let node = parsed.value;
        assert_eq!(node.properties.len(), 2);
        assert_eq!(node.properties[0].name, "id");
        assert!(node.properties[0].required);
        assert!(!node.properties[1].required);
        assert_eq!(node.properties[1].items.as_deref().unwrap().kind, Kind::String);
    }

    #[test]
    fn test_missing_items_substitutes_default() {
        let parsed = parse(json!({"type": "array"}));
        assert_eq!(parsed.value.items.as_deref().unwrap().kind, Kind::String);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::MissingItems { path: "items".to_string() }]
        );
    }

    #[test]
    fn test_conditionals_attach_to_any_kind() {
        let parsed = parse(json!({
            "type": "string",
            "if": {"maxLength": 3},
            "then": {"pattern": "^[a-z]+$"}
        }));

        let node = parsed.value;
        assert!(node.if_schema.is_some());
        assert!(node.then_schema.is_some());
        assert!(node.else_schema.is_none());
    }

    #[test]
    fn test_annotations_kept_as_text() {
        let parsed = parse(json!({"type": "string", "default": "x", "examples": ["a", "b"]}));
        assert_eq!(parsed.value.default_value.as_deref(), Some("\"x\""));
        assert!(parsed.value.examples.contains("\"a\""));
    }

    #[test]
    fn test_function_envelope() {
        let doc = parse_document(
            &json!({
                "type": "function",
                "function": {
                    "name": "get_weather",
                    "description": "Look up the weather",
                    "parameters": {
                        "type": "object",
                        "properties": {"city": {"type": "string"}},
                        "required": ["city"]
                    }
                }
            }),
            IdGenerator::new(),
        )
        .unwrap()
        .value;

        assert_eq!(doc.root_kind, Kind::Function);
        assert_eq!(doc.title, "get_weather");
        assert_eq!(doc.description, "Look up the weather");
        assert_eq!(doc.root.children()[0].name, "city");
        assert!(doc.root.children()[0].required);
    }

    #[test]
    fn test_unknown_root_type_recovers() {
        let parsed = parse_document(&json!({"type": "tuple"}), IdGenerator::new()).unwrap();
        assert_eq!(parsed.value.root_kind, Kind::Object);
        assert_eq!(parsed.value.root, RootSlot::Children(Vec::new()));
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnknownRootType { found: "tuple".to_string() }]
        );
    }

    #[test]
    fn test_untyped_root_warns_unless_object_shaped() {
        for source in [json!({}), json!({"description": "x", "minLength": 2})] {
            let parsed = parse_document(&source, IdGenerator::new()).unwrap();
            assert_eq!(parsed.value.root_kind, Kind::Object);
            assert_eq!(
                parsed.warnings,
                vec![ParseWarning::UntypedRoot],
                "no warning for {}",
                source
            );
        }

        for source in [
            json!({"properties": {"a": {"type": "string"}}}),
            json!({"additionalProperties": false}),
            json!({"if": {"type": "object"}}),
        ] {
            let parsed = parse_document(&source, IdGenerator::new()).unwrap();
            assert_eq!(parsed.value.root_kind, Kind::Object);
            assert!(parsed.warnings.is_empty(), "unexpected warning for {}", source);
        }
    }

    #[test]
    fn test_object_root_keeps_properties_and_mirrored_attributes() {
        let doc = parse_document(
            &json!({
                "type": "object",
                "properties": {"a": {"type": "string"}},
                "additionalProperties": false,
                "minProperties": 1
            }),
            IdGenerator::new(),
        )
        .unwrap()
        .value;

        assert_eq!(doc.root.children()[0].name, "a");
        assert_eq!(doc.additional_properties, AdditionalPropertiesMode::Disallow);
        assert_eq!(doc.min_properties, Some(1));
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let err = parse_document(&json!([1, 2]), IdGenerator::new()).unwrap_err();
        assert_eq!(err, ParseError::invalid_shape("object", "array"));

        let err = parse_document_str("{ nope", IdGenerator::new()).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_dangling_reference_warns() {
        let parsed = parse_document(
            &json!({
                "type": "object",
                "properties": {
                    "home": {"$ref": "#/$defs/Address"},
                    "work": {"$ref": "#/$defs/Office"}
                },
                "$defs": {"Address": {"type": "object"}}
            }),
            IdGenerator::new(),
        )
        .unwrap();

        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnresolvedRef {
                path: "properties.work".to_string(),
                reference: "#/$defs/Office".to_string(),
            }]
        );
        assert!(parsed.value.definitions[0].is_definition);
    }

    #[test]
    fn test_ids_continue_from_counter() {
        let parsed = parse_document(
            &json!({"type": "object", "properties": {"a": {"type": "string"}}}),
            IdGenerator::starting_at(40),
        )
        .unwrap();

        assert_eq!(parsed.value.root.children()[0].id, "item_40");
        assert_eq!(parsed.value.ids.peek(), 41);
    }
}
