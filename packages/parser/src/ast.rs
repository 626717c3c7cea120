use crate::factory;
use crate::id_generator::IdGenerator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Kind {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "oneOf")]
    OneOf,
    #[serde(rename = "allOf")]
    AllOf,
    #[serde(rename = "anyOf")]
    AnyOf,
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "$ref", alias = "ref")]
    Ref,
    /// OpenAI-style callable signature; only valid as a document root
    #[serde(rename = "function")]
    Function,
}

impl Kind {
    pub const ALL: [Kind; 13] = [
        Kind::String,
        Kind::Number,
        Kind::Integer,
        Kind::Boolean,
        Kind::Null,
        Kind::Object,
        Kind::Array,
        Kind::OneOf,
        Kind::AllOf,
        Kind::AnyOf,
        Kind::Not,
        Kind::Ref,
        Kind::Function,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::Boolean => "boolean",
            Kind::Null => "null",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::OneOf => "oneOf",
            Kind::AllOf => "allOf",
            Kind::AnyOf => "anyOf",
            Kind::Not => "not",
            Kind::Ref => "$ref",
            Kind::Function => "function",
        }
    }

    /// Value of the JSON Schema `type` keyword, if this kind emits one
    pub fn type_keyword(&self) -> Option<&'static str> {
        match self {
            Kind::String
            | Kind::Number
            | Kind::Integer
            | Kind::Boolean
            | Kind::Null
            | Kind::Object
            | Kind::Array => Some(self.as_str()),
            _ => None,
        }
    }

    /// Kind named by a JSON Schema `type` keyword
    pub fn from_type_keyword(keyword: &str) -> Option<Kind> {
        match keyword {
            "string" => Some(Kind::String),
            "number" => Some(Kind::Number),
            "integer" => Some(Kind::Integer),
            "boolean" => Some(Kind::Boolean),
            "null" => Some(Kind::Null),
            "object" => Some(Kind::Object),
            "array" => Some(Kind::Array),
            _ => None,
        }
    }

    /// oneOf/allOf/anyOf/not
    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::OneOf | Kind::AllOf | Kind::AnyOf | Kind::Not)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Kind::String | Kind::Number | Kind::Integer | Kind::Boolean | Kind::Null
        )
    }

    /// Keyword wrapping the option list of a oneOf/allOf/anyOf node
    pub fn options_keyword(&self) -> Option<&'static str> {
        match self {
            Kind::OneOf | Kind::AllOf | Kind::AnyOf => Some(self.as_str()),
            _ => None,
        }
    }

    /// Whether a document root of this kind holds a sequence of children
    pub fn has_sequence_root(&self) -> bool {
        matches!(
            self,
            Kind::Object | Kind::OneOf | Kind::AllOf | Kind::AnyOf | Kind::Function
        )
    }

    /// Sequence slot that holds this kind's children, if any
    pub fn child_sequence(&self) -> Option<SeqSlot> {
        match self {
            Kind::Object => Some(SeqSlot::Properties),
            Kind::OneOf => Some(SeqSlot::OneOf),
            Kind::AllOf => Some(SeqSlot::AllOf),
            Kind::AnyOf => Some(SeqSlot::AnyOf),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ref" => Ok(Kind::Ref),
            other => Kind::ALL
                .iter()
                .copied()
                .find(|k| k.as_str() == other)
                .ok_or_else(|| format!("unknown kind '{}'", other)),
        }
    }
}

/// How an object treats properties it does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdditionalPropertiesMode {
    #[default]
    Allow,
    Disallow,
    Schema,
}

impl FromStr for AdditionalPropertiesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Self::Allow),
            "disallow" => Ok(Self::Disallow),
            "schema" => Ok(Self::Schema),
            other => Err(format!("unknown additional properties mode '{}'", other)),
        }
    }
}

/// One editable unit of a schema
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Kind,
    #[serde(default)]
    pub required: bool,

    // Free-form annotations, stored as raw text
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<String>,
    #[serde(default)]
    pub examples: String,

    // string
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<Value>,

    // number / integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(
        default,
        deserialize_with = "numeric_bound",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclusive_minimum: Option<Number>,
    #[serde(
        default,
        deserialize_with = "numeric_bound",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclusive_maximum: Option<Number>,

    // array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default)]
    pub unique_items: bool,

    // object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(rename = "additionalPropertiesType", default)]
    pub additional_properties: AdditionalPropertiesMode,
    #[serde(default)]
    pub additional_properties_schema: Option<Box<SchemaNode>>,

    // Structural children
    #[serde(default)]
    pub properties: Vec<SchemaNode>,
    #[serde(default)]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default)]
    pub one_of_schemas: Vec<SchemaNode>,
    #[serde(default)]
    pub all_of_schemas: Vec<SchemaNode>,
    #[serde(default)]
    pub any_of_schemas: Vec<SchemaNode>,
    #[serde(default)]
    pub not_schema: Option<Box<SchemaNode>>,

    // Conditional children (any kind)
    #[serde(default)]
    pub if_schema: Option<Box<SchemaNode>>,
    #[serde(default)]
    pub then_schema: Option<Box<SchemaNode>>,
    #[serde(default)]
    pub else_schema: Option<Box<SchemaNode>>,

    #[serde(rename = "ref", default)]
    pub reference: String,

    // Presentation state, never emitted into the schema
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default)]
    pub is_conditional_collapsed: bool,
    #[serde(default)]
    pub is_validation_collapsed: bool,

    #[serde(default)]
    pub is_definition: bool,
}

/// Boolean exclusive flags are folded into numeric bounds by [`upgrade_stored_bounds`]
/// before loading; a flag that still reaches here loads as unset.
fn numeric_bound<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(n),
        _ => None,
    })
}

/// Keys under which persisted state nests node lists or single nodes
const STORED_CHILD_KEYS: [&str; 12] = [
    "schemaDefinition",
    "definitions",
    "properties",
    "items",
    "oneOfSchemas",
    "allOfSchemas",
    "anyOfSchemas",
    "notSchema",
    "additionalPropertiesSchema",
    "ifSchema",
    "thenSchema",
    "elseSchema",
];

/// Rewrite boolean `exclusiveMinimum`/`exclusiveMaximum` flags in persisted
/// state into numeric bounds, taking the paired inclusive value.
///
/// `{"minimum": 3, "exclusiveMinimum": true}` becomes `{"exclusiveMinimum": 3}`;
/// a `false` flag is dropped and the inclusive bound kept.
pub fn upgrade_stored_bounds(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(upgrade_stored_bounds),
        Value::Object(map) => {
            fold_boolean_bound(map, "minimum", "exclusiveMinimum");
            fold_boolean_bound(map, "maximum", "exclusiveMaximum");
            for key in STORED_CHILD_KEYS {
                if let Some(child) = map.get_mut(key) {
                    upgrade_stored_bounds(child);
                }
            }
        }
        _ => {}
    }
}

fn fold_boolean_bound(map: &mut Map<String, Value>, inclusive_key: &str, exclusive_key: &str) {
    let Some(flag @ Value::Bool(_)) = map.get(exclusive_key) else {
        return;
    };
    let inclusive = match map.get(inclusive_key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    };
    let (inclusive, exclusive) = crate::parser::normalize_bound(inclusive, Some(flag));

    for (key, bound) in [(inclusive_key, inclusive), (exclusive_key, exclusive)] {
        match bound {
            Some(n) => map.insert(key.to_string(), Value::Number(n)),
            None => map.remove(key),
        };
    }
}

/// Sequence-valued child slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeqSlot {
    /// Root children of object/oneOf/allOf/anyOf/function documents
    #[serde(rename = "schemaDefinition")]
    Root,
    #[serde(rename = "definitions")]
    Definitions,
    #[serde(rename = "properties")]
    Properties,
    #[serde(rename = "oneOfSchemas")]
    OneOf,
    #[serde(rename = "allOfSchemas")]
    AllOf,
    #[serde(rename = "anyOfSchemas")]
    AnyOf,
}

/// Single-node child slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SingleSlot {
    /// Root node of array/not/primitive documents
    #[serde(rename = "schemaDefinition")]
    Root,
    #[serde(rename = "items")]
    Items,
    #[serde(rename = "notSchema")]
    Not,
    #[serde(rename = "additionalPropertiesSchema")]
    AdditionalProperties,
    #[serde(rename = "ifSchema")]
    If,
    #[serde(rename = "thenSchema")]
    Then,
    #[serde(rename = "elseSchema")]
    Else,
}

impl SingleSlot {
    /// Slots whose content may be removed without breaking the owner's shape
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            SingleSlot::AdditionalProperties | SingleSlot::If | SingleSlot::Then | SingleSlot::Else
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Sequence(SeqSlot),
    Single(SingleSlot),
}

/// Child slots of a node, in search order
pub const NODE_SLOTS: [Slot; 10] = [
    Slot::Sequence(SeqSlot::Properties),
    Slot::Single(SingleSlot::Items),
    Slot::Sequence(SeqSlot::OneOf),
    Slot::Sequence(SeqSlot::AllOf),
    Slot::Sequence(SeqSlot::AnyOf),
    Slot::Single(SingleSlot::Not),
    Slot::Single(SingleSlot::AdditionalProperties),
    Slot::Single(SingleSlot::If),
    Slot::Single(SingleSlot::Then),
    Slot::Single(SingleSlot::Else),
];

/// Top-level slots of a document, in search order
pub const DOCUMENT_SLOTS: [Slot; 7] = [
    Slot::Single(SingleSlot::AdditionalProperties),
    Slot::Single(SingleSlot::If),
    Slot::Single(SingleSlot::Then),
    Slot::Single(SingleSlot::Else),
    Slot::Sequence(SeqSlot::Root),
    Slot::Single(SingleSlot::Root),
    Slot::Sequence(SeqSlot::Definitions),
];

/// Uniform access to the child slots of nodes and documents
pub trait Slots {
    fn sequence(&self, slot: SeqSlot) -> Option<&Vec<SchemaNode>>;

    fn sequence_mut(&mut self, slot: SeqSlot) -> Option<&mut Vec<SchemaNode>>;

    fn single(&self, slot: SingleSlot) -> Option<&SchemaNode>;

    fn single_mut(&mut self, slot: SingleSlot) -> Option<&mut SchemaNode>;

    /// The `Option` holding an optional single child, for insertion or removal
    fn branch_mut(&mut self, slot: SingleSlot) -> Option<&mut Option<Box<SchemaNode>>>;
}

impl Slots for SchemaNode {
    fn sequence(&self, slot: SeqSlot) -> Option<&Vec<SchemaNode>> {
        match slot {
            SeqSlot::Properties => Some(&self.properties),
            SeqSlot::OneOf => Some(&self.one_of_schemas),
            SeqSlot::AllOf => Some(&self.all_of_schemas),
            SeqSlot::AnyOf => Some(&self.any_of_schemas),
            SeqSlot::Root | SeqSlot::Definitions => None,
        }
    }

    fn sequence_mut(&mut self, slot: SeqSlot) -> Option<&mut Vec<SchemaNode>> {
        match slot {
            SeqSlot::Properties => Some(&mut self.properties),
            SeqSlot::OneOf => Some(&mut self.one_of_schemas),
            SeqSlot::AllOf => Some(&mut self.all_of_schemas),
            SeqSlot::AnyOf => Some(&mut self.any_of_schemas),
            SeqSlot::Root | SeqSlot::Definitions => None,
        }
    }

    fn single(&self, slot: SingleSlot) -> Option<&SchemaNode> {
        match slot {
            SingleSlot::Items => self.items.as_deref(),
            SingleSlot::Not => self.not_schema.as_deref(),
            SingleSlot::AdditionalProperties => self.additional_properties_schema.as_deref(),
            SingleSlot::If => self.if_schema.as_deref(),
            SingleSlot::Then => self.then_schema.as_deref(),
            SingleSlot::Else => self.else_schema.as_deref(),
            SingleSlot::Root => None,
        }
    }

    fn single_mut(&mut self, slot: SingleSlot) -> Option<&mut SchemaNode> {
        self.branch_mut(slot).and_then(|b| b.as_deref_mut())
    }

    fn branch_mut(&mut self, slot: SingleSlot) -> Option<&mut Option<Box<SchemaNode>>> {
        match slot {
            SingleSlot::Items => Some(&mut self.items),
            SingleSlot::Not => Some(&mut self.not_schema),
            SingleSlot::AdditionalProperties => Some(&mut self.additional_properties_schema),
            SingleSlot::If => Some(&mut self.if_schema),
            SingleSlot::Then => Some(&mut self.then_schema),
            SingleSlot::Else => Some(&mut self.else_schema),
            SingleSlot::Root => None,
        }
    }
}

impl SchemaNode {
    /// Default node (kind `string`) with no identity; identities come from the factory
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn named(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Direct children across every slot, in search order
    pub fn children(&self) -> impl Iterator<Item = &SchemaNode> {
        self.properties
            .iter()
            .chain(self.items.as_deref())
            .chain(self.one_of_schemas.iter())
            .chain(self.all_of_schemas.iter())
            .chain(self.any_of_schemas.iter())
            .chain(self.not_schema.as_deref())
            .chain(self.additional_properties_schema.as_deref())
            .chain(self.if_schema.as_deref())
            .chain(self.then_schema.as_deref())
            .chain(self.else_schema.as_deref())
    }
}

/// Content of a document's root slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RootSlot {
    Children(Vec<SchemaNode>),
    Single(Box<SchemaNode>),
}

impl Default for RootSlot {
    fn default() -> Self {
        RootSlot::Children(Vec::new())
    }
}

impl RootSlot {
    /// Fresh root slot for a root kind
    pub fn for_kind(kind: Kind, ids: &mut IdGenerator) -> Self {
        if kind.has_sequence_root() {
            RootSlot::Children(Vec::new())
        } else if kind.is_primitive() {
            RootSlot::Single(Box::new(factory::create_node(ids, SchemaNode::new(kind))))
        } else {
            // array (item schema) and not (negated schema)
            RootSlot::Single(Box::new(factory::default_node(ids)))
        }
    }

    pub fn children(&self) -> &[SchemaNode] {
        match self {
            RootSlot::Children(children) => children,
            RootSlot::Single(_) => &[],
        }
    }

    pub fn single(&self) -> Option<&SchemaNode> {
        match self {
            RootSlot::Single(node) => Some(node),
            RootSlot::Children(_) => None,
        }
    }
}

/// One open schema ("tab")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "rootSchemaType", default = "object_kind")]
    pub root_kind: Kind,
    #[serde(rename = "includeSchemaProperty", default = "enabled")]
    pub include_schema_dialect: bool,
    #[serde(rename = "schemaDefinition", default)]
    pub root: RootSlot,
    #[serde(default)]
    pub definitions: Vec<SchemaNode>,
    #[serde(rename = "nextId", default)]
    pub ids: IdGenerator,

    // The root behaves like an implicit object node
    #[serde(rename = "additionalPropertiesType", default)]
    pub additional_properties: AdditionalPropertiesMode,
    #[serde(default)]
    pub additional_properties_schema: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default)]
    pub if_schema: Option<Box<SchemaNode>>,
    #[serde(default)]
    pub then_schema: Option<Box<SchemaNode>>,
    #[serde(default)]
    pub else_schema: Option<Box<SchemaNode>>,

    #[serde(rename = "isRootValidationCollapsed", default)]
    pub is_validation_collapsed: bool,
    #[serde(default)]
    pub is_conditional_collapsed: bool,
}

fn object_kind() -> Kind {
    Kind::Object
}

fn enabled() -> bool {
    true
}

pub const DEFAULT_TITLE: &str = "New Schema";
pub const IMPORTED_TITLE: &str = "Imported Schema";
pub const DEFAULT_DESCRIPTION: &str = "A schema generated by the JSON Schema Builder";

impl SchemaDocument {
    /// Load a persisted document, upgrading boolean exclusive bounds first
    pub fn from_stored(mut value: Value) -> serde_json::Result<Self> {
        upgrade_stored_bounds(&mut value);
        serde_json::from_value(value)
    }

    pub fn new() -> Self {
        Self::with_ids(IdGenerator::new())
    }

    /// Empty document (no title or description) that allocates from `ids`
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            root_kind: Kind::Object,
            include_schema_dialect: true,
            root: RootSlot::default(),
            definitions: Vec::new(),
            ids,
            additional_properties: AdditionalPropertiesMode::Allow,
            additional_properties_schema: None,
            min_properties: None,
            max_properties: None,
            if_schema: None,
            then_schema: None,
            else_schema: None,
            is_validation_collapsed: false,
            is_conditional_collapsed: false,
        }
    }

    /// Replace the root slot with a fresh one for the current root kind
    pub fn reset_root(&mut self) {
        self.root = RootSlot::for_kind(self.root_kind, &mut self.ids);
    }

    /// Definition by name
    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

impl Default for SchemaDocument {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            ..Self::new()
        }
    }
}

impl Slots for SchemaDocument {
    fn sequence(&self, slot: SeqSlot) -> Option<&Vec<SchemaNode>> {
        match (slot, &self.root) {
            (SeqSlot::Root, RootSlot::Children(children)) => Some(children),
            (SeqSlot::Definitions, _) => Some(&self.definitions),
            _ => None,
        }
    }

    fn sequence_mut(&mut self, slot: SeqSlot) -> Option<&mut Vec<SchemaNode>> {
        match (slot, &mut self.root) {
            (SeqSlot::Root, RootSlot::Children(children)) => Some(children),
            (SeqSlot::Definitions, _) => Some(&mut self.definitions),
            _ => None,
        }
    }

    fn single(&self, slot: SingleSlot) -> Option<&SchemaNode> {
        match slot {
            SingleSlot::Root => self.root.single(),
            SingleSlot::AdditionalProperties => self.additional_properties_schema.as_deref(),
            SingleSlot::If => self.if_schema.as_deref(),
            SingleSlot::Then => self.then_schema.as_deref(),
            SingleSlot::Else => self.else_schema.as_deref(),
            SingleSlot::Items | SingleSlot::Not => None,
        }
    }

    fn single_mut(&mut self, slot: SingleSlot) -> Option<&mut SchemaNode> {
        match slot {
            SingleSlot::Root => match &mut self.root {
                RootSlot::Single(node) => Some(node),
                RootSlot::Children(_) => None,
            },
            other => self.branch_mut(other).and_then(|b| b.as_deref_mut()),
        }
    }

    fn branch_mut(&mut self, slot: SingleSlot) -> Option<&mut Option<Box<SchemaNode>>> {
        match slot {
            SingleSlot::AdditionalProperties => Some(&mut self.additional_properties_schema),
            SingleSlot::If => Some(&mut self.if_schema),
            SingleSlot::Then => Some(&mut self.then_schema),
            SingleSlot::Else => Some(&mut self.else_schema),
            SingleSlot::Root | SingleSlot::Items | SingleSlot::Not => None,
        }
    }
}
