//! # Schema Mutations
//!
//! High-level editing operations on a schema document.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each mutation is one user action on the tree
//! 2. **Validated**: Structural constraints are checked before anything changes
//! 3. **Stale-tolerant**: A mutation naming an identity that no longer exists
//!    is a no-op, not an error
//!
//! ## Mutation Semantics
//!
//! ### Reorder
//! - Only within one parent sequence; anything else is rejected
//! - The dragged node lands at the target's index (taken before removal)
//!
//! ### UpdateAttribute
//! - Setting a bound clears its exclusive/inclusive counterpart
//! - Changing the kind resets all structural children for the new kind
//!
//! ### Delete
//! - Removes the node and all descendants from its parent sequence
//! - Optional single sub-schemas (`if`/`then`/`else`, additional
//!   properties) can be removed; required ones cannot

use crate::locate::{self, Edge};
use schemaforge_parser::ast::*;
use schemaforge_parser::error::describe;
use schemaforge_parser::factory;
use schemaforge_parser::{IdGenerator, ParseContext, ParseError, Parser};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Editing operations (the renderer's structural action tuples)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Mutation {
    /// Append a default node to a sequence slot; `parent_id: None` targets the document
    AddChild {
        parent_id: Option<String>,
        slot: SeqSlot,
    },

    Delete {
        node_id: String,
    },

    /// Swap with the adjacent sibling
    Move {
        node_id: String,
        direction: Direction,
    },

    /// Drag-and-drop within one parent sequence
    Reorder {
        dragged_id: String,
        target_id: String,
    },

    UpdateAttribute {
        node_id: String,
        update: AttributeUpdate,
    },

    UpdateDocument {
        update: DocumentUpdate,
    },

    /// Add or remove an `if`/`then`/`else` branch
    SetConditional {
        target: Option<String>,
        branch: Branch,
        present: bool,
    },

    /// Paste schema JSON into a node or into the root slot
    ImportInto {
        target: Option<String>,
        source: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    If,
    Then,
    Else,
}

impl Branch {
    pub fn slot(&self) -> SingleSlot {
        match self {
            Branch::If => SingleSlot::If,
            Branch::Then => SingleSlot::Then,
            Branch::Else => SingleSlot::Else,
        }
    }
}

/// A single scalar attribute change on a node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
pub enum AttributeUpdate {
    Name(String),
    Kind(Kind),
    Required(bool),
    Description(String),
    DefaultValue(Option<String>),
    ConstValue(Option<String>),
    Examples(String),
    Pattern(String),
    Format(String),
    MinLength(Option<u64>),
    MaxLength(Option<u64>),
    Enum(Vec<Value>),
    Minimum(Option<Number>),
    Maximum(Option<Number>),
    ExclusiveMinimum(Option<Number>),
    ExclusiveMaximum(Option<Number>),
    MinItems(Option<u64>),
    MaxItems(Option<u64>),
    UniqueItems(bool),
    MinProperties(Option<u64>),
    MaxProperties(Option<u64>),
    AdditionalProperties(AdditionalPropertiesMode),
    Reference(String),
    Collapsed(bool),
    ConditionalCollapsed(bool),
    ValidationCollapsed(bool),
}

/// A change to the document itself rather than one of its nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum DocumentUpdate {
    Title(String),
    Description(String),
    IncludeSchemaDialect(bool),
    RootKind(Kind),
    MinProperties(Option<u64>),
    MaxProperties(Option<u64>),
    AdditionalProperties(AdditionalPropertiesMode),
    ValidationCollapsed(bool),
    ConditionalCollapsed(bool),
    /// Start over with an empty document of the same root kind
    Clear,
}

/// What applying a mutation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MutationOutcome {
    Applied {
        /// The tree shape changed and forms need a rebuild
        structural: bool,
        /// Identity of a node the mutation created
        created: Option<String>,
    },
    Noop {
        reason: String,
    },
}

impl MutationOutcome {
    fn changed(structural: bool) -> Self {
        Self::Applied {
            structural,
            created: None,
        }
    }

    fn created(id: String) -> Self {
        Self::Applied {
            structural: true,
            created: Some(id),
        }
    }

    fn noop(reason: impl Into<String>) -> Self {
        Self::Noop { reason: reason.into() }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Applied { structural: true, .. })
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::Applied { created, .. } => created.as_deref(),
            Self::Noop { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Can only reorder items at the same level.")]
    CrossLevelReorder,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidAttribute { name: String, reason: String },

    #[error("Import failed: {0}")]
    Import(#[from] ParseError),
}

impl MutationError {
    fn invalid_attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type MutationResult = Result<MutationOutcome, MutationError>;

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut SchemaDocument) -> MutationResult {
        // Validate first
        self.validate(doc)?;

        let outcome = match self {
            Mutation::AddChild { parent_id, slot } => Self::apply_add_child(doc, parent_id.as_deref(), *slot),
            Mutation::Delete { node_id } => Self::apply_delete(doc, node_id),
            Mutation::Move { node_id, direction } => Self::apply_move(doc, node_id, *direction),
            Mutation::Reorder {
                dragged_id,
                target_id,
            } => Self::apply_reorder(doc, dragged_id, target_id),
            Mutation::UpdateAttribute { node_id, update } => Self::apply_update_attribute(doc, node_id, update),
            Mutation::UpdateDocument { update } => Self::apply_update_document(doc, update),
            Mutation::SetConditional {
                target,
                branch,
                present,
            } => Self::apply_set_conditional(doc, target.as_deref(), *branch, *present),
            Mutation::ImportInto { target, source } => Self::apply_import(doc, target.as_deref(), source),
        }?;

        match &outcome {
            MutationOutcome::Applied { structural, .. } => debug!(mutation = ?self, structural, "applied"),
            MutationOutcome::Noop { reason } => debug!(mutation = ?self, %reason, "no-op"),
        }
        Ok(outcome)
    }

    /// Check structural constraints without changing anything
    pub fn validate(&self, doc: &SchemaDocument) -> Result<(), MutationError> {
        match self {
            Mutation::AddChild { parent_id: None, slot } => match slot {
                SeqSlot::Definitions => Ok(()),
                SeqSlot::Root if doc.root_kind.has_sequence_root() => Ok(()),
                SeqSlot::Root => Err(MutationError::InvalidStructure(format!(
                    "a '{}' root holds a single schema",
                    doc.root_kind
                ))),
                other => Err(MutationError::InvalidStructure(format!(
                    "the document has no '{:?}' slot",
                    other
                ))),
            },

            Mutation::AddChild {
                parent_id: Some(id),
                slot,
            } => match locate::locate(doc, id) {
                Some(found) if found.node.kind.child_sequence() != Some(*slot) => {
                    Err(MutationError::InvalidStructure(format!(
                        "a '{}' node cannot hold '{:?}' children",
                        found.node.kind, slot
                    )))
                }
                _ => Ok(()),
            },

            Mutation::Reorder {
                dragged_id,
                target_id,
            } => {
                let dragged = locate::find_location(doc, dragged_id);
                let target = locate::find_location(doc, target_id);
                match (dragged, target) {
                    (Some(dragged), Some(target))
                        if dragged_id != target_id && !dragged.shares_sequence_with(&target) =>
                    {
                        warn!(%dragged_id, %target_id, "rejected cross-level reorder");
                        Err(MutationError::CrossLevelReorder)
                    }
                    _ => Ok(()),
                }
            }

            Mutation::UpdateAttribute { node_id, update } => match update {
                AttributeUpdate::Kind(Kind::Function) => Err(MutationError::invalid_attribute(
                    "type",
                    "'function' is only valid as a root kind",
                )),
                AttributeUpdate::AdditionalProperties(_) => match locate::locate(doc, node_id) {
                    Some(found) if found.node.kind != Kind::Object => Err(MutationError::invalid_attribute(
                        "additionalPropertiesType",
                        format!("'{}' nodes have no properties", found.node.kind),
                    )),
                    _ => Ok(()),
                },
                _ => Ok(()),
            },

            Mutation::UpdateDocument {
                update: DocumentUpdate::RootKind(Kind::Ref),
            } => Err(MutationError::invalid_attribute(
                "rootSchemaType",
                "a document root cannot be a reference",
            )),

            _ => Ok(()),
        }
    }

    fn apply_add_child(doc: &mut SchemaDocument, parent_id: Option<&str>, slot: SeqSlot) -> MutationResult {
        let owner = match parent_id {
            None => Vec::new(),
            Some(id) => match locate::find_location(doc, id) {
                Some(location) => location.path(),
                None => return Ok(MutationOutcome::noop(format!("node {} not found", id))),
            },
        };

        let child = if parent_id.is_none() && slot == SeqSlot::Definitions {
            let template = SchemaNode {
                name: format!("NewDefinition{}", doc.definitions.len() + 1),
                kind: Kind::Object,
                is_definition: true,
                ..Default::default()
            };
            factory::create_node(&mut doc.ids, template)
        } else {
            factory::default_node(&mut doc.ids)
        };
        let id = child.id.clone();

        let children = locate::sequence_mut(doc, &owner, slot)
            .ok_or_else(|| MutationError::InvalidStructure(format!("no '{:?}' slot to add to", slot)))?;
        children.push(child);

        Ok(MutationOutcome::created(id))
    }

    fn apply_delete(doc: &mut SchemaDocument, node_id: &str) -> MutationResult {
        let Some(location) = locate::find_location(doc, node_id) else {
            return Ok(MutationOutcome::noop(format!("node {} not found", node_id)));
        };

        match location.edge {
            Edge::Seq(slot, index) => {
                let children = locate::sequence_mut(doc, &location.owner, slot)
                    .ok_or_else(|| MutationError::InvalidStructure("parent sequence vanished".to_string()))?;
                children.remove(index);
            }
            Edge::Single(slot) if slot.is_optional() => {
                if let Some(holder) = locate::branch_mut(doc, &location.owner, slot) {
                    *holder = None;
                }
                if slot == SingleSlot::AdditionalProperties {
                    // nothing left to validate extra properties against
                    match locate::node_at_mut(doc, &location.owner) {
                        Some(owner) => owner.additional_properties = AdditionalPropertiesMode::Allow,
                        None => doc.additional_properties = AdditionalPropertiesMode::Allow,
                    }
                }
            }
            Edge::Single(slot) => {
                return Ok(MutationOutcome::noop(format!("'{:?}' always holds a schema", slot)));
            }
        }

        Ok(MutationOutcome::changed(true))
    }

    fn apply_move(doc: &mut SchemaDocument, node_id: &str, direction: Direction) -> MutationResult {
        let Some(location) = locate::find_location(doc, node_id) else {
            return Ok(MutationOutcome::noop(format!("node {} not found", node_id)));
        };
        let Some((slot, index)) = location.sequence() else {
            return Ok(MutationOutcome::noop("node is not part of a sequence"));
        };

        let children = locate::sequence_mut(doc, &location.owner, slot)
            .ok_or_else(|| MutationError::InvalidStructure("parent sequence vanished".to_string()))?;
        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|i| *i < children.len()),
        };
        let Some(neighbour) = neighbour else {
            return Ok(MutationOutcome::noop("already at the boundary"));
        };

        children.swap(index, neighbour);
        Ok(MutationOutcome::changed(true))
    }

    fn apply_reorder(doc: &mut SchemaDocument, dragged_id: &str, target_id: &str) -> MutationResult {
        if dragged_id == target_id {
            return Ok(MutationOutcome::noop("dropped onto itself"));
        }
        let (Some(dragged), Some(target)) = (
            locate::find_location(doc, dragged_id),
            locate::find_location(doc, target_id),
        ) else {
            return Ok(MutationOutcome::noop("dragged or target node not found"));
        };
        let (Some((slot, from)), Some((_, to))) = (dragged.sequence(), target.sequence()) else {
            return Ok(MutationOutcome::noop("nodes are not part of a sequence"));
        };

        let children = locate::sequence_mut(doc, &dragged.owner, slot)
            .ok_or_else(|| MutationError::InvalidStructure("parent sequence vanished".to_string()))?;
        let node = children.remove(from);
        let to = to.min(children.len());
        children.insert(to, node);

        Ok(MutationOutcome::changed(true))
    }

    fn apply_update_attribute(doc: &mut SchemaDocument, node_id: &str, update: &AttributeUpdate) -> MutationResult {
        let mut ids = doc.ids;
        let Some(node) = locate::node_mut(doc, node_id) else {
            return Ok(MutationOutcome::noop(format!("node {} not found", node_id)));
        };
        let structural = update.apply_to(node, &mut ids)?;
        doc.ids = ids;

        Ok(MutationOutcome::changed(structural))
    }

    fn apply_update_document(doc: &mut SchemaDocument, update: &DocumentUpdate) -> MutationResult {
        let structural = match update {
            DocumentUpdate::Title(title) => {
                doc.title = title.clone();
                false
            }
            DocumentUpdate::Description(description) => {
                doc.description = description.clone();
                false
            }
            DocumentUpdate::IncludeSchemaDialect(include) => {
                doc.include_schema_dialect = *include;
                false
            }
            DocumentUpdate::RootKind(kind) => {
                if *kind == doc.root_kind {
                    return Ok(MutationOutcome::noop("root kind unchanged"));
                }
                let keeps_children = matches!(
                    (doc.root_kind, *kind),
                    (Kind::Object, Kind::Function) | (Kind::Function, Kind::Object)
                );
                doc.root_kind = *kind;
                if !keeps_children {
                    doc.reset_root();
                }
                true
            }
            DocumentUpdate::MinProperties(count) => {
                doc.min_properties = *count;
                false
            }
            DocumentUpdate::MaxProperties(count) => {
                doc.max_properties = *count;
                false
            }
            DocumentUpdate::AdditionalProperties(mode) => {
                doc.additional_properties = *mode;
                let mut ids = doc.ids;
                sync_additional_schema(*mode, &mut doc.additional_properties_schema, &mut ids);
                doc.ids = ids;
                true
            }
            DocumentUpdate::ValidationCollapsed(collapsed) => {
                doc.is_validation_collapsed = *collapsed;
                false
            }
            DocumentUpdate::ConditionalCollapsed(collapsed) => {
                doc.is_conditional_collapsed = *collapsed;
                false
            }
            DocumentUpdate::Clear => {
                let mut fresh = SchemaDocument::with_ids(doc.ids);
                fresh.title = DEFAULT_TITLE.to_string();
                fresh.description = DEFAULT_DESCRIPTION.to_string();
                fresh.root_kind = doc.root_kind;
                fresh.reset_root();
                *doc = fresh;
                true
            }
        };

        Ok(MutationOutcome::changed(structural))
    }

    fn apply_set_conditional(
        doc: &mut SchemaDocument,
        target: Option<&str>,
        branch: Branch,
        present: bool,
    ) -> MutationResult {
        let owner = match target {
            None => Vec::new(),
            Some(id) => match locate::find_location(doc, id) {
                Some(location) => location.path(),
                None => return Ok(MutationOutcome::noop(format!("node {} not found", id))),
            },
        };

        let mut ids = doc.ids;
        let holder = locate::branch_mut(doc, &owner, branch.slot())
            .ok_or_else(|| MutationError::InvalidStructure(format!("no '{:?}' branch here", branch)))?;

        let outcome = match (present, holder.is_some()) {
            (true, false) => {
                let node = factory::node_of_kind(&mut ids, Kind::Object);
                let id = node.id.clone();
                *holder = Some(Box::new(node));
                MutationOutcome::created(id)
            }
            (false, true) => {
                *holder = None;
                MutationOutcome::changed(true)
            }
            _ => MutationOutcome::noop("branch already in the requested state"),
        };
        doc.ids = ids;

        Ok(outcome)
    }

    fn apply_import(doc: &mut SchemaDocument, target: Option<&str>, source: &str) -> MutationResult {
        let value: Value = serde_json::from_str(source).map_err(ParseError::from)?;

        let (owner, kind) = match target {
            None => (Vec::new(), doc.root_kind),
            Some(id) => match locate::locate(doc, id) {
                Some(found) => (found.location.path(), found.node.kind),
                None => return Ok(MutationOutcome::noop(format!("node {} not found", id))),
            },
        };

        // Build everything before touching the tree
        let mut ids = doc.ids;
        let mut parser = Parser::new();
        let incoming = match (kind, &value) {
            (Kind::Object | Kind::Function, Value::Object(schemas)) => Incoming::Append(
                schemas
                    .iter()
                    .map(|(name, schema)| {
                        parser.parse_node(schema, ParseContext::property(name.clone(), false), name, &mut ids)
                    })
                    .collect(),
            ),
            (Kind::OneOf | Kind::AllOf | Kind::AnyOf, Value::Array(options)) => Incoming::Append(
                options
                    .iter()
                    .map(|schema| parser.parse_node(schema, ParseContext::default(), "", &mut ids))
                    .collect(),
            ),
            (Kind::Array | Kind::Not, Value::Object(_)) => {
                Incoming::Replace(parser.parse_node(&value, ParseContext::default(), "", &mut ids))
            }
            (Kind::Object | Kind::Function | Kind::Array | Kind::Not, found) => {
                return Err(ParseError::invalid_shape("an object", describe(found)).into());
            }
            (Kind::OneOf | Kind::AllOf | Kind::AnyOf, found) => {
                return Err(ParseError::invalid_shape("an array of schemas", describe(found)).into());
            }
            (other, _) => {
                return Err(ParseError::invalid_shape("an object, array, composite or not target", other.as_str()).into());
            }
        };

        let warnings = parser.into_warnings().len();
        doc.ids = ids;

        match incoming {
            Incoming::Append(nodes) => {
                let slot = if owner.is_empty() {
                    Some(SeqSlot::Root)
                } else {
                    kind.child_sequence()
                };
                let children = slot
                    .and_then(|slot| locate::sequence_mut(doc, &owner, slot))
                    .ok_or_else(|| MutationError::InvalidStructure("no sequence to import into".to_string()))?;
                info!(count = nodes.len(), warnings, "imported schemas");
                children.extend(nodes);
            }
            Incoming::Replace(node) => {
                info!(warnings, "imported replacement schema");
                if owner.is_empty() {
                    doc.root = RootSlot::Single(Box::new(node));
                } else {
                    let slot = if kind == Kind::Array {
                        SingleSlot::Items
                    } else {
                        SingleSlot::Not
                    };
                    let holder = locate::branch_mut(doc, &owner, slot)
                        .ok_or_else(|| MutationError::InvalidStructure("no slot to import into".to_string()))?;
                    *holder = Some(Box::new(node));
                }
            }
        }

        Ok(MutationOutcome::changed(true))
    }
}

enum Incoming {
    Append(Vec<SchemaNode>),
    Replace(SchemaNode),
}

fn sync_additional_schema(
    mode: AdditionalPropertiesMode,
    schema: &mut Option<Box<SchemaNode>>,
    ids: &mut IdGenerator,
) {
    match mode {
        AdditionalPropertiesMode::Schema if schema.is_none() => {
            *schema = Some(Box::new(factory::default_node(ids)));
        }
        AdditionalPropertiesMode::Schema => {}
        _ => *schema = None,
    }
}

impl AttributeUpdate {
    /// Apply to `node`; returns whether the tree shape changed
    pub fn apply_to(&self, node: &mut SchemaNode, ids: &mut IdGenerator) -> Result<bool, MutationError> {
        match self {
            AttributeUpdate::Name(name) => node.name = name.clone(),
            AttributeUpdate::Kind(kind) => {
                if *kind == Kind::Function {
                    return Err(MutationError::invalid_attribute(
                        "type",
                        "'function' is only valid as a root kind",
                    ));
                }
                if *kind == node.kind {
                    return Ok(false);
                }
                node.kind = *kind;
                factory::reset_structure(node, ids);
                return Ok(true);
            }
            AttributeUpdate::Required(required) => node.required = *required,
            AttributeUpdate::Description(text) => node.description = text.clone(),
            AttributeUpdate::DefaultValue(raw) => node.default_value = raw.clone(),
            AttributeUpdate::ConstValue(raw) => node.const_value = raw.clone(),
            AttributeUpdate::Examples(raw) => node.examples = raw.clone(),
            AttributeUpdate::Pattern(pattern) => node.pattern = pattern.clone(),
            AttributeUpdate::Format(format) => node.format = format.clone(),
            AttributeUpdate::MinLength(n) => node.min_length = *n,
            AttributeUpdate::MaxLength(n) => node.max_length = *n,
            AttributeUpdate::Enum(values) => node.enum_values = values.clone(),
            AttributeUpdate::Minimum(bound) => {
                node.minimum = bound.clone();
                if bound.is_some() {
                    node.exclusive_minimum = None;
                }
            }
            AttributeUpdate::Maximum(bound) => {
                node.maximum = bound.clone();
                if bound.is_some() {
                    node.exclusive_maximum = None;
                }
            }
            AttributeUpdate::ExclusiveMinimum(bound) => {
                node.exclusive_minimum = bound.clone();
                if bound.is_some() {
                    node.minimum = None;
                }
            }
            AttributeUpdate::ExclusiveMaximum(bound) => {
                node.exclusive_maximum = bound.clone();
                if bound.is_some() {
                    node.maximum = None;
                }
            }
            AttributeUpdate::MinItems(n) => node.min_items = *n,
            AttributeUpdate::MaxItems(n) => node.max_items = *n,
            AttributeUpdate::UniqueItems(unique) => node.unique_items = *unique,
            AttributeUpdate::MinProperties(n) => node.min_properties = *n,
            AttributeUpdate::MaxProperties(n) => node.max_properties = *n,
            AttributeUpdate::AdditionalProperties(mode) => {
                if node.kind != Kind::Object {
                    return Err(MutationError::invalid_attribute(
                        "additionalPropertiesType",
                        format!("'{}' nodes have no properties", node.kind),
                    ));
                }
                node.additional_properties = *mode;
                sync_additional_schema(*mode, &mut node.additional_properties_schema, ids);
                return Ok(true);
            }
            AttributeUpdate::Reference(reference) => node.reference = reference.clone(),
            AttributeUpdate::Collapsed(collapsed) => node.is_collapsed = *collapsed,
            AttributeUpdate::ConditionalCollapsed(collapsed) => node.is_conditional_collapsed = *collapsed,
            AttributeUpdate::ValidationCollapsed(collapsed) => node.is_validation_collapsed = *collapsed,
        }
        Ok(false)
    }

    /// Convert a renderer `(attributeName, rawValue)` pair into a typed update
    pub fn from_raw(attribute: &str, raw: &str) -> Result<Self, MutationError> {
        let update = match attribute {
            "name" => Self::Name(raw.to_string()),
            "type" => Self::Kind(
                raw.parse()
                    .map_err(|reason: String| MutationError::invalid_attribute(attribute, reason))?,
            ),
            "required" => Self::Required(flag(attribute, raw)?),
            "description" => Self::Description(raw.to_string()),
            "defaultValue" => Self::DefaultValue(optional_text(raw)),
            "constValue" => Self::ConstValue(optional_text(raw)),
            "examples" => Self::Examples(raw.to_string()),
            "pattern" => Self::Pattern(raw.to_string()),
            "format" => Self::Format(raw.to_string()),
            "minLength" => Self::MinLength(count(attribute, raw)?),
            "maxLength" => Self::MaxLength(count(attribute, raw)?),
            "enum" => Self::Enum(
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(Value::from)
                    .collect(),
            ),
            "minimum" => Self::Minimum(bound(attribute, raw)?),
            "maximum" => Self::Maximum(bound(attribute, raw)?),
            "exclusiveMinimum" => Self::ExclusiveMinimum(bound(attribute, raw)?),
            "exclusiveMaximum" => Self::ExclusiveMaximum(bound(attribute, raw)?),
            "minItems" => Self::MinItems(count(attribute, raw)?),
            "maxItems" => Self::MaxItems(count(attribute, raw)?),
            "uniqueItems" => Self::UniqueItems(flag(attribute, raw)?),
            "minProperties" => Self::MinProperties(count(attribute, raw)?),
            "maxProperties" => Self::MaxProperties(count(attribute, raw)?),
            "additionalPropertiesType" => Self::AdditionalProperties(
                raw.parse()
                    .map_err(|reason: String| MutationError::invalid_attribute(attribute, reason))?,
            ),
            "ref" => Self::Reference(raw.to_string()),
            "isCollapsed" => Self::Collapsed(flag(attribute, raw)?),
            "isConditionalCollapsed" => Self::ConditionalCollapsed(flag(attribute, raw)?),
            "isValidationCollapsed" => Self::ValidationCollapsed(flag(attribute, raw)?),
            other => return Err(MutationError::invalid_attribute(other, "unknown attribute")),
        };
        Ok(update)
    }
}

fn optional_text(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn flag(attribute: &str, raw: &str) -> Result<bool, MutationError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(MutationError::invalid_attribute(
            attribute,
            format!("expected true or false, got '{}'", other),
        )),
    }
}

fn count(attribute: &str, raw: &str) -> Result<Option<u64>, MutationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| MutationError::invalid_attribute(attribute, format!("'{}' is not a non-negative integer", raw)))
}

fn bound(attribute: &str, raw: &str) -> Result<Option<Number>, MutationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Number>(raw)
        .map(Some)
        .map_err(|_| MutationError::invalid_attribute(attribute, format!("'{}' is not a number", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaforge_parser::{parse_document, serialize};
    use serde_json::json;

    fn doc_from(value: Value) -> SchemaDocument {
        parse_document(&value, IdGenerator::new()).unwrap().value
    }

    fn root_names(doc: &SchemaDocument) -> Vec<&str> {
        doc.root.children().iter().map(|c| c.name.as_str()).collect()
    }

    fn abc() -> SchemaDocument {
        doc_from(json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "object", "properties": {"inner": {"type": "string"}}},
                "c": {"type": "string"}
            }
        }))
    }

    fn root_id(doc: &SchemaDocument, index: usize) -> String {
        doc.root.children()[index].id.clone()
    }

    #[test]
    fn test_add_child_to_root_and_node() {
        let mut doc = abc();
        let outcome = Mutation::AddChild {
            parent_id: None,
            slot: SeqSlot::Root,
        }
        .apply(&mut doc)
        .unwrap();

        let created = outcome.created_id().unwrap().to_string();
        assert_eq!(doc.root.children()[3].id, created);
        assert_eq!(doc.root.children()[3].kind, Kind::String);

        let b = root_id(&doc, 1);
        Mutation::AddChild {
            parent_id: Some(b),
            slot: SeqSlot::Properties,
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.root.children()[1].properties.len(), 2);
    }

    #[test]
    fn test_add_child_rejects_slot_of_other_kind() {
        let mut doc = abc();
        let a = root_id(&doc, 0);
        let err = Mutation::AddChild {
            parent_id: Some(a),
            slot: SeqSlot::Properties,
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidStructure(_)));
    }

    #[test]
    fn test_add_definition_is_named_object() {
        let mut doc = abc();
        let add = Mutation::AddChild {
            parent_id: None,
            slot: SeqSlot::Definitions,
        };
        add.apply(&mut doc).unwrap();
        add.apply(&mut doc).unwrap();

        assert_eq!(doc.definitions[1].name, "NewDefinition2");
        assert_eq!(doc.definitions[1].kind, Kind::Object);
        assert!(doc.definitions[1].is_definition);
    }

    #[test]
    fn test_stale_identity_is_noop() {
        let mut doc = abc();
        let before = doc.clone();

        for mutation in [
            Mutation::Delete {
                node_id: "item_404".to_string(),
            },
            Mutation::Move {
                node_id: "item_404".to_string(),
                direction: Direction::Up,
            },
            Mutation::UpdateAttribute {
                node_id: "item_404".to_string(),
                update: AttributeUpdate::Name("x".to_string()),
            },
        ] {
            let outcome = mutation.apply(&mut doc).unwrap();
            assert!(!outcome.is_applied());
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_move_swaps_and_stops_at_boundary() {
        let mut doc = abc();
        let a = root_id(&doc, 0);

        let up = Mutation::Move {
            node_id: a.clone(),
            direction: Direction::Up,
        };
        assert!(!up.apply(&mut doc).unwrap().is_applied());

        Mutation::Move {
            node_id: a,
            direction: Direction::Down,
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(root_names(&doc), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_reorder_uses_target_index() {
        let mut doc = abc();
        let (a, c) = (root_id(&doc, 0), root_id(&doc, 2));

        Mutation::Reorder {
            dragged_id: a.clone(),
            target_id: c.clone(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(root_names(&doc), vec!["b", "c", "a"]);

        Mutation::Reorder {
            dragged_id: a,
            target_id: root_id(&doc, 0),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(root_names(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cross_level_reorder_is_rejected() {
        let mut doc = abc();
        let a = root_id(&doc, 0);
        let inner = doc.root.children()[1].properties[0].id.clone();
        let before = doc.clone();

        let err = Mutation::Reorder {
            dragged_id: a,
            target_id: inner,
        }
        .apply(&mut doc)
        .unwrap_err();

        assert_eq!(err, MutationError::CrossLevelReorder);
        assert_eq!(err.to_string(), "Can only reorder items at the same level.");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_from_sequence_and_optional_slot() {
        let mut doc = abc();
        let b = root_id(&doc, 1);

        Mutation::Delete { node_id: b }.apply(&mut doc).unwrap();
        assert_eq!(root_names(&doc), vec!["a", "c"]);

        Mutation::SetConditional {
            target: None,
            branch: Branch::If,
            present: true,
        }
        .apply(&mut doc)
        .unwrap();
        let if_id = doc.if_schema.as_ref().unwrap().id.clone();
        Mutation::Delete { node_id: if_id }.apply(&mut doc).unwrap();
        assert!(doc.if_schema.is_none());
    }

    #[test]
    fn test_required_single_slot_is_never_deleted() {
        let mut doc = doc_from(json!({"type": "object", "properties": {"list": {"type": "array"}}}));
        let items = doc.root.children()[0].items.as_ref().unwrap().id.clone();

        let outcome = Mutation::Delete { node_id: items }.apply(&mut doc).unwrap();
        assert!(!outcome.is_applied());
        assert!(doc.root.children()[0].items.is_some());
    }

    #[test]
    fn test_bounds_are_mutually_exclusive() {
        let mut doc = doc_from(json!({"type": "object", "properties": {"n": {"type": "number", "minimum": 1}}}));
        let n = root_id(&doc, 0);

        let set = |update| Mutation::UpdateAttribute {
            node_id: n.clone(),
            update,
        };

        set(AttributeUpdate::ExclusiveMinimum(Some(Number::from(3)))).apply(&mut doc).unwrap();
        assert_eq!(doc.root.children()[0].minimum, None);
        assert_eq!(doc.root.children()[0].exclusive_minimum, Some(Number::from(3)));

        set(AttributeUpdate::Minimum(Some(Number::from(2)))).apply(&mut doc).unwrap();
        assert_eq!(doc.root.children()[0].exclusive_minimum, None);
        assert_eq!(doc.root.children()[0].minimum, Some(Number::from(2)));

        set(AttributeUpdate::ExclusiveMaximum(Some(Number::from(9)))).apply(&mut doc).unwrap();
        set(AttributeUpdate::Maximum(None)).apply(&mut doc).unwrap();
        assert_eq!(doc.root.children()[0].exclusive_maximum, Some(Number::from(9)));
    }

    #[test]
    fn test_kind_change_resets_structure() {
        let mut doc = SchemaDocument::new();
        let add = Mutation::AddChild {
            parent_id: None,
            slot: SeqSlot::Root,
        };
        let id = add.apply(&mut doc).unwrap().created_id().unwrap().to_string();

        let to_object = Mutation::UpdateAttribute {
            node_id: id.clone(),
            update: AttributeUpdate::Kind(Kind::Object),
        };
        assert!(to_object.apply(&mut doc).unwrap().is_structural());
        Mutation::AddChild {
            parent_id: Some(id.clone()),
            slot: SeqSlot::Properties,
        }
        .apply(&mut doc)
        .unwrap();

        Mutation::UpdateAttribute {
            node_id: id,
            update: AttributeUpdate::Kind(Kind::Array),
        }
        .apply(&mut doc)
        .unwrap();

        let node = &doc.root.children()[0];
        assert!(node.properties.is_empty());
        assert!(node.one_of_schemas.is_empty());
        assert_eq!(node.items.as_ref().unwrap().kind, Kind::String);
    }

    #[test]
    fn test_function_kind_is_rejected_for_nodes() {
        let mut doc = abc();
        let err = Mutation::UpdateAttribute {
            node_id: root_id(&doc, 0),
            update: AttributeUpdate::Kind(Kind::Function),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_additional_properties_schema_mode_creates_child() {
        let mut doc = abc();
        let b = root_id(&doc, 1);
        let set = |mode| Mutation::UpdateAttribute {
            node_id: b.clone(),
            update: AttributeUpdate::AdditionalProperties(mode),
        };

        set(AdditionalPropertiesMode::Schema).apply(&mut doc).unwrap();
        assert!(doc.root.children()[1].additional_properties_schema.is_some());

        let out = serialize(&doc).value;
        assert_eq!(out["properties"]["b"]["additionalProperties"], json!({"type": "string"}));

        set(AdditionalPropertiesMode::Disallow).apply(&mut doc).unwrap();
        assert!(doc.root.children()[1].additional_properties_schema.is_none());
        assert_eq!(serialize(&doc).value["properties"]["b"]["additionalProperties"], json!(false));
    }

    #[test]
    fn test_root_kind_changes() {
        let mut doc = abc();

        Mutation::UpdateDocument {
            update: DocumentUpdate::RootKind(Kind::Function),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.root.children().len(), 3);

        Mutation::UpdateDocument {
            update: DocumentUpdate::RootKind(Kind::Array),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.root.single().unwrap().kind, Kind::String);

        Mutation::UpdateDocument {
            update: DocumentUpdate::RootKind(Kind::Integer),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.root.single().unwrap().kind, Kind::Integer);

        let err = Mutation::UpdateDocument {
            update: DocumentUpdate::RootKind(Kind::Ref),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_clear_keeps_root_kind_and_counter() {
        let mut doc = doc_from(json!({"oneOf": [{"type": "string"}]}));
        let counter = doc.ids.peek();

        Mutation::UpdateDocument {
            update: DocumentUpdate::Clear,
        }
        .apply(&mut doc)
        .unwrap();

        assert_eq!(doc.root_kind, Kind::OneOf);
        assert!(doc.root.children().is_empty());
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.ids.peek(), counter);
    }

    #[test]
    fn test_import_into_object_and_composite() {
        let mut doc = doc_from(json!({
            "type": "object",
            "properties": {"choice": {"anyOf": []}}
        }));

        Mutation::ImportInto {
            target: None,
            source: r#"{"email": {"type": "string", "format": "email"}}"#.to_string(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(root_names(&doc), vec!["choice", "email"]);
        assert!(!doc.root.children()[1].required);

        let choice = root_id(&doc, 0);
        Mutation::ImportInto {
            target: Some(choice),
            source: r#"[{"type": "string"}, {"type": "null"}]"#.to_string(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.root.children()[0].any_of_schemas.len(), 2);
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let mut doc = doc_from(json!({"type": "object", "properties": {"tags": {"type": "array"}}}));
        let tags = root_id(&doc, 0);
        let before = doc.clone();

        let err = Mutation::ImportInto {
            target: Some(tags.clone()),
            source: r#"[{"type": "string"}]"#.to_string(),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MutationError::Import(ParseError::InvalidShape { .. })));

        let err = Mutation::ImportInto {
            target: None,
            source: "{ not json".to_string(),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MutationError::Import(ParseError::Json(_))));
        assert_eq!(doc, before);

        Mutation::ImportInto {
            target: Some(tags),
            source: r#"{"type": "integer"}"#.to_string(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.root.children()[0].items.as_ref().unwrap().kind, Kind::Integer);
    }

    #[test]
    fn test_from_raw_conversions() {
        assert_eq!(AttributeUpdate::from_raw("minimum", "").unwrap(), AttributeUpdate::Minimum(None));
        assert_eq!(
            AttributeUpdate::from_raw("maximum", "2.5").unwrap(),
            AttributeUpdate::Maximum(Some(serde_json::from_str("2.5").unwrap()))
        );
        assert_eq!(
            AttributeUpdate::from_raw("enum", " red, green,, blue ").unwrap(),
            AttributeUpdate::Enum(vec![json!("red"), json!("green"), json!("blue")])
        );
        assert_eq!(AttributeUpdate::from_raw("uniqueItems", "true").unwrap(), AttributeUpdate::UniqueItems(true));
        assert_eq!(AttributeUpdate::from_raw("type", "ref").unwrap(), AttributeUpdate::Kind(Kind::Ref));
        assert_eq!(AttributeUpdate::from_raw("defaultValue", "").unwrap(), AttributeUpdate::DefaultValue(None));

        assert!(AttributeUpdate::from_raw("minLength", "-1").is_err());
        assert!(AttributeUpdate::from_raw("required", "yes").is_err());
        assert!(AttributeUpdate::from_raw("colour", "red").is_err());
    }

    #[test]
    fn test_mutation_wire_format() {
        let mutation: Mutation = serde_json::from_value(json!({
            "action": "updateAttribute",
            "node_id": "item_3",
            "update": {"attribute": "minLength", "value": 2}
        }))
        .unwrap();

        assert_eq!(
            mutation,
            Mutation::UpdateAttribute {
                node_id: "item_3".to_string(),
                update: AttributeUpdate::MinLength(Some(2)),
            }
        );
    }
}
