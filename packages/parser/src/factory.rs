//! Node construction.
//!
//! Every node that enters a document goes through [`create_node`], which
//! hands out a fresh identity, applies the defaults of the node's kind and
//! recursively builds whatever children the template carries.

use crate::ast::{AdditionalPropertiesMode, Kind, SchemaNode};
use crate::id_generator::IdGenerator;
use std::mem;

/// Build a node (and its whole subtree) from an id-less template.
///
/// Structure that does not belong to the template's kind is dropped, the
/// numeric bound pairs are normalized so that an exclusive bound wins over
/// its inclusive counterpart, and required children (`items` for arrays,
/// the negated schema for `not`) are filled in when missing.
pub fn create_node(ids: &mut IdGenerator, template: SchemaNode) -> SchemaNode {
    let mut node = template;
    node.id = ids.new_id();

    normalize_bounds(&mut node);
    retain_kind_structure(&mut node);

    node.properties = build_all(ids, mem::take(&mut node.properties));
    node.items = build_one(ids, node.items.take());
    node.one_of_schemas = build_all(ids, mem::take(&mut node.one_of_schemas));
    node.all_of_schemas = build_all(ids, mem::take(&mut node.all_of_schemas));
    node.any_of_schemas = build_all(ids, mem::take(&mut node.any_of_schemas));
    node.not_schema = build_one(ids, node.not_schema.take());
    node.additional_properties_schema = build_one(ids, node.additional_properties_schema.take());
    node.if_schema = build_one(ids, node.if_schema.take());
    node.then_schema = build_one(ids, node.then_schema.take());
    node.else_schema = build_one(ids, node.else_schema.take());

    fill_kind_defaults(&mut node, ids);
    node
}

/// A fresh `string` node
pub fn default_node(ids: &mut IdGenerator) -> SchemaNode {
    create_node(ids, SchemaNode::default())
}

pub fn node_of_kind(ids: &mut IdGenerator, kind: Kind) -> SchemaNode {
    create_node(ids, SchemaNode::new(kind))
}

/// Drop every structural child and rebuild the empty shape of `node.kind`.
///
/// Used when a node changes kind; annotations and scalar attributes survive.
pub fn reset_structure(node: &mut SchemaNode, ids: &mut IdGenerator) {
    node.properties.clear();
    node.items = None;
    node.one_of_schemas.clear();
    node.all_of_schemas.clear();
    node.any_of_schemas.clear();
    node.not_schema = None;
    node.additional_properties = AdditionalPropertiesMode::Allow;
    node.additional_properties_schema = None;
    node.reference.clear();

    fill_kind_defaults(node, ids);
}

/// Keep at most one bound per side; the exclusive one wins
pub fn normalize_bounds(node: &mut SchemaNode) {
    if node.exclusive_minimum.is_some() {
        node.minimum = None;
    }
    if node.exclusive_maximum.is_some() {
        node.maximum = None;
    }
}

fn build_all(ids: &mut IdGenerator, templates: Vec<SchemaNode>) -> Vec<SchemaNode> {
    templates.into_iter().map(|t| create_node(ids, t)).collect()
}

fn build_one(ids: &mut IdGenerator, template: Option<Box<SchemaNode>>) -> Option<Box<SchemaNode>> {
    template.map(|t| Box::new(create_node(ids, *t)))
}

fn retain_kind_structure(node: &mut SchemaNode) {
    let kind = node.kind;

    if kind != Kind::Object {
        node.properties.clear();
        node.additional_properties = AdditionalPropertiesMode::Allow;
    }
    if node.additional_properties != AdditionalPropertiesMode::Schema {
        node.additional_properties_schema = None;
    }
    if kind != Kind::Array {
        node.items = None;
    }
    if kind != Kind::OneOf {
        node.one_of_schemas.clear();
    }
    if kind != Kind::AllOf {
        node.all_of_schemas.clear();
    }
    if kind != Kind::AnyOf {
        node.any_of_schemas.clear();
    }
    if kind != Kind::Not {
        node.not_schema = None;
    }
    if kind != Kind::Ref {
        node.reference.clear();
    }
}

fn fill_kind_defaults(node: &mut SchemaNode, ids: &mut IdGenerator) {
    match node.kind {
        Kind::Array if node.items.is_none() => {
            node.items = Some(Box::new(default_node(ids)));
        }
        Kind::Not if node.not_schema.is_none() => {
            node.not_schema = Some(Box::new(default_node(ids)));
        }
        Kind::Object
            if node.additional_properties == AdditionalPropertiesMode::Schema
                && node.additional_properties_schema.is_none() =>
        {
            node.additional_properties_schema = Some(Box::new(default_node(ids)));
        }
        _ => {}
    }
}
