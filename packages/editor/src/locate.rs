//! # Identity Lookup
//!
//! Finds a node anywhere in a document by its identity and describes where
//! it lives as a path of slot edges, so callers can reach its parent
//! container mutably without holding borrows across the search.
//!
//! Search order: the document's root-level single sub-schemas
//! (`additionalProperties`, `if`, `then`, `else`), then the root slot, then
//! the definitions, descending depth-first through every child slot of
//! every visited node.

use schemaforge_parser::ast::*;
use std::collections::HashSet;

/// One step from an owner (document or node) into one of its slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Seq(SeqSlot, usize),
    Single(SingleSlot),
}

/// Where a node lives: the path to its owner, plus the final edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Empty when the owner is the document itself
    pub owner: Vec<Edge>,
    pub edge: Edge,
}

impl Location {
    /// Full path from the document to the node
    pub fn path(&self) -> Vec<Edge> {
        let mut path = self.owner.clone();
        path.push(self.edge);
        path
    }

    /// Sequence slot and index, when the node sits in a sequence
    pub fn sequence(&self) -> Option<(SeqSlot, usize)> {
        match self.edge {
            Edge::Seq(slot, index) => Some((slot, index)),
            Edge::Single(_) => None,
        }
    }

    /// Both nodes sit in the very same parent sequence
    pub fn shares_sequence_with(&self, other: &Location) -> bool {
        match (self.sequence(), other.sequence()) {
            (Some((a, _)), Some((b, _))) => a == b && self.owner == other.owner,
            _ => false,
        }
    }
}

/// A located node
#[derive(Debug, Clone)]
pub struct Found<'a> {
    pub node: &'a SchemaNode,
    pub location: Location,
}

/// Locate `id` in `doc`; `None` is an ordinary outcome for stale identities
pub fn locate<'a>(doc: &'a SchemaDocument, id: &str) -> Option<Found<'a>> {
    let location = find_location(doc, id)?;
    let node = node_at(doc, &location.path())?;
    Some(Found { node, location })
}

pub fn find_location(doc: &SchemaDocument, id: &str) -> Option<Location> {
    let mut search = Search {
        target: id,
        visited: HashSet::new(),
        trail: Vec::new(),
    };

    for slot in DOCUMENT_SLOTS {
        if search.slot(doc, slot) {
            let edge = search.trail.pop()?;
            return Some(Location {
                owner: search.trail,
                edge,
            });
        }
    }
    None
}

struct Search<'t, 'a> {
    target: &'t str,
    visited: HashSet<&'a str>,
    trail: Vec<Edge>,
}

impl<'t, 'a> Search<'t, 'a> {
    fn slot<S: Slots>(&mut self, owner: &'a S, slot: Slot) -> bool {
        match slot {
            Slot::Sequence(seq) => {
                let Some(children) = owner.sequence(seq) else {
                    return false;
                };
                for (i, child) in children.iter().enumerate() {
                    self.trail.push(Edge::Seq(seq, i));
                    if self.node(child) {
                        return true;
                    }
                    self.trail.pop();
                }
                false
            }
            Slot::Single(single) => {
                let Some(child) = owner.single(single) else {
                    return false;
                };
                self.trail.push(Edge::Single(single));
                if self.node(child) {
                    return true;
                }
                self.trail.pop();
                false
            }
        }
    }

    fn node(&mut self, node: &'a SchemaNode) -> bool {
        if node.id == self.target {
            return true;
        }
        if !self.visited.insert(node.id.as_str()) {
            return false;
        }
        NODE_SLOTS.iter().any(|slot| self.slot(node, *slot))
    }
}

fn step<S: Slots + ?Sized>(owner: &S, edge: Edge) -> Option<&SchemaNode> {
    match edge {
        Edge::Seq(slot, index) => owner.sequence(slot)?.get(index),
        Edge::Single(slot) => owner.single(slot),
    }
}

fn step_mut<S: Slots + ?Sized>(owner: &mut S, edge: Edge) -> Option<&mut SchemaNode> {
    match edge {
        Edge::Seq(slot, index) => owner.sequence_mut(slot)?.get_mut(index),
        Edge::Single(slot) => owner.single_mut(slot),
    }
}

pub fn node_at<'a>(doc: &'a SchemaDocument, path: &[Edge]) -> Option<&'a SchemaNode> {
    let (first, rest) = path.split_first()?;
    let mut node = step(doc, *first)?;
    for edge in rest {
        node = step(node, *edge)?;
    }
    Some(node)
}

pub fn node_at_mut<'a>(doc: &'a mut SchemaDocument, path: &[Edge]) -> Option<&'a mut SchemaNode> {
    let (first, rest) = path.split_first()?;
    let mut node = step_mut(doc, *first)?;
    for edge in rest {
        node = step_mut(node, *edge)?;
    }
    Some(node)
}

pub fn node_mut<'a>(doc: &'a mut SchemaDocument, id: &str) -> Option<&'a mut SchemaNode> {
    let location = find_location(doc, id)?;
    node_at_mut(doc, &location.path())
}

/// A sequence slot of the document (empty owner) or of the node at `owner`
pub fn sequence_mut<'a>(
    doc: &'a mut SchemaDocument,
    owner: &[Edge],
    slot: SeqSlot,
) -> Option<&'a mut Vec<SchemaNode>> {
    if owner.is_empty() {
        doc.sequence_mut(slot)
    } else {
        node_at_mut(doc, owner)?.sequence_mut(slot)
    }
}

/// An optional single slot of the document or of the node at `owner`
pub fn branch_mut<'a>(
    doc: &'a mut SchemaDocument,
    owner: &[Edge],
    slot: SingleSlot,
) -> Option<&'a mut Option<Box<SchemaNode>>> {
    if owner.is_empty() {
        doc.branch_mut(slot)
    } else {
        node_at_mut(doc, owner)?.branch_mut(slot)
    }
}
