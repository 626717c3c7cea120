//! # Post-Effect System
//!
//! Mutations trigger cascading effects to maintain document integrity.
//!
//! ## Design
//!
//! When a mutation is applied, it may require additional changes to keep the
//! document consistent. Renaming a definition, for example, must rewrite
//! every `$ref` node that points at the old name.
//!
//! Effects analyze the mutation against the document *before* the primary
//! mutation runs, since that is the only moment the old state is visible.
//! Their secondary mutations are applied right after the primary one.
//!
//! Post-effects are:
//! - **Deterministic**: Same mutation always produces same effects
//! - **Minimal**: Only generate necessary secondary mutations
//! - **Local**: Only the document being edited is touched

use crate::locate;
use crate::mutations::{AttributeUpdate, Mutation, MutationError, MutationOutcome};
use schemaforge_common::visitor::{walk_node, Visitor};
use schemaforge_parser::ast::{Kind, SchemaDocument, SchemaNode};
use tracing::debug;

/// Prefix of references into the document's definitions
pub const DEFINITIONS_REF_PREFIX: &str = "#/$defs/";

/// Post-effect that can be triggered by a mutation
pub trait PostEffect: std::fmt::Debug {
    /// Analyze the mutation and generate secondary mutations if needed
    fn analyze(&self, mutation: &Mutation, doc: &SchemaDocument) -> Vec<Mutation>;
}

/// Point references at a definition's new name when it is renamed
#[derive(Debug)]
pub struct PropagateDefinitionRename;

impl PostEffect for PropagateDefinitionRename {
    fn analyze(&self, mutation: &Mutation, doc: &SchemaDocument) -> Vec<Mutation> {
        let Mutation::UpdateAttribute {
            node_id,
            update: AttributeUpdate::Name(new_name),
        } = mutation
        else {
            return vec![];
        };

        let Some(found) = locate::locate(doc, node_id) else {
            return vec![];
        };
        if !found.node.is_definition || found.node.name == *new_name {
            return vec![];
        }

        let old_ref = format!("{}{}", DEFINITIONS_REF_PREFIX, found.node.name);
        let new_ref = format!("{}{}", DEFINITIONS_REF_PREFIX, new_name);

        let mut finder = ReferenceFinder {
            reference: &old_ref,
            hits: Vec::new(),
        };
        finder.visit_document(doc);
        debug!(from = %old_ref, to = %new_ref, count = finder.hits.len(), "propagating definition rename");

        finder
            .hits
            .into_iter()
            .map(|id| Mutation::UpdateAttribute {
                node_id: id,
                update: AttributeUpdate::Reference(new_ref.clone()),
            })
            .collect()
    }
}

/// Ids of every `$ref` node pointing at `reference`
struct ReferenceFinder<'r> {
    reference: &'r str,
    hits: Vec<String>,
}

impl Visitor for ReferenceFinder<'_> {
    fn visit_node(&mut self, node: &SchemaNode) {
        if node.kind == Kind::Ref && node.reference == self.reference {
            self.hits.push(node.id.clone());
        }
        walk_node(self, node);
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect + Send + Sync>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(PropagateDefinitionRename)],
        }
    }

    /// Analyze a mutation and generate all secondary mutations
    pub fn analyze(&self, mutation: &Mutation, doc: &SchemaDocument) -> Vec<Mutation> {
        let mut secondary_mutations = Vec::new();

        for effect in &self.effects {
            let mut effect_mutations = effect.analyze(mutation, doc);
            secondary_mutations.append(&mut effect_mutations);
        }

        secondary_mutations
    }

    /// Apply a mutation with all its post-effects
    ///
    /// Returns the primary outcome and the secondary mutations that ran.
    pub fn apply_with_effects(
        &self,
        mutation: &Mutation,
        doc: &mut SchemaDocument,
    ) -> Result<(MutationOutcome, Vec<Mutation>), MutationError> {
        let secondary = self.analyze(mutation, doc);

        // Apply primary mutation
        let outcome = mutation.apply(doc)?;
        if !outcome.is_applied() {
            return Ok((outcome, Vec::new()));
        }

        for secondary_mutation in &secondary {
            secondary_mutation.apply(doc)?;
        }

        Ok((outcome, secondary))
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
