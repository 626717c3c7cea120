//! # Document Handle
//!
//! One open schema together with its rendered output.
//!
//! The tree is the source of truth; the rendered JSON Schema and its
//! identity map are derived views, rebuilt after every applied mutation.
//!
//! ## Lifecycle
//!
//! ```text
//! Import → Parse → Edit → Serialize → Save
//!   ↓        ↓       ↓        ↓         ↓
//! JSON     Tree  Mutations  Schema    Store
//! ```

use crate::locate::{self, Found};
use crate::mutations::{Mutation, MutationOutcome};
use crate::post_effects::PostEffectEngine;
use crate::EditorError;
use schemaforge_common::collect_ids;
use schemaforge_parser::{parse_document_str, serialize, IdGenerator, SchemaDocument, SerializedDocument};
use serde_json::Value;
use tracing::{debug, warn};

/// Key of the id counter inside a serialized tree
const ID_COUNTER_KEY: &str = "nextId";

/// Editable schema document
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each applied mutation)
    pub version: u64,

    schema: SchemaDocument,
    rendered: SerializedDocument,
    effects: PostEffectEngine,
}

impl Document {
    /// Wrap an existing tree; the id counter is moved past every id it holds
    pub fn new(mut schema: SchemaDocument) -> Self {
        reserve_ids(&mut schema);
        let rendered = serialize(&schema);

        Self {
            version: 0,
            schema,
            rendered,
            effects: PostEffectEngine::new(),
        }
    }

    /// Import a JSON Schema text as a fresh document
    pub fn from_source(source: &str) -> Result<Self, EditorError> {
        let parsed = parse_document_str(source, IdGenerator::new())?;
        if !parsed.warnings.is_empty() {
            warn!(count = parsed.warnings.len(), "document imported with warnings");
        }
        Ok(Self::new(parsed.value))
    }

    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }

    /// Rendered JSON Schema and identity map
    pub fn rendered(&self) -> &SerializedDocument {
        &self.rendered
    }

    pub fn output(&self) -> &Value {
        &self.rendered.value
    }

    pub fn title(&self) -> &str {
        &self.schema.title
    }

    pub fn locate(&self, id: &str) -> Option<Found<'_>> {
        locate::locate(&self.schema, id)
    }

    /// Apply a mutation and its post-effects
    ///
    /// On error the tree is left exactly as it was.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationOutcome, EditorError> {
        let backup = self.schema.clone();

        match self.effects.apply_with_effects(mutation, &mut self.schema) {
            Ok((outcome, secondary)) => {
                if outcome.is_applied() {
                    self.version += 1;
                    self.render();
                    if !secondary.is_empty() {
                        debug!(count = secondary.len(), "applied post-effects");
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                self.schema = backup;
                Err(e.into())
            }
        }
    }

    /// Swap in a whole new tree (used by whole-document import)
    pub fn replace(&mut self, mut schema: SchemaDocument) {
        schema.ids.advance_to(self.schema.ids.peek());
        reserve_ids(&mut schema);
        self.schema = schema;
        self.version += 1;
        self.render();
    }

    /// Serialized tree for the history, without the id counter
    pub fn snapshot(&self) -> Result<String, EditorError> {
        let mut value = serde_json::to_value(&self.schema)?;
        if let Value::Object(map) = &mut value {
            map.remove(ID_COUNTER_KEY);
        }
        Ok(serde_json::to_string(&value)?)
    }

    /// Restore a snapshot; the id counter never moves backwards
    pub fn restore(&mut self, snapshot: &str) -> Result<(), EditorError> {
        let mut schema: SchemaDocument = serde_json::from_str(snapshot)?;
        schema.ids = self.schema.ids;
        reserve_ids(&mut schema);
        self.schema = schema;
        self.version += 1;
        self.render();
        Ok(())
    }

    fn render(&mut self) {
        self.rendered = serialize(&self.schema);
    }
}

fn reserve_ids(schema: &mut SchemaDocument) {
    for id in collect_ids(schema) {
        schema.ids.reserve(&id);
    }
}
