use schemaforge_parser::ast::*;

/// Visitor pattern for traversing schema trees immutably
///
/// The default implementations walk every slot of every node, in the same
/// order identity lookups search them. Override `visit_node` to act on each
/// node and call `walk_node` to keep descending.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &SchemaDocument) {
        walk_document(self, doc);
    }

    fn visit_node(&mut self, node: &SchemaNode) {
        walk_node(self, node);
    }
}

/// Mutable visitor pattern for rewriting schema trees in place
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut SchemaDocument) {
        walk_document_mut(self, doc);
    }

    fn visit_node_mut(&mut self, node: &mut SchemaNode) {
        walk_node_mut(self, node);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &SchemaDocument) {
    for branch in [
        &doc.additional_properties_schema,
        &doc.if_schema,
        &doc.then_schema,
        &doc.else_schema,
    ]
    .into_iter()
    .flatten()
    {
        visitor.visit_node(branch);
    }

    match &doc.root {
        RootSlot::Children(children) => {
            for child in children {
                visitor.visit_node(child);
            }
        }
        RootSlot::Single(node) => visitor.visit_node(node),
    }

    for def in &doc.definitions {
        visitor.visit_node(def);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &SchemaNode) {
    for child in node.children() {
        visitor.visit_node(child);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, doc: &mut SchemaDocument) {
    for branch in [
        &mut doc.additional_properties_schema,
        &mut doc.if_schema,
        &mut doc.then_schema,
        &mut doc.else_schema,
    ]
    .into_iter()
    .flatten()
    {
        visitor.visit_node_mut(branch);
    }

    match &mut doc.root {
        RootSlot::Children(children) => {
            for child in children {
                visitor.visit_node_mut(child);
            }
        }
        RootSlot::Single(node) => visitor.visit_node_mut(node),
    }

    for def in &mut doc.definitions {
        visitor.visit_node_mut(def);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut SchemaNode) {
    let sequences = [
        &mut node.properties,
        &mut node.one_of_schemas,
        &mut node.all_of_schemas,
        &mut node.any_of_schemas,
    ];
    for seq in sequences {
        for child in seq {
            visitor.visit_node_mut(child);
        }
    }

    let singles = [
        &mut node.items,
        &mut node.not_schema,
        &mut node.additional_properties_schema,
        &mut node.if_schema,
        &mut node.then_schema,
        &mut node.else_schema,
    ];
    for child in singles.into_iter().flatten() {
        visitor.visit_node_mut(child);
    }
}

/// Collects the id of every node in a tree
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &SchemaNode) {
        self.ids.push(node.id.clone());
        walk_node(self, node);
    }
}

/// All node ids of a document, in search order
pub fn collect_ids(doc: &SchemaDocument) -> Vec<String> {
    let mut collector = IdCollector::default();
    collector.visit_document(doc);
    collector.ids
}
