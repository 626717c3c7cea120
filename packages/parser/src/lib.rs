pub mod ast;
pub mod error;
pub mod factory;
pub mod id_generator;
pub mod parser;
pub mod serializer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{
    AdditionalPropertiesMode, Kind, RootSlot, SchemaDocument, SchemaNode, SeqSlot, SingleSlot, Slot, Slots,
    upgrade_stored_bounds, DOCUMENT_SLOTS, IMPORTED_TITLE, NODE_SLOTS,
};
pub use error::{ParseError, ParseResult, ParseWarning};
pub use factory::{create_node, default_node, node_of_kind, reset_structure};
pub use id_generator::IdGenerator;
pub use parser::{parse_document, parse_document_str, parse_schema, ParseContext, Parsed, Parser};
pub use serializer::{serialize, serialize_node, IdentityMap, SerializedDocument, Serializer, SCHEMA_DIALECT};
