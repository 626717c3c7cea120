//! # Schemaforge Bridge
//!
//! Two-way conversion between JSON Schema documents and Pydantic models.
//!
//! - [`document_to_code`] generates Python source directly, without any
//!   runtime
//! - [`Bridge`] converts Python source back into a JSON Schema by handing it
//!   to a [`ConversionRuntime`] (in practice a Python interpreter)

pub mod bridge;
pub mod error;
pub mod pydantic;
pub mod runtime;

pub use bridge::{Bridge, BridgeReply};
pub use error::{BridgeError, BridgeResult};
pub use pydantic::{document_to_code, sanitize_class_name};
pub use runtime::{ConversionRuntime, PythonRuntime};
