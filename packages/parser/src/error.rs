use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Failures that abort loading a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Invalid schema shape: expected {expected}, found {found}")]
    InvalidShape { expected: String, found: String },
}

impl ParseError {
    pub fn invalid_shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::InvalidShape {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Recoverable oddities found while loading; the load still succeeds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    #[error("{path}: unrecognized type '{found}', treated as object")]
    UnknownType { path: String, found: String },

    #[error("{path}: no type given, treated as object")]
    Untyped { path: String },

    #[error("{path}: array without items, using a string item schema")]
    MissingItems { path: String },

    #[error("unrecognized root type '{found}', loaded as empty object")]
    UnknownRootType { found: String },

    #[error("root has no type, defaulting to object")]
    UntypedRoot,

    #[error("{path}: reference '{reference}' does not match any definition")]
    UnresolvedRef { path: String, reference: String },
}

/// Short description of a JSON value's shape, for error messages
pub fn describe(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
