//! # Validation
//!
//! Checks a converted document in three independent stages, run in a fixed
//! order by [`Validator`]:
//!
//! 1. **Schema** (`schema`): every section has `title`, `content`, `level`
//!    and `children` with the right JSON types
//! 2. **Content** (`content`): titles are non-empty after trimming
//! 3. **Structure** (`structure`): top-level level jumps and parent/child
//!    level ordering
//!
//! Stages work on [`serde_json::Value`] rather than [`Section`](crate::Section)
//! so that missing fields and wrong types in hand-written or stored JSON can
//! be reported instead of failing to deserialize.

pub mod content;
pub mod schema;
pub mod structure;

use std::fmt;

use serde_json::{Map, Value};

use crate::models::DocumentTree;

pub use content::ContentValidator;
pub use schema::SchemaValidator;
pub use structure::StructureValidator;

/// JSON value categories named in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Float,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Float => "float",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{context} must be of type {expected}, got {found} instead")]
    TypeMismatch {
        context: String,
        expected: JsonType,
        found: JsonType,
    },
    #[error("{context} cannot be empty")]
    Empty { context: String },
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },
    #[error("Invalid structure in {context}: {details}")]
    Structure { context: String, details: String },
}

/// The validation stages, in the order the chain runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Schema,
    Content,
    Structure,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Schema => "Schema",
            Stage::Content => "Content",
            Stage::Structure => "Structure",
        };
        f.write_str(name)
    }
}

/// One stateless validation stage.
pub trait ValidationStrategy {
    fn stage(&self) -> Stage;

    /// Checks `data`, shaped as `{ "<file>": [ <section>, ... ] }`, and
    /// reports the first problem found.
    fn validate(&self, data: &Value) -> Result<(), ValidationError>;
}

/// Result of running the whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    failure: Option<(Stage, ValidationError)>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self { failure: None }
    }

    pub fn failed(stage: Stage, error: ValidationError) -> Self {
        Self {
            failure: Some((stage, error)),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<(Stage, &ValidationError)> {
        self.failure.as_ref().map(|(stage, error)| (*stage, error))
    }

    /// Empty when valid, otherwise the failing stage followed by the error,
    /// e.g. `Content validation failed: Title in doc.md cannot be empty`.
    pub fn message(&self) -> String {
        match &self.failure {
            None => String::new(),
            Some((stage, error)) => format!("{stage} validation failed: {error}"),
        }
    }
}

/// Runs schema, content and structure validation in sequence, stopping at
/// the first failing stage.
pub struct Validator {
    strategies: Vec<Box<dyn ValidationStrategy>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(SchemaValidator),
                Box::new(ContentValidator),
                Box::new(StructureValidator),
            ],
        }
    }

    pub fn validate(&self, data: &Value) -> ValidationOutcome {
        for strategy in &self.strategies {
            if let Err(error) = strategy.validate(data) {
                return ValidationOutcome::failed(strategy.stage(), error);
            }
        }
        ValidationOutcome::valid()
    }

    pub fn validate_tree(&self, tree: &DocumentTree) -> ValidationOutcome {
        self.validate(&tree.to_json_value())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn expect_type<'a>(
    value: &'a Value,
    expected: JsonType,
    context: impl FnOnce() -> String,
) -> Result<&'a Value, ValidationError> {
    let found = JsonType::of(value);
    if found == expected {
        Ok(value)
    } else {
        Err(ValidationError::TypeMismatch {
            context: context(),
            expected,
            found,
        })
    }
}

pub(crate) fn expect_object<'a>(
    value: &'a Value,
    context: impl FnOnce() -> String,
) -> Result<&'a Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ValidationError::TypeMismatch {
            context: context(),
            expected: JsonType::Object,
            found: JsonType::of(other),
        }),
    }
}
