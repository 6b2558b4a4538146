//! Error types for data contracts.
//!
//! Every error in this module is structural: it is raised while a schema or
//! contract is being constructed (or while a declared value is interpreted) and
//! is never recovered from automatically.

use thiserror::Error;

/// Result type for data contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Main error type for data contract operations.
#[derive(Error, Debug)]
pub enum ContractError {
    /// Schema validation failed
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    /// Keys or descriptors reference fields that are not declared.
    ///
    /// Carries one message per offending reference so that every missing
    /// name is reported at once.
    #[error("Structural integrity error: {}", .0.join(" ; "))]
    StructuralIntegrity(Vec<String>),

    /// Foreign key source and target do not have the same arity
    #[error(
        "Foreign key length mismatch: Source has {} fields {}, but target reference has {} fields {}.",
        .fields.len(),
        crate::format_name_list(.fields),
        .referenced.len(),
        crate::format_name_list(.referenced)
    )]
    ForeignKeyLengthMismatch {
        /// Referring fields in this schema
        fields: Vec<String>,
        /// Referenced fields in the target resource
        referenced: Vec<String>,
    },

    /// A foreign key names its own contract as the referenced resource
    #[error(
        "Foreign key reference resource '{0}' cannot be the same as the contract name. \
         Self-references must leave the resource unset."
    )]
    SelfReference(String),

    /// An identifier does not satisfy the naming rules
    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        /// What is being named (field, contract, ...)
        kind: &'static str,
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A declared field uses a name reserved for generated columns
    #[error("Schema cannot have a field named '{0}' as it is reserved for the generated primary key.")]
    ReservedFieldName(String),

    /// Two fields share a name
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// A schema declares no fields
    #[error("Schema must declare at least one field")]
    EmptySchema,

    /// A collection that must hold at least one element is empty
    #[error("{0} must not be empty")]
    EmptyCollection(&'static str),

    /// A constraint is malformed
    #[error("Invalid constraint on field '{field}': {message}")]
    InvalidConstraint {
        /// Field name carrying the constraint
        field: String,
        /// Description of the problem
        message: String,
    },

    /// A value could not be interpreted as the field's declared type
    #[error("Invalid type for field '{field}': expected {expected}, got {actual}")]
    InvalidValueType {
        /// Field name
        field: String,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// A datetime string does not match the declared format
    #[error("Cannot parse '{value}' as a datetime with format '{format}'")]
    DateTimeParse {
        /// Input text
        value: String,
        /// strftime-style format
        format: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContractError {
    /// Creates a new constraint error.
    pub fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new value type error.
    pub fn value_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidValueType {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
