//! Error types for validation operations.

use crate::SchemaValidationError;
use contracts_core::{UnknownBackend, format_name_list};
use thiserror::Error;

/// Errors that can occur during validation.
///
/// Configuration problems (`UnsupportedBackend`, `UnresolvableForeignKey`)
/// and unusable input (`InvalidData`) are raised before any check runs.
/// `Failed` carries the aggregated failures of a validation run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The requested backend name is not recognised
    #[error("Validation backend '{0}' is not supported. Supported backends: memory, pandas")]
    UnsupportedBackend(String),

    /// A foreign key to another resource has no referenced values to check against
    #[error(
        "Cannot validate foreign key {} as no referenced values are provided.",
        format_name_list(.fields)
    )]
    UnresolvableForeignKey { fields: Vec<String> },

    /// A field pattern does not compile
    #[error("Invalid regex pattern for field '{field}': {error}")]
    InvalidPattern { field: String, error: String },

    /// The input could not be turned into a dataset
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The data violates the schema
    #[error(transparent)]
    Failed(#[from] SchemaValidationError),
}

impl ValidationError {
    /// Creates a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    /// Creates a new invalid pattern error.
    pub fn invalid_pattern(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self::InvalidPattern {
            field: field.into(),
            error: error.into(),
        }
    }

    /// Creates a new unresolvable foreign key error.
    pub fn unresolvable_foreign_key(fields: &[String]) -> Self {
        Self::UnresolvableForeignKey {
            fields: fields.to_vec(),
        }
    }

    /// The aggregated failures, if this is a data failure.
    pub fn failures(&self) -> Option<&SchemaValidationError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnknownBackend> for ValidationError {
    fn from(e: UnknownBackend) -> Self {
        Self::UnsupportedBackend(e.0)
    }
}

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
