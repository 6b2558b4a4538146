//! Validation options shared by all backends.
//!
//! This module defines the knobs a caller turns when validating data
//! against a schema. The validation itself lives in a backend crate; the
//! backend named here is resolved when validation is invoked, so an unknown
//! name surfaces as a configuration error at call time.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Backend name used when none is given.
pub const DEFAULT_BACKEND: &str = "memory";

/// Tabular validation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Row-oriented in-memory table
    #[default]
    InMemory,
}

/// An unrecognised backend name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Backend '{0}' is not supported. Supported backends: memory, pandas")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    /// `pandas` is accepted as an alias so existing declarations keep working.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "pandas" => Ok(Backend::InMemory),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::InMemory => f.write_str("memory"),
        }
    }
}

/// Options for one validation call.
///
/// # Example
///
/// ```rust
/// use contracts_core::ValidationOptions;
///
/// let options = ValidationOptions::new()
///     .with_skip_foreign_key_validation(true)
///     .with_lazy(false);
///
/// assert!(options.skip_foreign_key_validation);
/// assert!(!options.lazy);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Do not build the primary key check
    pub skip_primary_key_validation: bool,

    /// Do not build foreign key checks
    pub skip_foreign_key_validation: bool,

    /// Collect every failure (`true`) or stop after the first failing check
    pub lazy: bool,

    /// Backend name, resolved at call time
    pub backend: String,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            skip_primary_key_validation: false,
            skip_foreign_key_validation: false,
            lazy: true,
            backend: DEFAULT_BACKEND.to_string(),
        }
    }
}

impl ValidationOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips the primary key check.
    pub fn with_skip_primary_key_validation(mut self, skip: bool) -> Self {
        self.skip_primary_key_validation = skip;
        self
    }

    /// Skips foreign key checks.
    pub fn with_skip_foreign_key_validation(mut self, skip: bool) -> Self {
        self.skip_foreign_key_validation = skip;
        self
    }

    /// Sets lazy (collect everything) or eager mode.
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Selects the backend by name.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Resolves the backend name.
    pub fn resolve_backend(&self) -> Result<Backend, UnknownBackend> {
        self.backend.parse()
    }
}
