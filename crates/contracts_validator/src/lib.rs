//! # Data Contracts Validator
//!
//! Validation engine for data contracts. This crate checks tabular data
//! against a [`TableSchema`](contracts_core::TableSchema):
//!
//! - column presence and type coercion per declared field
//! - value checks derived from field constraints (nullability, uniqueness,
//!   enums, bounds, patterns, lengths)
//! - primary key uniqueness, within the data and against existing keys
//! - foreign key integrity against referenced values or, for self
//!   references, against the data itself
//!
//! Failures are collected into a [`SchemaValidationError`] whose
//! [`errors`](SchemaValidationError::errors) list is deduplicated, collapsed
//! per key and sorted.
//!
//! ## Example
//!
//! ```rust
//! use contracts_core::{Field, TableSchemaBuilder, ValidationOptions};
//! use contracts_validator::{DataSet, DataValue, KeyContext, ValidateData, ValidationError};
//!
//! let schema = TableSchemaBuilder::new()
//!     .field(Field::integer("id"))
//!     .field(Field::integer("region"))
//!     .primary_key(["id"])
//!     .foreign_key(["region"], "regions", ["id"])
//!     .build()
//!     .unwrap();
//!
//! let data = DataSet::from_json(serde_json::json!([
//!     {"id": 1, "region": 10},
//!     {"id": 2, "region": 99}
//! ]))
//! .unwrap();
//!
//! let keys = KeyContext::new()
//!     .with_foreign_key_values(["region"], vec![vec![DataValue::Int(10)]]);
//!
//! match schema.validate_data(&data, &keys, &ValidationOptions::new()) {
//!     Err(ValidationError::Failed(e)) => {
//!         assert_eq!(e.errors().len(), 1);
//!         assert_eq!(e.errors()[0].index, Some(1));
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

mod arrow;
mod checks;
mod coerce;
mod dataset;
mod engine;
mod error;
mod keys;
mod report;

pub use arrow::*;
pub use checks::*;
pub use coerce::*;
pub use dataset::*;
pub use engine::*;
pub use error::*;
pub use keys::*;
pub use report::*;
