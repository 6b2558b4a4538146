//! # Data Contracts Core
//!
//! Core data structures and types for the Data Contracts Engine.
//!
//! This crate provides the schema side of a data contract: typed fields with
//! constraints, primary and foreign keys, semantic field descriptors and the
//! [`TableSchema`] aggregate that ties them together. Validation of actual
//! data lives in `contracts_validator`.
//!
//! ## Key Concepts
//!
//! - **Field**: typed column definition (integer, number, string, datetime, list)
//! - **TableSchema**: ordered fields plus keys and descriptors, checked once at construction
//! - **Contract**: a named schema; foreign keys may reference other contracts by name
//! - **Projections**: column specs, JSON Schema and relational DDL derived from a schema
//!
//! ## Example
//!
//! ```rust
//! use contracts_core::{ContractBuilder, FieldBuilder, FieldType, TableSchemaBuilder};
//!
//! let schema = TableSchemaBuilder::new()
//!     .field(
//!         FieldBuilder::new("id", FieldType::Integer)
//!             .required(true)
//!             .build()
//!             .unwrap(),
//!     )
//!     .field(FieldBuilder::new("region", FieldType::String).build().unwrap())
//!     .primary_key(["id"])
//!     .foreign_key(["region"], "regions", ["code"])
//!     .build()
//!     .unwrap();
//!
//! let contract = ContractBuilder::new("sites", schema).build().unwrap();
//! assert_eq!(contract.tableschema().field_names(), vec!["id", "region"]);
//! ```

pub mod builder;
pub mod contract;
pub mod datetime;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod keys;
pub mod names;
pub mod projection;
pub mod schema;
pub mod validator;

pub use builder::*;
pub use contract::*;
pub use datetime::*;
pub use descriptor::*;
pub use error::*;
pub use field::*;
pub use keys::*;
pub use names::*;
pub use projection::*;
pub use schema::*;
pub use validator::*;
