//! Main validation engine.
//!
//! This module provides the [`DataValidator`] that orchestrates all checks of
//! one validation run, in order:
//!
//! 1. column presence (`column_in_dataframe`, `column_in_schema`)
//! 2. type coercion (`coerce_dtype`, `dtype`)
//! 3. column checks declared by the fields
//! 4. the primary key check
//! 5. one check per foreign key
//!
//! In lazy mode every step runs and all failures are reported together. In
//! eager mode the run stops after the first step or check that failed.

use crate::coerce::CoercedTable;
use crate::{
    Check, ColumnCheck, DataSet, FailureCase, ForeignKeyCheck, KeyContext, PrimaryKeyCheck,
    Result, SchemaValidationError, ValidationError,
};
use contracts_core::{
    Backend, Contract, CrossContract, DataContract, TableSchema, ValidationOptions,
};
use tracing::{debug, info, warn};

/// Check name for a required column missing from the data.
pub const COLUMN_IN_DATAFRAME: &str = "column_in_dataframe";
/// Check name for a data column the schema does not declare.
pub const COLUMN_IN_SCHEMA: &str = "column_in_schema";

/// Validates datasets against one schema.
///
/// Construction resolves the backend and builds every check, so
/// configuration errors surface before any data is looked at.
///
/// # Example
///
/// ```rust
/// use contracts_core::{Field, TableSchemaBuilder, ValidationOptions};
/// use contracts_validator::{DataSet, DataValidator, DataValue, KeyContext};
///
/// let schema = TableSchemaBuilder::new()
///     .field(Field::integer("id"))
///     .primary_key(["id"])
///     .build()
///     .unwrap();
///
/// let validator =
///     DataValidator::new(&schema, &KeyContext::new(), &ValidationOptions::new()).unwrap();
///
/// let data = DataSet::from_rows(["id"], vec![vec![DataValue::Int(1)], vec![DataValue::Int(1)]])
///     .unwrap();
///
/// let error = validator.validate(&data).unwrap_err();
/// let failures = error.failures().unwrap();
/// assert_eq!(failures.errors().len(), 2);
/// ```
#[derive(Debug)]
pub struct DataValidator<'s> {
    schema: &'s TableSchema,
    backend: Backend,
    lazy: bool,
    checks: Vec<Box<dyn Check>>,
}

impl<'s> DataValidator<'s> {
    /// Builds the validator for `schema`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnsupportedBackend`] for an unknown backend name
    /// - [`ValidationError::UnresolvableForeignKey`] for a foreign key to
    ///   another resource without referenced values
    /// - [`ValidationError::InvalidPattern`] for a pattern that does not compile
    /// - [`ValidationError::InvalidData`] for existing key tuples whose length
    ///   differs from the key
    pub fn new(
        schema: &'s TableSchema,
        keys: &KeyContext,
        options: &ValidationOptions,
    ) -> Result<Self> {
        let backend = options.resolve_backend()?;
        let mut checks: Vec<Box<dyn Check>> = Vec::new();

        for field in schema.iter() {
            for check in ColumnCheck::for_field(field)? {
                checks.push(Box::new(check));
            }
        }

        if !schema.primary_key().is_empty() && !options.skip_primary_key_validation {
            checks.push(Box::new(PrimaryKeyCheck::new(
                schema,
                keys.primary_key_values(),
            )?));
        }

        if !options.skip_foreign_key_validation {
            for fk in schema.foreign_keys() {
                let existing = keys.foreign_key_values(fk.fields());
                checks.push(Box::new(ForeignKeyCheck::new(schema, fk, existing)?));
            }
        }

        debug!(
            backend = %backend,
            checks = checks.len(),
            lazy = options.lazy,
            "Built validator"
        );

        Ok(Self {
            schema,
            backend,
            lazy: options.lazy,
            checks,
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Names of the checks that run after presence and coercion.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Validates a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Failed`] carrying every failure (lazy
    /// mode) or the failures of the first failing check (eager mode).
    pub fn validate(&self, data: &DataSet) -> Result<()> {
        let mut failures = Vec::new();

        if self.collect(&mut failures, "column presence", self.presence(data)) {
            return self.finish(failures, data);
        }

        let table = CoercedTable::new(self.schema, data);
        if self.collect(&mut failures, "type coercion", coercion_failures(self.schema, &table)) {
            return self.finish(failures, data);
        }

        for check in &self.checks {
            if self.collect(&mut failures, check.name(), check.run(&table)) {
                break;
            }
        }

        self.finish(failures, data)
    }

    /// Adds a step's failures; returns true when an eager run must stop.
    fn collect(&self, failures: &mut Vec<FailureCase>, step: &str, found: Vec<FailureCase>) -> bool {
        if found.is_empty() {
            return false;
        }
        debug!(check = step, failures = found.len(), "Check failed");
        failures.extend(found);
        if !self.lazy {
            warn!(check = step, "Stopping at first failing check");
        }
        !self.lazy
    }

    fn presence(&self, data: &DataSet) -> Vec<FailureCase> {
        let mut failures: Vec<FailureCase> = self
            .schema
            .iter()
            .filter(|field| field.required() && !data.has_column(field.name()))
            .map(|field| FailureCase::new(COLUMN_IN_DATAFRAME, None, None, field.name().into()))
            .collect();

        failures.extend(
            data.columns()
                .iter()
                .filter(|column| !self.schema.has_field(column))
                .map(|column| FailureCase::new(COLUMN_IN_SCHEMA, None, None, column.as_str().into())),
        );
        failures
    }

    fn finish(&self, failures: Vec<FailureCase>, data: &DataSet) -> Result<()> {
        if failures.is_empty() {
            info!(rows = data.len(), "Validation passed");
            return Ok(());
        }
        info!(
            rows = data.len(),
            failures = failures.len(),
            "Validation failed"
        );
        let message = format!(
            "Data validation against schema failed with {} failure case(s).",
            failures.len()
        );
        Err(ValidationError::Failed(SchemaValidationError::new(
            message,
            failures,
            data.clone(),
        )))
    }
}

/// Per-cell `coerce_dtype` failures plus one column-level `dtype` failure
/// for every column that did not coerce cleanly.
fn coercion_failures(schema: &TableSchema, table: &CoercedTable<'_>) -> Vec<FailureCase> {
    let mut failures = Vec::new();
    for field in schema.iter() {
        let Some(column) = table.column(field.name()) else {
            continue;
        };
        if !column.has_failures() {
            continue;
        }

        let coerce_check = format!("coerce_dtype('{}')", column.dtype);
        for (i, value) in column.values.iter().enumerate() {
            if column.failed[i] {
                failures.push(FailureCase::new(
                    coerce_check.as_str(),
                    Some(field.name().to_string()),
                    Some(table.label(i)),
                    value.clone(),
                ));
            }
        }

        failures.push(FailureCase::new(
            format!("dtype('{}')", column.dtype),
            Some(field.name().to_string()),
            None,
            observed_type(table.data(), field.name()).into(),
        ));
    }
    failures
}

/// Type of a raw column: the shared type of its non-null cells, or
/// `object` when they differ.
fn observed_type(data: &DataSet, column: &str) -> &'static str {
    let Some(position) = data.column_position(column) else {
        return "object";
    };
    let mut kinds = data
        .rows()
        .map(|row| &row[position])
        .filter(|v| !v.is_null())
        .map(|v| v.type_name());
    match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => first,
        _ => "object",
    }
}

/// Validates a dataset against a schema in one call.
///
/// # Example
///
/// ```rust
/// use contracts_core::{Field, TableSchemaBuilder, ValidationOptions};
/// use contracts_validator::{DataSet, KeyContext, ValidationError, validate_data};
///
/// let schema = TableSchemaBuilder::new()
///     .field(Field::integer("id"))
///     .build()
///     .unwrap();
/// let data = DataSet::from_json(serde_json::json!([{"id": 1}, {"id": "2"}])).unwrap();
///
/// validate_data(&schema, &data, &KeyContext::new(), &ValidationOptions::new()).unwrap();
///
/// let options = ValidationOptions::new().with_backend("spark");
/// let result = validate_data(&schema, &data, &KeyContext::new(), &options);
/// assert!(matches!(result, Err(ValidationError::UnsupportedBackend(_))));
/// ```
pub fn validate_data(
    schema: &TableSchema,
    data: &DataSet,
    keys: &KeyContext,
    options: &ValidationOptions,
) -> Result<()> {
    DataValidator::new(schema, keys, options)?.validate(data)
}

/// Dataset validation for anything that owns a table schema.
pub trait ValidateData {
    /// Validates `data`; see [`validate_data`].
    fn validate_data(
        &self,
        data: &DataSet,
        keys: &KeyContext,
        options: &ValidationOptions,
    ) -> Result<()>;
}

impl ValidateData for TableSchema {
    fn validate_data(
        &self,
        data: &DataSet,
        keys: &KeyContext,
        options: &ValidationOptions,
    ) -> Result<()> {
        validate_data(self, data, keys, options)
    }
}

impl ValidateData for Contract {
    fn validate_data(
        &self,
        data: &DataSet,
        keys: &KeyContext,
        options: &ValidationOptions,
    ) -> Result<()> {
        validate_data(self.table_schema(), data, keys, options)
    }
}

impl ValidateData for CrossContract {
    fn validate_data(
        &self,
        data: &DataSet,
        keys: &KeyContext,
        options: &ValidationOptions,
    ) -> Result<()> {
        validate_data(self.table_schema(), data, keys, options)
    }
}
