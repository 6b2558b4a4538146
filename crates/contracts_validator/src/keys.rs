//! Primary and foreign key checks.
//!
//! Both checks compare whole key tuples. Values already committed elsewhere
//! are supplied through a [`KeyContext`] and coerced with the same rules as
//! the data, so `"1"` and `1` are the same key on an integer column.

use crate::coerce::{CoercedTable, coerce};
use crate::{
    Check, DataValue, FOREIGN_KEY_CHECK, FailureCase, PRIMARY_KEY_CHECK, Result, ValidationError,
};
use contracts_core::{ForeignKey, TableSchema, format_name_list};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Key tuples that already exist outside the validated data.
///
/// Deserializes from
///
/// ```json
/// {
///   "primaryKey": [[1], [2]],
///   "foreignKeys": [{"fields": ["region"], "values": [["north"], ["south"]]}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "KeyContextDef")]
pub struct KeyContext {
    primary_key_values: Option<Vec<Vec<DataValue>>>,
    foreign_key_values: HashMap<Vec<String>, Vec<Vec<DataValue>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct KeyContextDef {
    #[serde(default)]
    primary_key: Option<Vec<Vec<DataValue>>>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKeyValues>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ForeignKeyValues {
    fields: Vec<String>,
    values: Vec<Vec<DataValue>>,
}

impl From<KeyContextDef> for KeyContext {
    fn from(def: KeyContextDef) -> Self {
        let mut context = KeyContext::new();
        context.primary_key_values = def.primary_key;
        for fk in def.foreign_keys {
            context.foreign_key_values.insert(fk.fields, fk.values);
        }
        context
    }
}

impl KeyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary key tuples that already exist.
    pub fn with_primary_key_values(mut self, values: Vec<Vec<DataValue>>) -> Self {
        self.primary_key_values = Some(values);
        self
    }

    /// Sets the target tuples a foreign key may point to.
    ///
    /// `fields` are the referring fields of the foreign key, in order.
    pub fn with_foreign_key_values<I, S>(mut self, fields: I, values: Vec<Vec<DataValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.foreign_key_values
            .insert(fields.into_iter().map(Into::into).collect(), values);
        self
    }

    pub fn primary_key_values(&self) -> Option<&[Vec<DataValue>]> {
        self.primary_key_values.as_deref()
    }

    pub fn foreign_key_values(&self, fields: &[String]) -> Option<&[Vec<DataValue>]> {
        self.foreign_key_values.get(fields).map(Vec::as_slice)
    }
}

/// Coerces external tuples with the types of `fields`; cells that do not
/// coerce are kept as given.
///
/// A tuple whose length differs from the key is rejected.
fn coerce_tuples(
    schema: &TableSchema,
    fields: &[String],
    tuples: &[Vec<DataValue>],
) -> Result<HashSet<Vec<DataValue>>> {
    tuples
        .iter()
        .map(|tuple| {
            if tuple.len() != fields.len() {
                return Err(ValidationError::invalid_data(format!(
                    "existing values for key {} must have {} element(s), found {}",
                    format_name_list(fields),
                    fields.len(),
                    tuple.len()
                )));
            }
            Ok(tuple
                .iter()
                .zip(fields)
                .map(|(value, name)| {
                    schema
                        .get(name)
                        .and_then(|field| coerce(value, field))
                        .unwrap_or_else(|| value.clone())
                })
                .collect())
        })
        .collect()
}

fn key_failures(
    name: &str,
    fields: &[String],
    table: &CoercedTable<'_>,
    rows: impl IntoIterator<Item = usize>,
) -> Vec<FailureCase> {
    rows.into_iter()
        .flat_map(|i| {
            fields.iter().map(move |field| {
                FailureCase::new(
                    name,
                    Some(field.clone()),
                    Some(table.label(i)),
                    table.value(i, field),
                )
            })
        })
        .collect()
}

/// Uniqueness of the primary key within the data and against existing keys.
///
/// Null key cells compare equal to each other.
#[derive(Debug, Clone)]
pub struct PrimaryKeyCheck {
    name: String,
    fields: Vec<String>,
    existing: HashSet<Vec<DataValue>>,
}

impl PrimaryKeyCheck {
    /// Builds the check for the schema's primary key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidData`] when an existing tuple does
    /// not have one value per key field.
    pub fn new(schema: &TableSchema, existing: Option<&[Vec<DataValue>]>) -> Result<Self> {
        let fields = schema.primary_key().fields().to_vec();
        let existing = existing
            .map(|tuples| coerce_tuples(schema, &fields, tuples))
            .transpose()?
            .unwrap_or_default();
        debug!(fields = ?fields, existing = existing.len(), "Built primary key check");
        Ok(Self {
            name: format!("{}: {}", PRIMARY_KEY_CHECK, format_name_list(&fields)),
            fields,
            existing,
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Check for PrimaryKeyCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, table: &CoercedTable<'_>) -> Vec<FailureCase> {
        let keys: Vec<Vec<DataValue>> = (0..table.len())
            .map(|i| table.key(i, &self.fields))
            .collect();
        let mut counts: HashMap<&[DataValue], usize> = HashMap::new();
        for key in &keys {
            *counts.entry(key.as_slice()).or_default() += 1;
        }

        let failing = keys.iter().enumerate().filter_map(|(i, key)| {
            let duplicated = counts.get(key.as_slice()).is_some_and(|&n| n > 1);
            (duplicated || self.existing.contains(key)).then_some(i)
        });
        key_failures(&self.name, &self.fields, table, failing)
    }
}

/// Existence of referring values among the referenced ones.
///
/// Rows with a null or empty value in any referring field pass. A
/// self-reference also accepts the referenced fields' values of the data
/// being validated.
#[derive(Debug, Clone)]
pub struct ForeignKeyCheck {
    name: String,
    fields: Vec<String>,
    referenced_fields: Option<Vec<String>>,
    valid: HashSet<Vec<DataValue>>,
}

impl ForeignKeyCheck {
    /// Builds the check for one foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnresolvableForeignKey`] when the key points
    /// at another resource and no referenced values are given, and
    /// [`ValidationError::InvalidData`] when a referenced tuple does not have
    /// one value per referring field.
    pub fn new(
        schema: &TableSchema,
        foreign_key: &ForeignKey,
        existing: Option<&[Vec<DataValue>]>,
    ) -> Result<Self> {
        let fields = foreign_key.fields().to_vec();
        let valid = existing
            .map(|tuples| coerce_tuples(schema, &fields, tuples))
            .transpose()?
            .unwrap_or_default();
        let referenced_fields = foreign_key
            .is_self_reference()
            .then(|| foreign_key.reference().fields().to_vec());

        if valid.is_empty() && referenced_fields.is_none() {
            return Err(ValidationError::unresolvable_foreign_key(&fields));
        }
        debug!(
            fields = ?fields,
            existing = valid.len(),
            self_reference = referenced_fields.is_some(),
            "Built foreign key check"
        );

        Ok(Self {
            name: format!("{}: {}", FOREIGN_KEY_CHECK, format_name_list(&fields)),
            fields,
            referenced_fields,
            valid,
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Check for ForeignKeyCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, table: &CoercedTable<'_>) -> Vec<FailureCase> {
        let internal: HashSet<Vec<DataValue>> = match &self.referenced_fields {
            Some(referenced) => (0..table.len()).map(|i| table.key(i, referenced)).collect(),
            None => HashSet::new(),
        };

        let failing = (0..table.len()).filter(|&i| {
            let key = table.key(i, &self.fields);
            if key.iter().any(DataValue::is_blank) {
                return false;
            }
            !self.valid.contains(&key) && !internal.contains(&key)
        });
        key_failures(&self.name, &self.fields, table, failing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataSet;
    use contracts_core::{Field, TableSchemaBuilder};
    use pretty_assertions::assert_eq;

    fn failing_rows(check: &dyn Check, schema: &TableSchema, data: &DataSet) -> Vec<usize> {
        let table = CoercedTable::new(schema, data);
        let mut rows: Vec<usize> = check
            .run(&table)
            .into_iter()
            .filter_map(|f| f.index)
            .collect();
        rows.dedup();
        rows
    }

    #[test]
    fn test_key_context_from_json() {
        let context: KeyContext = serde_json::from_value(serde_json::json!({
            "primaryKey": [[1, "a"]],
            "foreignKeys": [{"fields": ["region"], "values": [["north"]]}]
        }))
        .unwrap();
        assert_eq!(
            context.primary_key_values(),
            Some(&[vec![DataValue::Int(1), DataValue::from("a")]][..])
        );
        assert_eq!(
            context.foreign_key_values(&["region".to_string()]),
            Some(&[vec![DataValue::from("north")]][..])
        );
        assert_eq!(context.foreign_key_values(&["other".to_string()]), None);
    }

    #[test]
    fn test_primary_key_duplicates_and_existing() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("a"))
            .field(Field::string("b"))
            .primary_key(["a"])
            .build()
            .unwrap();
        let data = DataSet::from_rows(
            ["a", "b"],
            vec![
                vec![1.into(), "a".into()],
                vec![1.into(), "b".into()],
                vec![2.into(), "c".into()],
                vec![3.into(), "d".into()],
            ],
        )
        .unwrap();

        let check = PrimaryKeyCheck::new(&schema, Some(&[vec![DataValue::from("3")]][..])).unwrap();
        assert_eq!(check.name(), "PrimaryKeyError: ['a']");
        assert_eq!(failing_rows(&check, &schema, &data), vec![0, 1, 3]);
    }

    #[test]
    fn test_primary_key_nulls_compare_equal() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("a"))
            .primary_key(["a"])
            .build()
            .unwrap();
        let data = DataSet::from_rows(["a"], vec![vec![DataValue::Null], vec![DataValue::Null]])
            .unwrap();
        let check = PrimaryKeyCheck::new(&schema, None).unwrap();
        assert_eq!(failing_rows(&check, &schema, &data), vec![0, 1]);
    }

    #[test]
    fn test_primary_key_rejects_existing_tuple_of_wrong_length() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("a"))
            .primary_key(["a"])
            .build()
            .unwrap();
        let existing = vec![vec![DataValue::Int(1), DataValue::Int(999)]];

        let error = PrimaryKeyCheck::new(&schema, Some(existing.as_slice())).unwrap_err();
        assert!(matches!(error, ValidationError::InvalidData(_)));
        assert!(error.to_string().contains("['a']"));
    }

    #[test]
    fn test_foreign_key_external_values() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("region"))
            .foreign_key(["region"], "regions", ["id"])
            .build()
            .unwrap();
        let data = DataSet::from_rows(
            ["region"],
            vec![
                vec![10.into()],
                vec![99.into()],
                vec![DataValue::Null],
                vec!["".into()],
            ],
        )
        .unwrap();

        let fk = &schema.foreign_keys()[0];
        let existing = vec![vec![DataValue::Int(10)], vec![DataValue::Int(11)]];
        let check = ForeignKeyCheck::new(&schema, fk, Some(existing.as_slice())).unwrap();
        assert_eq!(check.name(), "ForeignKeyError: ['region']");
        assert_eq!(failing_rows(&check, &schema, &data), vec![1]);
    }

    #[test]
    fn test_foreign_key_without_values_is_unresolvable() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("region"))
            .foreign_key(["region"], "regions", ["id"])
            .build()
            .unwrap();
        let fk = &schema.foreign_keys()[0];

        for values in [None, Some(&[][..])] {
            let error = ForeignKeyCheck::new(&schema, fk, values).unwrap_err();
            assert_eq!(
                error.to_string(),
                "Cannot validate foreign key ['region'] as no referenced values are provided."
            );
        }
    }

    #[test]
    fn test_foreign_key_rejects_referenced_tuple_of_wrong_length() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("region"))
            .foreign_key(["region"], "regions", ["id"])
            .build()
            .unwrap();
        let fk = &schema.foreign_keys()[0];
        let existing = vec![vec![DataValue::Int(10), DataValue::from("junk")]];

        let error = ForeignKeyCheck::new(&schema, fk, Some(existing.as_slice())).unwrap_err();
        assert!(matches!(error, ValidationError::InvalidData(_)));
        assert!(error.to_string().contains("['region']"));
    }

    #[test]
    fn test_self_reference_uses_data_values() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("id"))
            .field(Field::integer("parent"))
            .self_reference(["parent"], ["id"])
            .build()
            .unwrap();
        let data = DataSet::from_rows(
            ["id", "parent"],
            vec![
                vec![1.into(), DataValue::Null],
                vec![2.into(), 1.into()],
                vec![3.into(), 7.into()],
                vec![4.into(), 100.into()],
            ],
        )
        .unwrap();

        let fk = &schema.foreign_keys()[0];
        let check = ForeignKeyCheck::new(&schema, fk, Some(&[vec![DataValue::Int(100)]][..])).unwrap();
        assert_eq!(failing_rows(&check, &schema, &data), vec![2]);
    }
}
