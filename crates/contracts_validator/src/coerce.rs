//! Cell coercion to a field's declared type.
//!
//! Coercion mirrors how a dataframe backend casts a column to its dtype:
//! integral floats become integers, numeric text is parsed, datetime text is
//! parsed with the field's format and JSON-encoded text becomes a list.
//! Null and NaN always coerce to null.

use crate::{DataSet, DataValue};
use contracts_core::{DType, Field, ItemType, TableSchema};
use std::collections::HashMap;

/// A declared column after coercion.
///
/// Cells that could not be coerced keep their original value and are
/// flagged in `failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub dtype: DType,
    pub values: Vec<DataValue>,
    pub failed: Vec<bool>,
}

impl CoercedColumn {
    /// Whether any cell failed coercion.
    pub fn has_failures(&self) -> bool {
        self.failed.iter().any(|&f| f)
    }

    /// Positions of cells that coerced and hold a value.
    pub fn checkable(&self) -> impl Iterator<Item = (usize, &DataValue)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(i, v)| !self.failed[*i] && !v.is_null())
    }
}

/// The declared columns of a dataset, coerced to their field types.
#[derive(Debug)]
pub struct CoercedTable<'a> {
    data: &'a DataSet,
    columns: HashMap<String, CoercedColumn>,
}

impl<'a> CoercedTable<'a> {
    /// Coerces every declared column present in `data`.
    pub fn new(schema: &TableSchema, data: &'a DataSet) -> Self {
        let mut columns = HashMap::new();
        for field in schema.iter() {
            let Some(position) = data.column_position(field.name()) else {
                continue;
            };
            let mut values = Vec::with_capacity(data.len());
            let mut failed = Vec::with_capacity(data.len());
            for row in data.rows() {
                let raw = &row[position];
                match coerce(raw, field) {
                    Some(value) => {
                        values.push(value);
                        failed.push(false);
                    }
                    None => {
                        values.push(raw.clone());
                        failed.push(true);
                    }
                }
            }
            columns.insert(
                field.name().to_string(),
                CoercedColumn {
                    dtype: field.dtype(),
                    values,
                    failed,
                },
            );
        }
        Self { data, columns }
    }

    pub fn data(&self) -> &DataSet {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index label of a row position.
    pub fn label(&self, position: usize) -> usize {
        self.data.index()[position]
    }

    pub fn column(&self, name: &str) -> Option<&CoercedColumn> {
        self.columns.get(name)
    }

    /// Coerced cell; null when the column is absent.
    pub fn value(&self, position: usize, name: &str) -> DataValue {
        self.columns
            .get(name)
            .and_then(|c| c.values.get(position))
            .cloned()
            .unwrap_or(DataValue::Null)
    }

    /// Coerced cells of several columns in one row.
    pub fn key(&self, position: usize, names: &[String]) -> Vec<DataValue> {
        names.iter().map(|n| self.value(position, n)).collect()
    }
}

/// Coerces one cell to the type of `field`.
///
/// Returns `None` when the value cannot be represented in that type.
pub fn coerce(value: &DataValue, field: &Field) -> Option<DataValue> {
    if value.is_null() {
        return Some(DataValue::Null);
    }
    match field {
        Field::Integer(_) => to_integer(value),
        Field::Number(_) => to_number(value),
        Field::String(_) => to_text(value),
        Field::DateTime(f) => match value {
            DataValue::DateTime(dt) => Some(DataValue::DateTime(*dt)),
            DataValue::String(s) => f.parse(s).ok().map(DataValue::DateTime),
            _ => None,
        },
        Field::List(f) => to_list(value, f.item_type),
    }
}

fn to_integer(value: &DataValue) -> Option<DataValue> {
    match value {
        DataValue::Int(i) => Some(DataValue::Int(*i)),
        DataValue::Float(f) => integral(*f),
        DataValue::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Some(DataValue::Int(i)),
                Err(_) => s.parse::<f64>().ok().and_then(integral),
            }
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<DataValue> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .then(|| DataValue::Int(f as i64))
}

fn to_number(value: &DataValue) -> Option<DataValue> {
    match value {
        DataValue::Float(f) => Some(DataValue::Float(*f)),
        DataValue::Int(i) => Some(DataValue::Float(*i as f64)),
        DataValue::String(s) => s.trim().parse::<f64>().ok().map(DataValue::Float),
        _ => None,
    }
}

fn to_text(value: &DataValue) -> Option<DataValue> {
    match value {
        DataValue::List(_) => None,
        DataValue::String(s) => Some(DataValue::String(s.clone())),
        other => Some(DataValue::String(other.to_string())),
    }
}

fn to_list(value: &DataValue, item_type: ItemType) -> Option<DataValue> {
    let items = match value {
        DataValue::List(items) => items.clone(),
        DataValue::String(s) if s.trim_start().starts_with('[') => {
            let parsed: serde_json::Value = serde_json::from_str(s).ok()?;
            match DataValue::try_from(parsed).ok()? {
                DataValue::List(items) => items,
                _ => return None,
            }
        }
        _ => return None,
    };
    items
        .iter()
        .map(|item| to_item(item, item_type))
        .collect::<Option<Vec<_>>>()
        .map(DataValue::List)
}

fn to_item(value: &DataValue, item_type: ItemType) -> Option<DataValue> {
    if value.is_null() {
        return Some(DataValue::Null);
    }
    match item_type {
        ItemType::String => to_text(value),
        ItemType::Integer => to_integer(value),
        ItemType::Number => to_number(value),
        ItemType::Boolean => match value {
            DataValue::Bool(b) => Some(DataValue::Bool(*b)),
            DataValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(DataValue::Bool(true)),
                "false" => Some(DataValue::Bool(false)),
                _ => None,
            },
            _ => None,
        },
    }
}
