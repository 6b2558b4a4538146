//! Dataset representation for validation.
//!
//! A [`DataSet`] is a small row-oriented table: named columns, rows of
//! [`DataValue`] cells and one integer index label per row. Labels default
//! to row positions but may be set explicitly (and may repeat), which is how
//! failures are reported back to the caller.

use crate::{Result, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A value in a dataset.
///
/// Represents different types of values that can appear in data records.
#[derive(Debug, Clone)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Timestamp value, normalized to UTC
    DateTime(DateTime<Utc>),
    /// List/array value
    List(Vec<DataValue>),
}

impl DataValue {
    /// Returns true if this value is null (or a NaN float).
    pub fn is_null(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Null, NaN or the empty string.
    pub fn is_blank(&self) -> bool {
        self.is_null() || matches!(self, DataValue::String(s) if s.is_empty())
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::String(_) => "string",
            DataValue::Int(_) => "int64",
            DataValue::Float(_) => "float64",
            DataValue::Bool(_) => "boolean",
            DataValue::DateTime(_) => "datetime",
            DataValue::List(_) => "list",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as a datetime.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            DataValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Attempts to get this value as a list.
    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Orders two values of compatible types; integers and floats compare
    /// numerically. Incompatible types yield `None`.
    pub fn compare(&self, other: &DataValue) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Int(a), DataValue::Int(b)) => Some(a.cmp(b)),
            (DataValue::Int(_) | DataValue::Float(_), DataValue::Int(_) | DataValue::Float(_)) => {
                self.as_float()?.partial_cmp(&other.as_float()?)
            }
            (DataValue::String(a), DataValue::String(b)) => Some(a.cmp(b)),
            (DataValue::Bool(a), DataValue::Bool(b)) => Some(a.cmp(b)),
            (DataValue::DateTime(a), DataValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Replaces NaN floats (also inside lists) with null.
    pub fn nan_to_null(self) -> DataValue {
        match self {
            DataValue::Float(f) if f.is_nan() => DataValue::Null,
            DataValue::List(items) => {
                DataValue::List(items.into_iter().map(DataValue::nan_to_null).collect())
            }
            other => other,
        }
    }

    fn float_key(f: f64) -> u64 {
        if f.is_nan() {
            f64::NAN.to_bits()
        } else if f == 0.0 {
            0.0f64.to_bits()
        } else {
            f.to_bits()
        }
    }
}

// Values are used as hash keys for primary and foreign key tuples, so
// equality is structural: NaN equals NaN and -0.0 equals 0.0.
impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => true,
            (DataValue::String(a), DataValue::String(b)) => a == b,
            (DataValue::Int(a), DataValue::Int(b)) => a == b,
            (DataValue::Float(a), DataValue::Float(b)) => {
                Self::float_key(*a) == Self::float_key(*b)
            }
            (DataValue::Bool(a), DataValue::Bool(b)) => a == b,
            (DataValue::DateTime(a), DataValue::DateTime(b)) => a == b,
            (DataValue::List(a), DataValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DataValue::Null => {}
            DataValue::String(s) => s.hash(state),
            DataValue::Int(i) => i.hash(state),
            DataValue::Float(f) => Self::float_key(*f).hash(state),
            DataValue::Bool(b) => b.hash(state),
            DataValue::DateTime(dt) => dt.hash(state),
            DataValue::List(items) => items.hash(state),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => f.write_str("null"),
            DataValue::String(s) => f.write_str(s),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(x) => write!(f, "{}", x),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            DataValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DataValue::Null => serializer.serialize_none(),
            DataValue::String(s) => serializer.serialize_str(s),
            DataValue::Int(i) => serializer.serialize_i64(*i),
            DataValue::Float(x) if x.is_nan() => serializer.serialize_none(),
            DataValue::Float(x) => serializer.serialize_f64(*x),
            DataValue::Bool(b) => serializer.serialize_bool(*b),
            DataValue::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            DataValue::List(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        DataValue::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<serde_json::Value> for DataValue {
    type Error = ValidationError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(DataValue::Null),
            serde_json::Value::Bool(b) => Ok(DataValue::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(DataValue::Int(i)),
                None => n
                    .as_f64()
                    .map(DataValue::Float)
                    .ok_or_else(|| ValidationError::invalid_data(format!("unrepresentable number {}", n))),
            },
            serde_json::Value::String(s) => Ok(DataValue::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(DataValue::try_from)
                .collect::<Result<Vec<_>>>()
                .map(DataValue::List),
            serde_json::Value::Object(_) => Err(ValidationError::invalid_data(
                "nested objects are not supported as cell values",
            )),
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<i32> for DataValue {
    fn from(i: i32) -> Self {
        DataValue::Int(i.into())
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(dt: DateTime<Utc>) -> Self {
        DataValue::DateTime(dt)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

impl From<&contracts_core::Scalar> for DataValue {
    fn from(scalar: &contracts_core::Scalar) -> Self {
        use contracts_core::Scalar;
        match scalar {
            Scalar::Integer(i) => DataValue::Int(*i),
            Scalar::Number(n) => DataValue::Float(*n),
            Scalar::String(s) => DataValue::String(s.clone()),
            Scalar::DateTime(dt) => DataValue::DateTime(*dt),
        }
    }
}

/// A table of values to validate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    columns: Vec<String>,
    index: Vec<usize>,
    rows: Vec<Vec<DataValue>>,
}

impl DataSet {
    /// Creates a new empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an empty dataset with the given columns.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Creates a new dataset from rows; every row must have one cell per column.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<DataValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dataset = Self::with_columns(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Creates a dataset from JSON-like records.
    ///
    /// Columns appear in first-seen order; keys missing from a record are null.
    pub fn from_records(records: Vec<serde_json::Map<String, serde_json::Value>>) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut dataset = Self::with_columns(columns.clone());
        for mut record in records {
            let row = columns
                .iter()
                .map(|c| {
                    record
                        .remove(c)
                        .map_or(Ok(DataValue::Null), DataValue::try_from)
                })
                .collect::<Result<Vec<_>>>()?;
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Creates a dataset from a JSON array of objects.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Array(items) = value else {
            return Err(ValidationError::invalid_data("expected an array of records"));
        };
        let records = items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(ValidationError::invalid_data(format!(
                    "expected a record object, found {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_records(records)
    }

    /// Replaces the index labels.
    pub fn with_index(mut self, index: Vec<usize>) -> Result<Self> {
        if index.len() != self.rows.len() {
            return Err(ValidationError::invalid_data(format!(
                "index has {} labels but the dataset has {} rows",
                index.len(),
                self.rows.len()
            )));
        }
        self.index = index;
        Ok(self)
    }

    /// Appends a row labelled with its position.
    pub fn push_row(&mut self, row: Vec<DataValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ValidationError::invalid_data(format!(
                "row {} has {} values but the dataset has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.index.push(self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// Index labels, one per row.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[DataValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Gets a specific row by position.
    pub fn get_row(&self, position: usize) -> Option<&[DataValue]> {
        self.rows.get(position).map(Vec::as_slice)
    }

    /// Cell at a row position and column name.
    pub fn value(&self, position: usize, column: &str) -> Option<&DataValue> {
        let col = self.column_position(column)?;
        self.rows.get(position)?.get(col)
    }

    /// Position of the first row carrying `label`.
    pub fn position_of_label(&self, label: usize) -> Option<usize> {
        self.index.iter().position(|&l| l == label)
    }

    /// Maps every label to the position of its first row.
    pub fn label_positions(&self) -> HashMap<usize, usize> {
        let mut positions = HashMap::with_capacity(self.index.len());
        for (position, &label) in self.index.iter().enumerate() {
            positions.entry(label).or_insert(position);
        }
        positions
    }

    /// Values of `columns` in the row at `position`.
    ///
    /// `None` when the row or any of the columns is missing.
    pub fn values_at(&self, position: usize, columns: &[String]) -> Option<Vec<DataValue>> {
        columns
            .iter()
            .map(|c| self.value(position, c).cloned())
            .collect()
    }

    /// Values of `columns` in the first row labelled `label`.
    ///
    /// `None` when the label or any of the columns is missing. Scans the
    /// index; build [`label_positions`](Self::label_positions) once for
    /// repeated lookups.
    pub fn lookup(&self, label: usize, columns: &[String]) -> Option<Vec<DataValue>> {
        self.values_at(self.position_of_label(label)?, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_data_value_types() {
        assert_eq!(DataValue::Null.type_name(), "null");
        assert_eq!(DataValue::String("test".into()).type_name(), "string");
        assert_eq!(DataValue::Int(42).type_name(), "int64");
        assert_eq!(DataValue::Float(3.5).type_name(), "float64");
        assert_eq!(DataValue::Bool(true).type_name(), "boolean");
    }

    #[test]
    fn test_data_value_conversions() {
        let val = DataValue::String("hello".into());
        assert_eq!(val.as_string(), Some("hello"));
        assert_eq!(val.as_int(), None);

        let val = DataValue::Int(42);
        assert_eq!(val.as_int(), Some(42));
        assert_eq!(val.as_float(), Some(42.0));
        assert_eq!(val.as_string(), None);
    }

    #[test]
    fn test_nulls_and_blanks() {
        assert!(DataValue::Float(f64::NAN).is_null());
        assert!(DataValue::from("").is_blank());
        assert!(!DataValue::from("").is_null());
        assert_eq!(DataValue::Float(f64::NAN).nan_to_null(), DataValue::Null);
    }

    #[test]
    fn test_structural_equality_for_keys() {
        use std::collections::HashSet;
        let set: HashSet<Vec<DataValue>> =
            [vec![DataValue::Int(1), DataValue::from("a")]].into_iter().collect();
        assert!(set.contains(&vec![DataValue::Int(1), DataValue::from("a")]));
        assert!(!set.contains(&vec![DataValue::Float(1.0), DataValue::from("a")]));
        assert_eq!(DataValue::Float(-0.0), DataValue::Float(0.0));
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(
            DataValue::Int(2).compare(&DataValue::Float(1.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(DataValue::Int(2).compare(&DataValue::from("2")), None);
    }

    #[test]
    fn test_from_records() {
        let dataset = DataSet::from_json(json!([
            {"id": 1, "name": "a"},
            {"id": 2, "tags": ["x", "y"]}
        ]))
        .unwrap();

        assert_eq!(dataset.columns(), ["id", "name", "tags"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.value(1, "name"), Some(&DataValue::Null));
        assert_eq!(
            dataset.value(1, "tags"),
            Some(&DataValue::List(vec!["x".into(), "y".into()]))
        );
    }

    #[test]
    fn test_nested_objects_rejected() {
        let result = DataSet::from_json(json!([{"id": {"nested": true}}]));
        assert!(matches!(result, Err(ValidationError::InvalidData(_))));
    }

    #[test]
    fn test_row_width_checked() {
        let mut dataset = DataSet::with_columns(["a", "b"]);
        assert!(dataset.push_row(vec![DataValue::Int(1)]).is_err());
    }

    #[test]
    fn test_lookup_by_duplicated_label() {
        let dataset = DataSet::from_rows(
            ["id"],
            vec![vec![1.into()], vec![2.into()], vec![3.into()]],
        )
        .unwrap()
        .with_index(vec![10, 11, 10])
        .unwrap();

        assert_eq!(
            dataset.lookup(10, &["id".to_string()]),
            Some(vec![DataValue::Int(1)])
        );
        assert_eq!(dataset.lookup(99, &["id".to_string()]), None);

        let positions = dataset.label_positions();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[&10], 0);
        assert_eq!(positions[&11], 1);
        assert_eq!(
            dataset.values_at(positions[&10], &["id".to_string()]),
            Some(vec![DataValue::Int(1)])
        );
        assert_eq!(dataset.lookup(11, &["missing".to_string()]), None);
    }
}
