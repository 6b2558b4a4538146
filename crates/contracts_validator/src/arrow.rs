//! Conversion between Arrow record batches and datasets.
//!
//! Batches are read into a [`DataSet`] cell by cell and validated like any
//! other table. [`to_arrow_schema`] goes the other way and describes a table
//! schema as an Arrow schema.

use crate::{DataSet, DataValue, Result, ValidationError};
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field as ArrowField, Schema, TimeUnit};
use chrono::DateTime;
use contracts_core::{Field, ItemType, TableSchema};
use std::sync::Arc;
use tracing::warn;

const MILLIS_PER_DAY: i64 = 86_400_000;

fn downcast<'a, T: Array + 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ValidationError::invalid_data(format!("Failed to downcast to {}", name)))
}

fn timestamp(value: Option<DateTime<chrono::Utc>>) -> Result<DataValue> {
    value
        .map(DataValue::DateTime)
        .ok_or_else(|| ValidationError::invalid_data("Invalid timestamp value"))
}

/// Converts one Arrow cell to a [`DataValue`].
pub fn arrow_value(array: &ArrayRef, row: usize) -> Result<DataValue> {
    use arrow_array::array::*;

    if array.is_null(row) {
        return Ok(DataValue::Null);
    }

    match array.data_type() {
        DataType::Boolean => Ok(DataValue::Bool(
            downcast::<BooleanArray>(array, "BooleanArray")?.value(row),
        )),
        DataType::Int8 => Ok(DataValue::Int(
            downcast::<Int8Array>(array, "Int8Array")?.value(row).into(),
        )),
        DataType::Int16 => Ok(DataValue::Int(
            downcast::<Int16Array>(array, "Int16Array")?.value(row).into(),
        )),
        DataType::Int32 => Ok(DataValue::Int(
            downcast::<Int32Array>(array, "Int32Array")?.value(row).into(),
        )),
        DataType::Int64 => Ok(DataValue::Int(
            downcast::<Int64Array>(array, "Int64Array")?.value(row),
        )),
        DataType::UInt8 => Ok(DataValue::Int(
            downcast::<UInt8Array>(array, "UInt8Array")?.value(row).into(),
        )),
        DataType::UInt16 => Ok(DataValue::Int(
            downcast::<UInt16Array>(array, "UInt16Array")?.value(row).into(),
        )),
        DataType::UInt32 => Ok(DataValue::Int(
            downcast::<UInt32Array>(array, "UInt32Array")?.value(row).into(),
        )),
        DataType::UInt64 => {
            let value = downcast::<UInt64Array>(array, "UInt64Array")?.value(row);
            i64::try_from(value).map(DataValue::Int).map_err(|_| {
                ValidationError::invalid_data(format!("{} does not fit a 64-bit integer", value))
            })
        }
        DataType::Float32 => Ok(DataValue::Float(
            downcast::<Float32Array>(array, "Float32Array")?.value(row).into(),
        )),
        DataType::Float64 => Ok(DataValue::Float(
            downcast::<Float64Array>(array, "Float64Array")?.value(row),
        )),
        DataType::Utf8 => Ok(DataValue::String(
            downcast::<StringArray>(array, "StringArray")?
                .value(row)
                .to_string(),
        )),
        DataType::LargeUtf8 => Ok(DataValue::String(
            downcast::<LargeStringArray>(array, "LargeStringArray")?
                .value(row)
                .to_string(),
        )),
        DataType::Timestamp(TimeUnit::Second, _) => {
            let secs = downcast::<TimestampSecondArray>(array, "TimestampSecondArray")?.value(row);
            timestamp(DateTime::from_timestamp(secs, 0))
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let millis = downcast::<TimestampMillisecondArray>(array, "TimestampMillisecondArray")?
                .value(row);
            timestamp(DateTime::from_timestamp_millis(millis))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let micros = downcast::<TimestampMicrosecondArray>(array, "TimestampMicrosecondArray")?
                .value(row);
            timestamp(DateTime::from_timestamp_micros(micros))
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            let nanos = downcast::<TimestampNanosecondArray>(array, "TimestampNanosecondArray")?
                .value(row);
            Ok(DataValue::DateTime(DateTime::from_timestamp_nanos(nanos)))
        }
        DataType::Date32 => {
            let days = downcast::<Date32Array>(array, "Date32Array")?.value(row);
            timestamp(DateTime::from_timestamp_millis(
                i64::from(days) * MILLIS_PER_DAY,
            ))
        }
        DataType::Date64 => {
            let millis = downcast::<Date64Array>(array, "Date64Array")?.value(row);
            timestamp(DateTime::from_timestamp_millis(millis))
        }
        DataType::List(_) => {
            let items = downcast::<ListArray>(array, "ListArray")?.value(row);
            list_values(&items)
        }
        DataType::LargeList(_) => {
            let items = downcast::<LargeListArray>(array, "LargeListArray")?.value(row);
            list_values(&items)
        }
        other => {
            warn!("Unsupported Arrow type for conversion: {:?}", other);
            Err(ValidationError::invalid_data(format!(
                "unsupported Arrow type {}",
                other
            )))
        }
    }
}

fn list_values(items: &ArrayRef) -> Result<DataValue> {
    (0..items.len())
        .map(|i| arrow_value(items, i))
        .collect::<Result<Vec<_>>>()
        .map(DataValue::List)
}

impl TryFrom<&RecordBatch> for DataSet {
    type Error = ValidationError;

    fn try_from(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let mut dataset = DataSet::with_columns(columns);

        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|column| arrow_value(column, row))
                .collect::<Result<Vec<_>>>()?;
            dataset.push_row(values)?;
        }
        Ok(dataset)
    }
}

fn item_data_type(item_type: ItemType) -> DataType {
    match item_type {
        ItemType::String => DataType::Utf8,
        ItemType::Integer => DataType::Int64,
        ItemType::Number => DataType::Float64,
        ItemType::Boolean => DataType::Boolean,
    }
}

/// Arrow type of a field.
pub fn arrow_data_type(field: &Field) -> DataType {
    match field {
        Field::Integer(_) => DataType::Int64,
        Field::Number(_) => DataType::Float64,
        Field::String(_) => DataType::Utf8,
        Field::DateTime(_) => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        Field::List(f) => DataType::List(Arc::new(ArrowField::new(
            "item",
            item_data_type(f.item_type),
            true,
        ))),
    }
}

/// Describes a table schema as an Arrow schema; optional fields are nullable.
pub fn to_arrow_schema(schema: &TableSchema) -> Schema {
    Schema::new(
        schema
            .iter()
            .map(|field| ArrowField::new(field.name(), arrow_data_type(field), !field.required()))
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::builder::{ListBuilder, StringBuilder};
    use arrow_array::{
        BooleanArray, Date32Array, Float64Array, Int32Array, StringArray,
        TimestampMicrosecondArray,
    };
    use contracts_core::{FieldBuilder, FieldType, TableSchemaBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_conversion() {
        let array: ArrayRef = Arc::new(BooleanArray::from(vec![true, false]));
        assert_eq!(arrow_value(&array, 0).unwrap(), DataValue::Bool(true));

        let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(42), None]));
        assert_eq!(arrow_value(&array, 0).unwrap(), DataValue::Int(42));
        assert_eq!(arrow_value(&array, 1).unwrap(), DataValue::Null);

        let array: ArrayRef = Arc::new(StringArray::from(vec!["hello"]));
        assert_eq!(arrow_value(&array, 0).unwrap(), DataValue::from("hello"));
    }

    #[test]
    fn test_temporal_conversion() {
        let array: ArrayRef = Arc::new(TimestampMicrosecondArray::from(vec![1_000_000]));
        assert_eq!(
            arrow_value(&array, 0).unwrap(),
            DataValue::DateTime(DateTime::from_timestamp(1, 0).unwrap())
        );

        let array: ArrayRef = Arc::new(Date32Array::from(vec![1]));
        assert_eq!(
            arrow_value(&array, 0).unwrap(),
            DataValue::DateTime(DateTime::from_timestamp(86_400, 0).unwrap())
        );
    }

    #[test]
    fn test_list_conversion() {
        let mut builder = ListBuilder::new(StringBuilder::new());
        builder.values().append_value("a");
        builder.values().append_value("b");
        builder.append(true);
        let array: ArrayRef = Arc::new(builder.finish());

        assert_eq!(
            arrow_value(&array, 0).unwrap(),
            DataValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_record_batch_to_dataset() {
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("id", DataType::Int32, false),
            ArrowField::new("score", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef,
                Arc::new(Float64Array::from(vec![Some(0.5), None])) as ArrayRef,
            ],
        )
        .unwrap();

        let dataset = DataSet::try_from(&batch).unwrap();
        assert_eq!(dataset.columns(), ["id", "score"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.value(1, "score"), Some(&DataValue::Null));
    }

    #[test]
    fn test_to_arrow_schema() {
        let schema = TableSchemaBuilder::new()
            .field(
                FieldBuilder::new("id", FieldType::Integer)
                    .required(true)
                    .build()
                    .unwrap(),
            )
            .field(
                FieldBuilder::new("tags", FieldType::List)
                    .item_type(ItemType::Number)
                    .build()
                    .unwrap(),
            )
            .field(Field::datetime("ts"))
            .build()
            .unwrap();

        let arrow = to_arrow_schema(&schema);
        let id = arrow.field_with_name("id").unwrap();
        assert_eq!(id.data_type(), &DataType::Int64);
        assert!(!id.is_nullable());

        let tags = arrow.field_with_name("tags").unwrap();
        assert!(tags.is_nullable());
        assert!(matches!(tags.data_type(), DataType::List(item) if item.data_type() == &DataType::Float64));

        assert_eq!(
            arrow.field_with_name("ts").unwrap().data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
        );
    }
}
