//! End-to-end tests for primary and foreign key validation and for the
//! consolidated error list.

use contracts_core::{
    ContractBuilder, Field, FieldBuilder, FieldType, TableSchema, TableSchemaBuilder,
    ValidationOptions,
};
use contracts_validator::{
    DataSet, DataValue, ErrorRecord, FailureValue, KeyContext, SchemaValidationError,
    ValidateData, ValidationError, validate_data,
};
use pretty_assertions::assert_eq;

fn failures(result: Result<(), ValidationError>) -> SchemaValidationError {
    match result {
        Err(ValidationError::Failed(e)) => e,
        other => panic!("Expected data failure, got {:?}", other),
    }
}

fn failing_indices(error: &SchemaValidationError) -> Vec<Option<usize>> {
    error.errors().iter().map(|r| r.index).collect()
}

fn keyed_schema() -> TableSchema {
    TableSchemaBuilder::new()
        .field(Field::integer("a"))
        .field(Field::string("b"))
        .primary_key(["a"])
        .build()
        .unwrap()
}

#[test]
fn test_primary_key_duplicates_within_data() {
    let data = DataSet::from_rows(
        ["a", "b"],
        vec![
            vec![1.into(), "a".into()],
            vec![1.into(), "b".into()],
            vec![2.into(), "c".into()],
        ],
    )
    .unwrap();

    let error = failures(keyed_schema().validate_data(
        &data,
        &KeyContext::new(),
        &ValidationOptions::new(),
    ));
    assert_eq!(failing_indices(&error), vec![Some(0), Some(1)]);
    assert_eq!(
        error.errors()[0],
        ErrorRecord {
            check: "PrimaryKeyError: ['a']".to_string(),
            column: Some("a".to_string()),
            index: Some(0),
            failure_case: FailureValue::Tuple(vec![DataValue::Int(1)]),
        }
    );
}

#[test]
fn test_primary_key_against_existing_keys() {
    let data = DataSet::from_rows(["a"], vec![vec![1.into()], vec![2.into()]]).unwrap();
    let keys = KeyContext::new().with_primary_key_values(vec![vec![DataValue::Int(1)]]);

    let error = failures(keyed_schema().validate_data(&data, &keys, &ValidationOptions::new()));
    assert_eq!(failing_indices(&error), vec![Some(0)]);
}

#[test]
fn test_existing_keys_are_coerced() {
    let data = DataSet::from_rows(["a"], vec![vec!["7".into()]]).unwrap();
    let keys = KeyContext::new().with_primary_key_values(vec![vec![DataValue::from("7")]]);

    let error = failures(keyed_schema().validate_data(&data, &keys, &ValidationOptions::new()));
    assert_eq!(
        error.errors()[0].failure_case,
        FailureValue::Tuple(vec![DataValue::from("7")])
    );
}

#[test]
fn test_foreign_key_against_referenced_values() {
    let schema = TableSchemaBuilder::new()
        .field(Field::integer("region"))
        .foreign_key(["region"], "regions", ["id"])
        .build()
        .unwrap();
    let data = DataSet::from_rows(["region"], vec![vec![10.into()], vec![99.into()]]).unwrap();
    let keys = KeyContext::new().with_foreign_key_values(
        ["region"],
        vec![vec![DataValue::Int(10)], vec![DataValue::Int(11)]],
    );

    let error = failures(schema.validate_data(&data, &keys, &ValidationOptions::new()));
    assert_eq!(failing_indices(&error), vec![Some(1)]);
    assert_eq!(error.errors()[0].check, "ForeignKeyError: ['region']");
}

#[test]
fn test_foreign_key_without_referenced_values() {
    let schema = TableSchemaBuilder::new()
        .field(Field::integer("region"))
        .foreign_key(["region"], "regions", ["id"])
        .build()
        .unwrap();
    let data = DataSet::from_rows(["region"], vec![vec![10.into()]]).unwrap();

    let result = schema.validate_data(&data, &KeyContext::new(), &ValidationOptions::new());
    assert!(matches!(
        result,
        Err(ValidationError::UnresolvableForeignKey { ref fields }) if fields == &["region"]
    ));

    let options = ValidationOptions::new().with_skip_foreign_key_validation(true);
    assert!(schema.validate_data(&data, &KeyContext::new(), &options).is_ok());
}

#[test]
fn test_existing_keys_must_match_key_length() {
    let data = DataSet::from_rows(["a"], vec![vec![1.into()], vec![2.into()]]).unwrap();
    let keys = KeyContext::new()
        .with_primary_key_values(vec![vec![DataValue::Int(1), DataValue::Int(999)]]);

    let result = keyed_schema().validate_data(&data, &keys, &ValidationOptions::new());
    assert!(matches!(result, Err(ValidationError::InvalidData(_))));
}

#[test]
fn test_self_reference() {
    let schema = TableSchemaBuilder::new()
        .field(Field::integer("id"))
        .field(Field::integer("parent"))
        .primary_key(["id"])
        .self_reference(["parent"], ["id"])
        .build()
        .unwrap();
    let contract = ContractBuilder::new("tree", schema).build().unwrap();

    let valid = DataSet::from_json(serde_json::json!([
        {"id": 1, "parent": null},
        {"id": 2, "parent": 1}
    ]))
    .unwrap();
    assert!(
        contract
            .validate_data(&valid, &KeyContext::new(), &ValidationOptions::new())
            .is_ok()
    );

    let invalid = DataSet::from_json(serde_json::json!([
        {"id": 1, "parent": null},
        {"id": 2, "parent": 99}
    ]))
    .unwrap();
    let error = failures(contract.validate_data(
        &invalid,
        &KeyContext::new(),
        &ValidationOptions::new(),
    ));
    assert_eq!(error.errors().len(), 1);
    assert_eq!(error.errors()[0].check, "ForeignKeyError: ['parent']");
    assert_eq!(error.errors()[0].index, Some(1));
}

#[test]
fn test_composite_foreign_key_collapses_to_tuple() {
    let schema = TableSchemaBuilder::new()
        .field(Field::string("a"))
        .field(Field::integer("b"))
        .foreign_key(["a", "b"], "targets", ["x", "y"])
        .build()
        .unwrap();
    let data = DataSet::from_json(serde_json::json!([
        {"a": "k", "b": 1},
        {"a": "k", "b": "2"}
    ]))
    .unwrap();
    let keys = KeyContext::new()
        .with_foreign_key_values(["a", "b"], vec![vec!["k".into(), DataValue::Int(1)]]);

    let error = failures(validate_data(&schema, &data, &keys, &ValidationOptions::new()));
    assert_eq!(error.failure_cases().len(), 2);
    assert_eq!(
        error.errors(),
        [ErrorRecord {
            check: "ForeignKeyError: ['a', 'b']".to_string(),
            column: Some("a, b".to_string()),
            index: Some(1),
            failure_case: FailureValue::Tuple(vec!["k".into(), "2".into()]),
        }]
    );
}

#[test]
fn test_failures_use_index_labels() {
    let data = DataSet::from_rows(["a"], vec![vec![5.into()], vec![5.into()]])
        .unwrap()
        .with_index(vec![100, 200])
        .unwrap();

    let error = failures(keyed_schema().validate_data(
        &data,
        &KeyContext::new(),
        &ValidationOptions::new(),
    ));
    assert_eq!(failing_indices(&error), vec![Some(100), Some(200)]);
}

#[test]
fn test_coercion_failure_hides_dtype_failure() {
    let schema = TableSchemaBuilder::new()
        .field(
            FieldBuilder::new("amount", FieldType::Number)
                .minimum(0)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let data = DataSet::from_json(serde_json::json!([{"amount": 1.5}, {"amount": "n/a"}])).unwrap();

    let error = failures(validate_data(
        &schema,
        &data,
        &KeyContext::new(),
        &ValidationOptions::new(),
    ));
    let raw: Vec<&str> = error.failure_cases().iter().map(|c| c.check.as_str()).collect();
    assert_eq!(raw, vec!["coerce_dtype('float64')", "dtype('float64')"]);
    assert_eq!(
        error.errors(),
        [ErrorRecord {
            check: "coerce_dtype('float64')".to_string(),
            column: Some("amount".to_string()),
            index: Some(1),
            failure_case: FailureValue::Value("n/a".into()),
        }]
    );
}

#[test]
fn test_errors_are_cached() {
    let data = DataSet::from_rows(["a"], vec![vec![1.into()], vec![1.into()]]).unwrap();
    let error = failures(keyed_schema().validate_data(
        &data,
        &KeyContext::new(),
        &ValidationOptions::new(),
    ));
    assert!(std::ptr::eq(error.errors(), error.errors()));
}

#[test]
fn test_unsupported_backend_is_configuration_error() {
    let data = DataSet::from_rows(["a"], vec![vec![1.into()]]).unwrap();
    let options = ValidationOptions::new().with_backend("dask");

    let result = keyed_schema().validate_data(&data, &KeyContext::new(), &options);
    assert!(matches!(result, Err(ValidationError::UnsupportedBackend(ref name)) if name == "dask"));
}

#[test]
fn test_error_list_serializes_as_records() {
    let data = DataSet::from_rows(["a"], vec![vec![1.into()], vec![1.into()]]).unwrap();
    let error = failures(keyed_schema().validate_data(
        &data,
        &KeyContext::new(),
        &ValidationOptions::new(),
    ));
    let json = serde_json::to_value(error.errors()).unwrap();
    assert_eq!(
        json[1],
        serde_json::json!({
            "check": "PrimaryKeyError: ['a']",
            "column": "a",
            "index": 1,
            "failure_case": [1]
        })
    );
}
