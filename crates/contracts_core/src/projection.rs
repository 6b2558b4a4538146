//! One-way projections of a schema into other representations.
//!
//! - [`TableSchema::to_column_specs`]: parameters for the tabular validation backend
//! - [`TableSchema::to_json_schema`]: a JSON Schema document describing one row
//! - [`TableSchema::to_sql_table`]: a relational table definition

use crate::{ColumnSpec, Field, SYNTHETIC_KEY, TableSchema};
use serde_json::{Map, Value, json};

/// Prefix of generated relational table names.
pub const SQL_TABLE_PREFIX: &str = "dct_";

/// Relational table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTable {
    /// Table name
    pub name: String,
    /// Columns, starting with the synthetic key
    pub columns: Vec<SqlColumn>,
    /// Declared primary key, rendered as a unique constraint
    pub unique: Vec<String>,
}

/// One column of a [`SqlTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct SqlColumn {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
}

impl SqlTable {
    /// Renders a `CREATE TABLE` statement.
    pub fn to_ddl(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut line = format!("    \"{}\" {}", c.name, c.sql_type);
                if c.primary_key {
                    line.push_str(" PRIMARY KEY");
                } else {
                    if !c.nullable {
                        line.push_str(" NOT NULL");
                    }
                    if c.unique {
                        line.push_str(" UNIQUE");
                    }
                }
                line
            })
            .collect();
        if !self.unique.is_empty() {
            let cols: Vec<String> = self.unique.iter().map(|c| format!("\"{}\"", c)).collect();
            lines.push(format!("    UNIQUE ({})", cols.join(", ")));
        }

        let mut ddl = format!("CREATE TABLE \"{}\" (\n", self.name);
        ddl.push_str(&lines.join(",\n"));
        ddl.push_str("\n);");
        ddl
    }
}

fn json_type(field: &Field) -> Value {
    let mut schema = Map::new();
    match field {
        Field::Integer(_) => {
            schema.insert("type".into(), json!("integer"));
        }
        Field::Number(_) => {
            schema.insert("type".into(), json!("number"));
        }
        Field::String(f) => {
            schema.insert("type".into(), json!("string"));
            if let Some(pattern) = &f.constraints.pattern {
                schema.insert("pattern".into(), json!(pattern));
            }
            if let Some(min) = f.constraints.min_length {
                schema.insert("minLength".into(), json!(min));
            }
            if let Some(max) = f.constraints.max_length {
                schema.insert("maxLength".into(), json!(max));
            }
        }
        Field::DateTime(_) => {
            schema.insert("type".into(), json!("string"));
            schema.insert("format".into(), json!("date-time"));
        }
        Field::List(f) => {
            schema.insert("type".into(), json!("array"));
            schema.insert("items".into(), json!({"type": f.item_type.as_str()}));
            if let Some(min) = f.constraints.min_length {
                schema.insert("minItems".into(), json!(min));
            }
            if let Some(max) = f.constraints.max_length {
                schema.insert("maxItems".into(), json!(max));
            }
        }
    }

    // `minimum`/`maximum` only apply to numbers; formatted strings use the
    // `format*` bounds instead.
    let (min_keyword, max_keyword) = match field {
        Field::DateTime(_) => ("formatMinimum", "formatMaximum"),
        _ => ("minimum", "maximum"),
    };
    let (ge, le) = field.bounds();
    if let Some(min) = ge {
        schema.insert(min_keyword.into(), json!(min));
    }
    if let Some(max) = le {
        schema.insert(max_keyword.into(), json!(max));
    }
    if let Some(values) = field.enum_values() {
        let mut values: Vec<Value> = values.iter().map(|v| json!(v)).collect();
        if !field.required() {
            values.push(Value::Null);
        }
        schema.insert("enum".into(), Value::Array(values));
    }
    if let Some(title) = field.title() {
        schema.insert("title".into(), json!(title));
    }
    if let Some(description) = field.description() {
        schema.insert("description".into(), json!(description));
    }

    if field.required() {
        Value::Object(schema)
    } else {
        // Optional fields accept null alongside the declared type.
        let base = schema.remove("type").unwrap_or(Value::Null);
        schema.insert("type".into(), json!([base, "null"]));
        Value::Object(schema)
    }
}

impl TableSchema {
    /// Column parameters for every field, in declaration order.
    pub fn to_column_specs(&self) -> Vec<ColumnSpec> {
        self.iter().map(Field::column_spec).collect()
    }

    /// JSON Schema (draft 2020-12) describing one row.
    pub fn to_json_schema(&self, name: &str) -> Value {
        let properties: Map<String, Value> = self
            .iter()
            .map(|f| (f.name().to_string(), json_type(f)))
            .collect();
        let required: Vec<&str> = self
            .iter()
            .filter(|f| f.required())
            .map(Field::name)
            .collect();

        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "title": name,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Relational table named `dct_<name>` with an injected `_id` key.
    pub fn to_sql_table(&self, name: &str) -> SqlTable {
        let mut columns = vec![SqlColumn {
            name: SYNTHETIC_KEY.to_string(),
            sql_type: "BIGINT GENERATED ALWAYS AS IDENTITY".to_string(),
            nullable: false,
            unique: true,
            primary_key: true,
        }];
        columns.extend(self.iter().map(|f| SqlColumn {
            name: f.name().to_string(),
            sql_type: f.sql_type(),
            nullable: !f.required(),
            unique: f.unique(),
            primary_key: false,
        }));

        SqlTable {
            name: format!("{}{}", SQL_TABLE_PREFIX, name),
            columns,
            unique: self.primary_key().fields().to_vec(),
        }
    }
}
