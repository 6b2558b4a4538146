//! Typed field definitions and their constraints.
//!
//! A field is one of five variants (integer, number, string, datetime, list),
//! discriminated by its `type` tag. Each variant owns a constraint object whose
//! shape depends on the variant; the common part (`required`, `unique`) governs
//! nullability and uniqueness for every variant.
//!
//! Besides declaring columns, every field knows how to project itself into
//! the parameters of other representations:
//!
//! - [`Field::type_hint`] and [`Field::model_field_spec`] for an object-validation model,
//! - [`Field::column_spec`] for the tabular validation backend,
//! - [`Field::sql_type`] for a relational table definition.

use crate::datetime::{DEFAULT_DATETIME_FORMAT, parse_datetime};
use crate::{ContractError, Result, validate_field_name};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Field {
    /// Whole numbers
    Integer(IntegerField),
    /// Floating point numbers
    Number(NumberField),
    /// Text
    String(StringField),
    /// Points in time, normalized to UTC
    DateTime(DateTimeField),
    /// Homogeneous lists of scalars
    List(ListField),
}

/// An integer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntegerField {
    /// Field name, unique within the schema
    #[serde(deserialize_with = "crate::names::trimmed")]
    pub name: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value constraints
    #[serde(default)]
    pub constraints: NumericConstraints<i64>,
}

/// A floating point field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumberField {
    /// Field name, unique within the schema
    #[serde(deserialize_with = "crate::names::trimmed")]
    pub name: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value constraints
    #[serde(default)]
    pub constraints: NumericConstraints<f64>,
}

/// A text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StringField {
    /// Field name, unique within the schema
    #[serde(deserialize_with = "crate::names::trimmed")]
    pub name: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value constraints
    #[serde(default)]
    pub constraints: StringConstraints,
}

/// A datetime field.
///
/// Values are parsed with `format` (strftime syntax) and normalized to UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateTimeField {
    /// Field name, unique within the schema
    #[serde(deserialize_with = "crate::names::trimmed")]
    pub name: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// strftime-style format of textual values
    #[serde(default = "default_datetime_format")]
    pub format: String,
    /// Value constraints
    #[serde(default)]
    pub constraints: DateTimeConstraints,
}

/// A list field whose elements share one scalar type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListField {
    /// Field name, unique within the schema
    #[serde(deserialize_with = "crate::names::trimmed")]
    pub name: String,
    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Element type
    #[serde(default, rename = "itemType")]
    pub item_type: ItemType,
    /// Value constraints
    #[serde(default)]
    pub constraints: ListConstraints,
}

fn default_datetime_format() -> String {
    DEFAULT_DATETIME_FORMAT.to_string()
}

/// Constraints for integer and number fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumericConstraints<T> {
    /// Whether every row must hold a value
    pub required: bool,
    /// Whether values must be unique
    pub unique: bool,
    /// Inclusive lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<T>,
    /// Inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<T>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<T>>,
}

impl<T> Default for NumericConstraints<T> {
    fn default() -> Self {
        Self {
            required: false,
            unique: false,
            minimum: None,
            maximum: None,
            allowed: None,
        }
    }
}

/// Constraints for string fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StringConstraints {
    /// Whether every row must hold a value
    pub required: bool,
    /// Whether values must be unique
    pub unique: bool,
    /// Regular expression every value must match from its start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum number of characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum number of characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

/// Constraints for datetime fields.
///
/// Bounds are written in the owning field's `format`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateTimeConstraints {
    /// Whether every row must hold a value
    pub required: bool,
    /// Whether values must be unique
    pub unique: bool,
    /// Earliest allowed value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    /// Latest allowed value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
}

/// Constraints for list fields.
///
/// Length bounds count elements, not characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ListConstraints {
    /// Whether every row must hold a value
    pub required: bool,
    /// Whether values must be unique
    pub unique: bool,
    /// Minimum number of elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum number of elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Element type of a list field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Text elements
    #[default]
    String,
    /// Integer elements
    Integer,
    /// Floating point elements
    Number,
    /// Boolean elements
    Boolean,
}

impl ItemType {
    /// Scalar type of the elements.
    pub fn scalar_type(self) -> ScalarType {
        match self {
            ItemType::String => ScalarType::String,
            ItemType::Integer => ScalarType::Integer,
            ItemType::Number => ScalarType::Number,
            ItemType::Boolean => ScalarType::Boolean,
        }
    }

    /// Relational element type.
    pub fn sql_type(self) -> &'static str {
        match self {
            ItemType::String => "TEXT",
            ItemType::Integer => "BIGINT",
            ItemType::Number => "DOUBLE PRECISION",
            ItemType::Boolean => "BOOLEAN",
        }
    }

    /// Declared name of the item type.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::String => "string",
            ItemType::Integer => "integer",
            ItemType::Number => "number",
            ItemType::Boolean => "boolean",
        }
    }
}

/// Declared type tag of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `string`
    String,
    /// `datetime`
    DateTime,
    /// `list`
    List,
}

impl FieldType {
    /// The declared discriminator value.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::DateTime => "datetime",
            FieldType::List => "list",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wire-representable Rust type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `i64`
    Integer,
    /// `f64`
    Number,
    /// `String`
    String,
    /// `bool`
    Boolean,
    /// `DateTime<Utc>`
    DateTime,
    /// `Vec<_>` of the item type
    List(ItemType),
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Integer => f.write_str("i64"),
            ScalarType::Number => f.write_str("f64"),
            ScalarType::String => f.write_str("String"),
            ScalarType::Boolean => f.write_str("bool"),
            ScalarType::DateTime => f.write_str("DateTime<Utc>"),
            ScalarType::List(item) => write!(f, "Vec<{}>", item.scalar_type()),
        }
    }
}

/// Column dtype used by the tabular validation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Nullable 64-bit integers
    Int64,
    /// 64-bit floats
    Float64,
    /// Text
    String,
    /// UTC timestamps
    DateTime,
    /// Lists of the item type
    List(ItemType),
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Int64 => f.write_str("Int64"),
            DType::Float64 => f.write_str("float64"),
            DType::String => f.write_str("str"),
            DType::DateTime => f.write_str("datetime64[ns, UTC]"),
            DType::List(item) => write!(f, "list[{}]", item.as_str()),
        }
    }
}

/// A constant appearing in constraints (bounds, enum literals).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer literal
    Integer(i64),
    /// Floating point literal
    Number(f64),
    /// Text literal
    String(String),
    /// Datetime literal (UTC)
    DateTime(DateTime<Utc>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Number(n) => write!(f, "{:?}", n),
            Scalar::String(s) => write!(f, "'{}'", s),
            Scalar::DateTime(dt) => write!(f, "'{}'", dt.to_rfc3339()),
        }
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::DateTime(value)
    }
}

/// Effective value domain of a field, as used by typed models.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeHint {
    /// Underlying domain
    pub kind: TypeHintKind,
    /// Whether null is part of the domain
    pub nullable: bool,
}

/// Domain part of a [`TypeHint`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeHintKind {
    /// Any value of the scalar type
    Scalar(ScalarType),
    /// Exactly one of the listed literals
    Enum(Vec<Scalar>),
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = match &self.kind {
            TypeHintKind::Scalar(t) => t.to_string(),
            TypeHintKind::Enum(literals) => {
                let parts: Vec<String> = literals.iter().map(|l| l.to_string()).collect();
                format!("Literal[{}]", parts.join(", "))
            }
        };
        if self.nullable {
            write!(f, "Option<{}>", inner)
        } else {
            f.write_str(&inner)
        }
    }
}

/// Keyword parameters for an equivalent field in an object-validation model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelFieldSpec {
    /// Field name
    pub name: String,
    /// Human-readable title
    pub title: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Default value; `Some(Null)` marks an optional field
    pub default: Option<serde_json::Value>,
    /// Literal-enum override of the type
    pub enum_values: Option<Vec<Scalar>>,
    /// Inclusive lower bound
    pub ge: Option<Scalar>,
    /// Inclusive upper bound
    pub le: Option<Scalar>,
    /// Minimum length (characters or elements)
    pub min_length: Option<usize>,
    /// Maximum length (characters or elements)
    pub max_length: Option<usize>,
    /// Regular expression
    pub pattern: Option<String>,
    /// Uniqueness marker
    pub unique: bool,
}

/// Keyword parameters for an equivalent column in the tabular validation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Column dtype values are coerced to
    pub dtype: DType,
    /// Human-readable title
    pub title: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Whether the column must be present
    pub required: bool,
    /// Whether null values are accepted
    pub nullable: bool,
    /// Whether values must be unique
    pub unique: bool,
    /// Regular expression every value must match from its start
    pub regex: Option<String>,
    /// Value checks
    pub checks: Vec<CheckSpec>,
}

/// A value check attached to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckSpec {
    /// Value is one of the literals
    IsIn(Vec<Scalar>),
    /// Value is at least the bound
    GreaterThanOrEqualTo(Scalar),
    /// Value is at most the bound
    LessThanOrEqualTo(Scalar),
    /// Character count within bounds
    StrLength {
        /// Inclusive minimum
        min: Option<usize>,
        /// Inclusive maximum
        max: Option<usize>,
    },
    /// Element count within bounds
    ListLength {
        /// Inclusive minimum
        min: Option<usize>,
        /// Inclusive maximum
        max: Option<usize>,
    },
}

impl CheckSpec {
    /// Name reported for failures of this check.
    pub fn name(&self) -> String {
        match self {
            CheckSpec::IsIn(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("isin([{}])", parts.join(", "))
            }
            CheckSpec::GreaterThanOrEqualTo(v) => format!("greater_than_or_equal_to({})", v),
            CheckSpec::LessThanOrEqualTo(v) => format!("less_than_or_equal_to({})", v),
            CheckSpec::StrLength { min, max } => {
                format!("str_length({}, {})", opt_to_string(min), opt_to_string(max))
            }
            CheckSpec::ListLength { min, max } => {
                format!("list_length({}, {})", opt_to_string(min), opt_to_string(max))
            }
        }
    }
}

fn opt_to_string(value: &Option<usize>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

impl Field {
    /// Creates an integer field with default constraints.
    pub fn integer(name: impl Into<String>) -> Self {
        Field::Integer(IntegerField {
            name: name.into(),
            title: None,
            description: None,
            constraints: NumericConstraints::default(),
        })
    }

    /// Creates a number field with default constraints.
    pub fn number(name: impl Into<String>) -> Self {
        Field::Number(NumberField {
            name: name.into(),
            title: None,
            description: None,
            constraints: NumericConstraints::default(),
        })
    }

    /// Creates a string field with default constraints.
    pub fn string(name: impl Into<String>) -> Self {
        Field::String(StringField {
            name: name.into(),
            title: None,
            description: None,
            constraints: StringConstraints::default(),
        })
    }

    /// Creates a datetime field with the default format.
    pub fn datetime(name: impl Into<String>) -> Self {
        Field::DateTime(DateTimeField {
            name: name.into(),
            title: None,
            description: None,
            format: default_datetime_format(),
            constraints: DateTimeConstraints::default(),
        })
    }

    /// Creates a list field of the given item type.
    pub fn list(name: impl Into<String>, item_type: ItemType) -> Self {
        Field::List(ListField {
            name: name.into(),
            title: None,
            description: None,
            item_type,
            constraints: ListConstraints::default(),
        })
    }

    /// Field name.
    pub fn name(&self) -> &str {
        match self {
            Field::Integer(f) => &f.name,
            Field::Number(f) => &f.name,
            Field::String(f) => &f.name,
            Field::DateTime(f) => &f.name,
            Field::List(f) => &f.name,
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> Option<&str> {
        match self {
            Field::Integer(f) => f.title.as_deref(),
            Field::Number(f) => f.title.as_deref(),
            Field::String(f) => f.title.as_deref(),
            Field::DateTime(f) => f.title.as_deref(),
            Field::List(f) => f.title.as_deref(),
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> Option<&str> {
        match self {
            Field::Integer(f) => f.description.as_deref(),
            Field::Number(f) => f.description.as_deref(),
            Field::String(f) => f.description.as_deref(),
            Field::DateTime(f) => f.description.as_deref(),
            Field::List(f) => f.description.as_deref(),
        }
    }

    /// Whether every row must hold a value.
    pub fn required(&self) -> bool {
        match self {
            Field::Integer(f) => f.constraints.required,
            Field::Number(f) => f.constraints.required,
            Field::String(f) => f.constraints.required,
            Field::DateTime(f) => f.constraints.required,
            Field::List(f) => f.constraints.required,
        }
    }

    /// Whether values must be unique.
    pub fn unique(&self) -> bool {
        match self {
            Field::Integer(f) => f.constraints.unique,
            Field::Number(f) => f.constraints.unique,
            Field::String(f) => f.constraints.unique,
            Field::DateTime(f) => f.constraints.unique,
            Field::List(f) => f.constraints.unique,
        }
    }

    /// Declared type tag.
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Integer(_) => FieldType::Integer,
            Field::Number(_) => FieldType::Number,
            Field::String(_) => FieldType::String,
            Field::DateTime(_) => FieldType::DateTime,
            Field::List(_) => FieldType::List,
        }
    }

    /// Rust type of a single value.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Field::Integer(_) => ScalarType::Integer,
            Field::Number(_) => ScalarType::Number,
            Field::String(_) => ScalarType::String,
            Field::DateTime(_) => ScalarType::DateTime,
            Field::List(f) => ScalarType::List(f.item_type),
        }
    }

    /// Tabular dtype.
    pub fn dtype(&self) -> DType {
        match self {
            Field::Integer(_) => DType::Int64,
            Field::Number(_) => DType::Float64,
            Field::String(_) => DType::String,
            Field::DateTime(_) => DType::DateTime,
            Field::List(f) => DType::List(f.item_type),
        }
    }

    /// Relational column type.
    pub fn sql_type(&self) -> String {
        match self {
            Field::Integer(_) => "BIGINT".to_string(),
            Field::Number(_) => "DOUBLE PRECISION".to_string(),
            Field::String(_) => "TEXT".to_string(),
            Field::DateTime(_) => "TIMESTAMP WITH TIME ZONE".to_string(),
            Field::List(f) => format!("{}[]", f.item_type.sql_type()),
        }
    }

    /// Allowed values, if an `enum` constraint is declared.
    pub fn enum_values(&self) -> Option<Vec<Scalar>> {
        match self {
            Field::Integer(f) => f
                .constraints
                .allowed
                .as_ref()
                .map(|v| v.iter().copied().map(Scalar::Integer).collect()),
            Field::Number(f) => f
                .constraints
                .allowed
                .as_ref()
                .map(|v| v.iter().copied().map(Scalar::Number).collect()),
            Field::String(f) => f
                .constraints
                .allowed
                .as_ref()
                .map(|v| v.iter().cloned().map(Scalar::String).collect()),
            Field::DateTime(_) | Field::List(_) => None,
        }
    }

    /// Effective value domain: the enum literals when declared, the scalar
    /// type otherwise; nullable unless `required`.
    pub fn type_hint(&self) -> TypeHint {
        let kind = match self.enum_values() {
            Some(literals) => TypeHintKind::Enum(literals),
            None => TypeHintKind::Scalar(self.scalar_type()),
        };
        TypeHint {
            kind,
            nullable: !self.required(),
        }
    }

    /// Inclusive lower and upper bounds, parsed into literals.
    pub fn bounds(&self) -> (Option<Scalar>, Option<Scalar>) {
        match self {
            Field::Integer(f) => (
                f.constraints.minimum.map(Scalar::Integer),
                f.constraints.maximum.map(Scalar::Integer),
            ),
            Field::Number(f) => (
                f.constraints.minimum.map(Scalar::Number),
                f.constraints.maximum.map(Scalar::Number),
            ),
            Field::DateTime(f) => (
                f.minimum().ok().flatten().map(Scalar::DateTime),
                f.maximum().ok().flatten().map(Scalar::DateTime),
            ),
            Field::String(_) | Field::List(_) => (None, None),
        }
    }

    /// Length bounds (characters for strings, elements for lists).
    pub fn length_bounds(&self) -> (Option<usize>, Option<usize>) {
        match self {
            Field::String(f) => (f.constraints.min_length, f.constraints.max_length),
            Field::List(f) => (f.constraints.min_length, f.constraints.max_length),
            _ => (None, None),
        }
    }

    /// Regular expression constraint.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Field::String(f) => f.constraints.pattern.as_deref(),
            _ => None,
        }
    }

    /// Parameters for an equivalent object-validation model field.
    pub fn model_field_spec(&self) -> ModelFieldSpec {
        let (ge, le) = self.bounds();
        let (min_length, max_length) = self.length_bounds();
        ModelFieldSpec {
            name: self.name().to_string(),
            title: self.title().map(str::to_string),
            description: self.description().map(str::to_string),
            default: (!self.required()).then_some(serde_json::Value::Null),
            enum_values: self.enum_values(),
            ge,
            le,
            min_length,
            max_length,
            pattern: self.pattern().map(str::to_string),
            unique: self.unique(),
        }
    }

    /// Parameters for an equivalent column in the tabular validation backend.
    pub fn column_spec(&self) -> ColumnSpec {
        let mut checks = Vec::new();
        if let Some(values) = self.enum_values() {
            checks.push(CheckSpec::IsIn(values));
        }
        let (ge, le) = self.bounds();
        if let Some(min) = ge {
            checks.push(CheckSpec::GreaterThanOrEqualTo(min));
        }
        if let Some(max) = le {
            checks.push(CheckSpec::LessThanOrEqualTo(max));
        }
        let (min, max) = self.length_bounds();
        if min.is_some() || max.is_some() {
            match self {
                Field::List(_) => checks.push(CheckSpec::ListLength { min, max }),
                _ => checks.push(CheckSpec::StrLength { min, max }),
            }
        }

        ColumnSpec {
            name: self.name().to_string(),
            dtype: self.dtype(),
            title: self.title().map(str::to_string),
            description: self.description().map(str::to_string),
            required: self.required(),
            nullable: !self.required(),
            unique: self.unique(),
            regex: self.pattern().map(str::to_string),
            checks,
        }
    }

    /// Checks the field name and the well-formedness of its constraints.
    pub fn validate(&self) -> Result<()> {
        validate_field_name(self.name())?;
        let name = self.name();
        match self {
            Field::Integer(f) => check_numeric(name, &f.constraints),
            Field::Number(f) => check_numeric(name, &f.constraints),
            Field::String(f) => {
                let c = &f.constraints;
                if let Some(pattern) = &c.pattern {
                    Regex::new(pattern).map_err(|e| {
                        ContractError::constraint(name, format!("invalid pattern: {}", e))
                    })?;
                }
                check_lengths(name, c.min_length, c.max_length)?;
                check_enum(name, c.allowed.as_deref())
            }
            Field::DateTime(f) => {
                let min = f.minimum()?;
                let max = f.maximum()?;
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(ContractError::constraint(
                            name,
                            "minimum must not be greater than maximum",
                        ));
                    }
                }
                Ok(())
            }
            Field::List(f) => check_lengths(name, f.constraints.min_length, f.constraints.max_length),
        }
    }
}

impl DateTimeField {
    /// Parses a textual value with this field's format.
    pub fn parse(&self, value: &str) -> Result<DateTime<Utc>> {
        parse_datetime(value, &self.format)
    }

    /// Normalizes a loosely typed value to a UTC datetime.
    ///
    /// Strings are parsed with the field's format; null stays absent; any
    /// other type is a type error.
    pub fn normalize(&self, value: &serde_json::Value) -> Result<Option<DateTime<Utc>>> {
        match value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(s) => self.parse(s).map(Some),
            other => Err(ContractError::value_type(
                &self.name,
                "string or datetime",
                json_type_name(other),
            )),
        }
    }

    /// Parsed lower bound.
    pub fn minimum(&self) -> Result<Option<DateTime<Utc>>> {
        self.constraints
            .minimum
            .as_deref()
            .map(|m| self.parse(m))
            .transpose()
    }

    /// Parsed upper bound.
    pub fn maximum(&self) -> Result<Option<DateTime<Utc>>> {
        self.constraints
            .maximum
            .as_deref()
            .map(|m| self.parse(m))
            .transpose()
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn check_numeric<T: PartialOrd>(name: &str, c: &NumericConstraints<T>) -> Result<()> {
    if let (Some(min), Some(max)) = (&c.minimum, &c.maximum) {
        if min > max {
            return Err(ContractError::constraint(
                name,
                "minimum must not be greater than maximum",
            ));
        }
    }
    check_enum(name, c.allowed.as_deref())
}

fn check_lengths(name: &str, min: Option<usize>, max: Option<usize>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ContractError::constraint(
                name,
                "minLength must not be greater than maxLength",
            ));
        }
    }
    Ok(())
}

fn check_enum<T>(name: &str, allowed: Option<&[T]>) -> Result<()> {
    match allowed {
        Some([]) => Err(ContractError::constraint(name, "enum must not be empty")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field_from_json(value: serde_json::Value) -> Result<Field> {
        Ok(serde_json::from_value(value)?)
    }

    #[test]
    fn test_discriminated_deserialization() {
        let field = field_from_json(serde_json::json!({
            "name": "population",
            "type": "integer",
            "constraints": {"required": true, "minimum": 0}
        }))
        .unwrap();
        assert_eq!(field.field_type(), FieldType::Integer);
        assert!(field.required());
        assert_eq!(field.bounds(), (Some(Scalar::Integer(0)), None));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = field_from_json(serde_json::json!({"name": "x", "type": "decimal"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_constraint_is_rejected() {
        let result = field_from_json(serde_json::json!({
            "name": "x",
            "type": "integer",
            "constraints": {"pattern": "^a"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_defaults_to_string_items() {
        let field = field_from_json(serde_json::json!({"name": "tags", "type": "list"})).unwrap();
        assert_eq!(field.scalar_type(), ScalarType::List(ItemType::String));
        assert_eq!(field.sql_type(), "TEXT[]");
        assert_eq!(field.dtype().to_string(), "list[string]");
    }

    #[test]
    fn test_type_hint_optional_scalar() {
        let hint = Field::number("share").type_hint();
        assert_eq!(hint.kind, TypeHintKind::Scalar(ScalarType::Number));
        assert!(hint.nullable);
        assert_eq!(hint.to_string(), "Option<f64>");
    }

    #[test]
    fn test_type_hint_enum_override() {
        let field = field_from_json(serde_json::json!({
            "name": "unit",
            "type": "string",
            "constraints": {"required": true, "enum": ["MWh", "GWh"]}
        }))
        .unwrap();
        let hint = field.type_hint();
        assert!(!hint.nullable);
        assert_eq!(
            hint.kind,
            TypeHintKind::Enum(vec![Scalar::from("MWh"), Scalar::from("GWh")])
        );
        assert_eq!(hint.to_string(), "Literal['MWh', 'GWh']");
    }

    #[test]
    fn test_model_field_spec() {
        let field = field_from_json(serde_json::json!({
            "name": "code",
            "type": "string",
            "title": "Code",
            "constraints": {"pattern": "^[A-Z]+$", "minLength": 2, "maxLength": 3, "unique": true}
        }))
        .unwrap();
        let spec = field.model_field_spec();
        assert_eq!(spec.title.as_deref(), Some("Code"));
        assert_eq!(spec.default, Some(serde_json::Value::Null));
        assert_eq!(spec.pattern.as_deref(), Some("^[A-Z]+$"));
        assert_eq!(spec.min_length, Some(2));
        assert_eq!(spec.max_length, Some(3));
        assert!(spec.unique);
    }

    #[test]
    fn test_required_field_has_no_default() {
        let field = field_from_json(serde_json::json!({
            "name": "id",
            "type": "integer",
            "constraints": {"required": true}
        }))
        .unwrap();
        assert_eq!(field.model_field_spec().default, None);
    }

    #[test]
    fn test_column_spec_checks() {
        let field = field_from_json(serde_json::json!({
            "name": "value",
            "type": "number",
            "constraints": {"minimum": 0.0, "maximum": 100.0, "enum": [1.5, 2.5]}
        }))
        .unwrap();
        let spec = field.column_spec();
        assert_eq!(spec.dtype, DType::Float64);
        assert!(spec.nullable);
        assert!(!spec.required);
        let names: Vec<String> = spec.checks.iter().map(CheckSpec::name).collect();
        assert_eq!(
            names,
            vec![
                "isin([1.5, 2.5])",
                "greater_than_or_equal_to(0.0)",
                "less_than_or_equal_to(100.0)"
            ]
        );
    }

    #[test]
    fn test_list_length_check() {
        let field = field_from_json(serde_json::json!({
            "name": "codes",
            "type": "list",
            "itemType": "integer",
            "constraints": {"minLength": 1}
        }))
        .unwrap();
        assert_eq!(
            field.column_spec().checks,
            vec![CheckSpec::ListLength { min: Some(1), max: None }]
        );
    }

    #[test]
    fn test_datetime_bounds_use_format() {
        let field = field_from_json(serde_json::json!({
            "name": "ts",
            "type": "datetime",
            "format": "%Y-%m-%d",
            "constraints": {"minimum": "2020-01-01", "maximum": "2020-12-31"}
        }))
        .unwrap();
        assert!(field.validate().is_ok());
        let (min, max) = field.bounds();
        assert!(matches!(min, Some(Scalar::DateTime(_))));
        assert!(matches!(max, Some(Scalar::DateTime(_))));
    }

    #[test]
    fn test_datetime_bounds_not_matching_format() {
        let field = field_from_json(serde_json::json!({
            "name": "ts",
            "type": "datetime",
            "constraints": {"minimum": "2020-01-01"}
        }))
        .unwrap();
        assert!(matches!(
            field.validate(),
            Err(ContractError::DateTimeParse { .. })
        ));
    }

    #[test]
    fn test_datetime_normalize() {
        let Field::DateTime(field) = Field::datetime("ts") else {
            panic!("Expected datetime field");
        };
        assert!(field.normalize(&serde_json::Value::Null).unwrap().is_none());
        assert!(
            field
                .normalize(&serde_json::json!("2021-05-04 10:00"))
                .unwrap()
                .is_some()
        );
        assert!(matches!(
            field.normalize(&serde_json::json!(12)),
            Err(ContractError::InvalidValueType { .. })
        ));
    }

    #[test]
    fn test_invalid_constraints() {
        let empty_enum = field_from_json(serde_json::json!({
            "name": "s",
            "type": "string",
            "constraints": {"enum": []}
        }))
        .unwrap();
        assert!(empty_enum.validate().is_err());

        let bad_pattern = field_from_json(serde_json::json!({
            "name": "s",
            "type": "string",
            "constraints": {"pattern": "[unclosed"}
        }))
        .unwrap();
        assert!(bad_pattern.validate().is_err());

        let inverted = field_from_json(serde_json::json!({
            "name": "n",
            "type": "integer",
            "constraints": {"minimum": 10, "maximum": 1}
        }))
        .unwrap();
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_invalid_field_name() {
        assert!(matches!(
            Field::integer("not valid").validate(),
            Err(ContractError::InvalidName { .. })
        ));
    }
}
