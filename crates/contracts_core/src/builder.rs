//! Builder pattern for creating schemas and contracts.
//!
//! This module provides ergonomic builders for constructing contracts
//! and their components with a fluent API. Every `build()` runs the same
//! checks as deserialization and returns a [`Result`].

use crate::{
    Contract, ContractError, CrossContract, DEFAULT_DATETIME_FORMAT, DateTimeConstraints,
    DateTimeField, Field, FieldDescriptor, FieldDescriptors, FieldType, ForeignKey, IntegerField,
    ItemType, ListConstraints, ListField, NumberField, NumericConstraints, PrimaryKey,
    ReferencedField, Result, StringConstraints, StringField, TableSchema,
};

/// Builder for creating a `Field`.
///
/// Setters that do not apply to the chosen type are reported by `build()`.
///
/// # Example
///
/// ```rust
/// use contracts_core::{FieldBuilder, FieldType};
///
/// let field = FieldBuilder::new("population", FieldType::Integer)
///     .description("Inhabitants")
///     .required(true)
///     .minimum(0)
///     .build()
///     .unwrap();
///
/// assert!(field.required());
/// ```
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    field_type: FieldType,
    title: Option<String>,
    description: Option<String>,
    required: bool,
    unique: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
    datetime_minimum: Option<String>,
    datetime_maximum: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    allowed: Option<Vec<serde_json::Value>>,
    format: Option<String>,
    item_type: Option<ItemType>,
}

impl FieldBuilder {
    /// Creates a new field builder.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name
    /// * `field_type` - Declared type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            title: None,
            description: None,
            required: false,
            unique: false,
            minimum: None,
            maximum: None,
            datetime_minimum: None,
            datetime_maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            allowed: None,
            format: None,
            item_type: None,
        }
    }

    /// Sets the field title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the field description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether every row must hold a value.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets whether values must be unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Sets the inclusive lower bound of a numeric field.
    pub fn minimum(mut self, minimum: impl Into<f64>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    /// Sets the inclusive upper bound of a numeric field.
    pub fn maximum(mut self, maximum: impl Into<f64>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    /// Sets the earliest value of a datetime field, in the field's format.
    pub fn earliest(mut self, minimum: impl Into<String>) -> Self {
        self.datetime_minimum = Some(minimum.into());
        self
    }

    /// Sets the latest value of a datetime field, in the field's format.
    pub fn latest(mut self, maximum: impl Into<String>) -> Self {
        self.datetime_maximum = Some(maximum.into());
        self
    }

    /// Sets the minimum length (characters or list elements).
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets the maximum length (characters or list elements).
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the pattern of a string field.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the allowed values.
    pub fn allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<serde_json::Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the format of a datetime field.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the element type of a list field.
    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    fn reject(&self, option: &str, is_set: bool) -> Result<()> {
        if is_set {
            return Err(ContractError::constraint(
                &self.name,
                format!("{} does not apply to {} fields", option, self.field_type),
            ));
        }
        Ok(())
    }

    fn allowed_as<T: serde::de::DeserializeOwned>(&self) -> Result<Option<Vec<T>>> {
        self.allowed
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(|v| {
                        serde_json::from_value(v.clone()).map_err(|_| {
                            ContractError::value_type(
                                &self.name,
                                self.field_type.as_str(),
                                v.to_string(),
                            )
                        })
                    })
                    .collect()
            })
            .transpose()
    }

    fn integer_bound(&self, bound: Option<f64>) -> Result<Option<i64>> {
        bound
            .map(|b| {
                if b.fract() == 0.0 && b.is_finite() {
                    Ok(b as i64)
                } else {
                    Err(ContractError::value_type(&self.name, "integer", b.to_string()))
                }
            })
            .transpose()
    }

    /// Builds the field and validates its constraints.
    pub fn build(self) -> Result<Field> {
        let ty = self.field_type;
        let numeric = matches!(ty, FieldType::Integer | FieldType::Number);
        let lengths = matches!(ty, FieldType::String | FieldType::List);
        self.reject("minimum/maximum", !numeric && (self.minimum.is_some() || self.maximum.is_some()))?;
        self.reject(
            "earliest/latest",
            ty != FieldType::DateTime
                && (self.datetime_minimum.is_some() || self.datetime_maximum.is_some()),
        )?;
        self.reject("minLength/maxLength", !lengths && (self.min_length.is_some() || self.max_length.is_some()))?;
        self.reject("pattern", ty != FieldType::String && self.pattern.is_some())?;
        self.reject("enum", !numeric && ty != FieldType::String && self.allowed.is_some())?;
        self.reject("format", ty != FieldType::DateTime && self.format.is_some())?;
        self.reject("itemType", ty != FieldType::List && self.item_type.is_some())?;

        let field = match ty {
            FieldType::Integer => Field::Integer(IntegerField {
                constraints: NumericConstraints {
                    required: self.required,
                    unique: self.unique,
                    minimum: self.integer_bound(self.minimum)?,
                    maximum: self.integer_bound(self.maximum)?,
                    allowed: self.allowed_as()?,
                },
                name: self.name,
                title: self.title,
                description: self.description,
            }),
            FieldType::Number => Field::Number(NumberField {
                constraints: NumericConstraints {
                    required: self.required,
                    unique: self.unique,
                    minimum: self.minimum,
                    maximum: self.maximum,
                    allowed: self.allowed_as()?,
                },
                name: self.name,
                title: self.title,
                description: self.description,
            }),
            FieldType::String => Field::String(StringField {
                constraints: StringConstraints {
                    required: self.required,
                    unique: self.unique,
                    allowed: self.allowed_as()?,
                    pattern: self.pattern,
                    min_length: self.min_length,
                    max_length: self.max_length,
                },
                name: self.name,
                title: self.title,
                description: self.description,
            }),
            FieldType::DateTime => Field::DateTime(DateTimeField {
                name: self.name,
                title: self.title,
                description: self.description,
                format: self
                    .format
                    .unwrap_or_else(|| DEFAULT_DATETIME_FORMAT.to_string()),
                constraints: DateTimeConstraints {
                    required: self.required,
                    unique: self.unique,
                    minimum: self.datetime_minimum,
                    maximum: self.datetime_maximum,
                },
            }),
            FieldType::List => Field::List(ListField {
                name: self.name,
                title: self.title,
                description: self.description,
                item_type: self.item_type.unwrap_or_default(),
                constraints: ListConstraints {
                    required: self.required,
                    unique: self.unique,
                    min_length: self.min_length,
                    max_length: self.max_length,
                },
            }),
        };
        field.validate()?;
        Ok(field)
    }
}

/// Builder for creating a `TableSchema`.
///
/// # Example
///
/// ```rust
/// use contracts_core::{Field, TableSchemaBuilder};
///
/// let schema = TableSchemaBuilder::new()
///     .field(Field::integer("id"))
///     .field(Field::integer("parent"))
///     .primary_key(["id"])
///     .self_reference(["parent"], ["id"])
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.foreign_keys().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TableSchemaBuilder {
    fields: Vec<Field>,
    primary_key: Vec<String>,
    foreign_keys: Vec<(Vec<String>, Option<String>, Vec<String>)>,
    descriptors: Vec<FieldDescriptor>,
}

impl TableSchemaBuilder {
    /// Creates an empty schema builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds multiple fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Sets the primary key.
    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a foreign key into another contract.
    pub fn foreign_key<I, J, S, T>(mut self, fields: I, resource: impl Into<String>, referenced: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.foreign_keys.push((
            fields.into_iter().map(Into::into).collect(),
            Some(resource.into()),
            referenced.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Adds a foreign key into this schema.
    pub fn self_reference<I, J, S, T>(mut self, fields: I, referenced: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.foreign_keys.push((
            fields.into_iter().map(Into::into).collect(),
            None,
            referenced.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Adds a field descriptor.
    pub fn descriptor(mut self, descriptor: FieldDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Builds the schema, running structural validation.
    pub fn build(self) -> Result<TableSchema> {
        let foreign_keys = self
            .foreign_keys
            .into_iter()
            .map(|(fields, resource, referenced)| {
                ForeignKey::new(fields, ReferencedField::new(resource, referenced)?)
            })
            .collect::<Result<Vec<_>>>()?;
        let descriptors = if self.descriptors.is_empty() {
            None
        } else {
            Some(FieldDescriptors::new(self.descriptors)?)
        };
        TableSchema::new(
            self.fields,
            PrimaryKey::new(self.primary_key)?,
            foreign_keys,
            descriptors,
        )
    }
}

/// Builder for creating a `Contract` or `CrossContract`.
///
/// # Example
///
/// ```rust
/// use contracts_core::{ContractBuilder, Field, TableSchemaBuilder};
///
/// let schema = TableSchemaBuilder::new()
///     .field(Field::string("code"))
///     .build()
///     .unwrap();
///
/// let contract = ContractBuilder::new("regions", schema)
///     .title("Regions")
///     .description("Administrative regions")
///     .tag("geo")
///     .build_cross()
///     .unwrap();
///
/// assert_eq!(contract.tags(), ["geo".to_string()]);
/// ```
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    tableschema: TableSchema,
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

impl ContractBuilder {
    /// Creates a new contract builder with required fields.
    pub fn new(name: impl Into<String>, tableschema: TableSchema) -> Self {
        Self {
            name: name.into(),
            tableschema,
            title: None,
            description: None,
            tags: Vec::new(),
        }
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builds a plain contract; display metadata is discarded.
    pub fn build(self) -> Result<Contract> {
        Contract::new(self.name, self.tableschema)
    }

    /// Builds a contract with display metadata.
    ///
    /// # Errors
    ///
    /// Fails when title or description is missing.
    pub fn build_cross(self) -> Result<CrossContract> {
        let title = self
            .title
            .ok_or_else(|| ContractError::SchemaValidation("title is required".to_string()))?;
        let description = self.description.ok_or_else(|| {
            ContractError::SchemaValidation("description is required".to_string())
        })?;
        CrossContract::new(self.name, title, description, self.tags, self.tableschema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frequency, Scalar};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_builder_minimal() {
        let field = FieldBuilder::new("label", FieldType::String).build().unwrap();
        assert_eq!(field.name(), "label");
        assert!(!field.required());
        assert!(!field.unique());
    }

    #[test]
    fn test_field_builder_full() {
        let field = FieldBuilder::new("code", FieldType::String)
            .title("Code")
            .description("ISO code")
            .required(true)
            .unique(true)
            .pattern("[A-Z]{2}")
            .min_length(2)
            .max_length(2)
            .allowed(["DE", "FR"])
            .build()
            .unwrap();

        assert_eq!(field.title(), Some("Code"));
        assert_eq!(field.pattern(), Some("[A-Z]{2}"));
        assert_eq!(
            field.enum_values(),
            Some(vec![Scalar::from("DE"), Scalar::from("FR")])
        );
    }

    #[test]
    fn test_field_builder_string_keeps_pattern_with_enum() {
        let field = FieldBuilder::new("status", FieldType::String)
            .pattern("[a-z]+")
            .allowed(["on", "off"])
            .build()
            .unwrap();
        assert_eq!(field.pattern(), Some("[a-z]+"));
        assert_eq!(field.enum_values().map(|v| v.len()), Some(2));

        let result = FieldBuilder::new("status", FieldType::String)
            .pattern("[a-z]+")
            .allowed([1, 2])
            .build();
        assert!(matches!(result, Err(ContractError::InvalidValueType { .. })));
    }

    #[test]
    fn test_field_builder_integer_bounds() {
        let field = FieldBuilder::new("year", FieldType::Integer)
            .minimum(1990)
            .maximum(2050)
            .build()
            .unwrap();
        assert_eq!(
            field.bounds(),
            (Some(Scalar::Integer(1990)), Some(Scalar::Integer(2050)))
        );

        let fractional = FieldBuilder::new("year", FieldType::Integer)
            .minimum(1.5)
            .build();
        assert!(fractional.is_err());
    }

    #[test]
    fn test_field_builder_rejects_foreign_options() {
        let result = FieldBuilder::new("n", FieldType::Number).pattern("x").build();
        assert!(matches!(result, Err(ContractError::InvalidConstraint { .. })));

        let result = FieldBuilder::new("s", FieldType::String).item_type(ItemType::Integer).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_field_builder_datetime() {
        let field = FieldBuilder::new("day", FieldType::DateTime)
            .format("%Y-%m-%d")
            .earliest("2020-01-01")
            .build()
            .unwrap();
        assert!(matches!(field.bounds().0, Some(Scalar::DateTime(_))));

        let bad = FieldBuilder::new("day", FieldType::DateTime)
            .earliest("2020-01-01")
            .build();
        assert!(matches!(bad, Err(ContractError::DateTimeParse { .. })));
    }

    #[test]
    fn test_schema_builder_structural_errors() {
        let result = TableSchemaBuilder::new()
            .field(Field::integer("id"))
            .primary_key(["id", "missing"])
            .build();
        assert!(matches!(result, Err(ContractError::StructuralIntegrity(m)) if m.len() == 1));
    }

    #[test]
    fn test_schema_builder_descriptors() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("year"))
            .descriptor(FieldDescriptor::Time {
                field: "year".to_string(),
                frequency: Frequency::Yearly,
            })
            .build()
            .unwrap();
        assert_eq!(schema.descriptor("year").map(FieldDescriptor::kind), Some("time"));
    }

    #[test]
    fn test_contract_builder_self_reference_by_name() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("id"))
            .field(Field::integer("parent"))
            .foreign_key(["parent"], "tree", ["id"])
            .build()
            .unwrap();
        let result = ContractBuilder::new("tree", schema).build();
        assert!(matches!(result, Err(ContractError::SelfReference(name)) if name == "tree"));
    }

    #[test]
    fn test_contract_builder_cross_requires_title() {
        let schema = TableSchemaBuilder::new()
            .field(Field::integer("id"))
            .build()
            .unwrap();
        let result = ContractBuilder::new("things", schema).description("d").build_cross();
        assert!(result.is_err());
    }
}
