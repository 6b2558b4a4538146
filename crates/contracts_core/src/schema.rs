//! The table schema aggregate.
//!
//! A [`TableSchema`] ties the field list to its primary key, foreign keys and
//! descriptors. All invariants are enforced once, in [`TableSchema::new`], and
//! the aggregate is immutable afterwards: changing it means building a new
//! one, which runs the checks again.

use crate::{
    ContractError, Field, FieldDescriptor, FieldDescriptors, ForeignKey, PrimaryKey, Result,
    SYNTHETIC_KEY,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::Index;
use std::sync::OnceLock;

/// Wire form of a table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct TableSchemaDef {
    fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "PrimaryKey::is_empty")]
    primary_key: PrimaryKey,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    foreign_keys: Vec<ForeignKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_descriptors: Option<FieldDescriptors>,
}

/// Ordered fields plus keys and descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TableSchemaDef", into = "TableSchemaDef")]
pub struct TableSchema {
    fields: Vec<Field>,
    primary_key: PrimaryKey,
    foreign_keys: Vec<ForeignKey>,
    field_descriptors: Option<FieldDescriptors>,
    name_index: OnceLock<HashMap<String, usize>>,
}

impl TableSchema {
    /// Builds a schema and checks every invariant.
    ///
    /// # Errors
    ///
    /// - [`ContractError::EmptySchema`] when `fields` is empty
    /// - field name and constraint errors from [`Field::validate`]
    /// - [`ContractError::ReservedFieldName`] for a field named `_id`
    /// - [`ContractError::DuplicateField`] for a repeated name
    /// - [`ContractError::StructuralIntegrity`] listing every key or
    ///   descriptor reference to an undeclared field
    pub fn new(
        fields: Vec<Field>,
        primary_key: PrimaryKey,
        foreign_keys: Vec<ForeignKey>,
        field_descriptors: Option<FieldDescriptors>,
    ) -> Result<Self> {
        if fields.is_empty() {
            return Err(ContractError::EmptySchema);
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            field.validate()?;
            if field.name() == SYNTHETIC_KEY {
                return Err(ContractError::ReservedFieldName(SYNTHETIC_KEY.to_string()));
            }
            if !seen.insert(field.name()) {
                return Err(ContractError::DuplicateField(field.name().to_string()));
            }
        }

        let schema = Self {
            fields,
            primary_key,
            foreign_keys,
            field_descriptors,
            name_index: OnceLock::new(),
        };
        schema.check_structure()?;
        Ok(schema)
    }

    /// Runs over the fully assembled schema so that keys and descriptors are
    /// checked against the final field list.
    fn check_structure(&self) -> Result<()> {
        let names = self.field_names();
        let mut messages = Vec::new();

        messages.extend(self.primary_key.missing_field_message(&names));
        for fk in &self.foreign_keys {
            messages.extend(fk.missing_field_message(&names));
            if fk.is_self_reference() {
                messages.extend(fk.missing_referenced_message(&names));
            }
        }
        if let Some(descriptors) = &self.field_descriptors {
            messages.extend(descriptors.missing_field_messages(&names));
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ContractError::StructuralIntegrity(messages))
        }
    }

    fn name_index(&self) -> &HashMap<String, usize> {
        self.name_index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.fields.len());
            for (i, field) in self.fields.iter().enumerate() {
                index.entry(field.name().to_string()).or_insert(i);
            }
            index
        })
    }

    /// Field with the given name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.name_index().get(name).map(|&i| &self.fields[i])
    }

    /// Field at `index` in declaration order.
    pub fn field_at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Position of the named field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.name_index().get(name).copied()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.name_index().contains_key(name)
    }

    /// True if every name is a declared field.
    pub fn has_fields<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().all(|n| self.has_field(n.as_ref()))
    }

    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn field_descriptors(&self) -> Option<&FieldDescriptors> {
        self.field_descriptors.as_ref()
    }

    /// Descriptor attached to the named field.
    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_descriptors.as_ref()?.get(name)
    }
}

impl PartialEq for TableSchema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.primary_key == other.primary_key
            && self.foreign_keys == other.foreign_keys
            && self.field_descriptors == other.field_descriptors
    }
}

impl TryFrom<TableSchemaDef> for TableSchema {
    type Error = ContractError;

    fn try_from(def: TableSchemaDef) -> Result<Self> {
        Self::new(
            def.fields,
            def.primary_key,
            def.foreign_keys,
            def.field_descriptors,
        )
    }
}

impl From<TableSchema> for TableSchemaDef {
    fn from(schema: TableSchema) -> Self {
        Self {
            fields: schema.fields,
            primary_key: schema.primary_key,
            foreign_keys: schema.foreign_keys,
            field_descriptors: schema.field_descriptors,
        }
    }
}

impl Index<usize> for TableSchema {
    type Output = Field;

    fn index(&self, index: usize) -> &Self::Output {
        &self.fields[index]
    }
}

impl Index<&str> for TableSchema {
    type Output = Field;

    /// # Panics
    ///
    /// Panics if no field has the given name.
    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(field) => field,
            None => panic!("no field named '{}' in schema", name),
        }
    }
}

impl<'a> IntoIterator for &'a TableSchema {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
