//! Primary and foreign key definitions.

use crate::{ContractError, Result, format_name_list, validate_contract_name, validate_field_name};
use serde::{Deserialize, Serialize};

/// Accepts either a single name or a list of names on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(name) => vec![name.trim().to_string()],
            OneOrMany::Many(names) => names.iter().map(|n| n.trim().to_string()).collect(),
        }
    }
}

fn validate_names(names: &[String]) -> Result<()> {
    names.iter().try_for_each(|n| validate_field_name(n))
}

fn missing<'a>(names: &'a [String], field_names: &[&str]) -> Vec<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|n| !field_names.contains(n))
        .collect()
}

/// Ordered list of field names uniquely identifying a row.
///
/// An empty key means the schema has no primary key. A bare string on the
/// wire is read as a one-element key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OneOrMany", into = "Vec<String>")]
pub struct PrimaryKey(Vec<String>);

impl PrimaryKey {
    /// Creates a key over `fields`, dropping repeated names.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in fields {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        validate_names(&names)?;
        Ok(Self(names))
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub(crate) fn missing_field_message(&self, field_names: &[&str]) -> Option<String> {
        let missing = missing(&self.0, field_names);
        (!missing.is_empty()).then(|| {
            format!(
                "Primary key fields {} do not exist in the schema.",
                format_name_list(&missing)
            )
        })
    }
}

impl TryFrom<OneOrMany> for PrimaryKey {
    type Error = ContractError;

    fn try_from(value: OneOrMany) -> Result<Self> {
        Self::new(Vec::<String>::from(value))
    }
}

impl From<PrimaryKey> for Vec<String> {
    fn from(value: PrimaryKey) -> Self {
        value.0
    }
}

impl<'a> IntoIterator for &'a PrimaryKey {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferencedFieldDef {
    #[serde(default, deserialize_with = "crate::names::trimmed_option")]
    resource: Option<String>,
    fields: OneOrMany,
}

/// Target side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReferencedFieldDef")]
pub struct ReferencedField {
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
    fields: Vec<String>,
}

impl ReferencedField {
    /// Creates a reference to `fields` in `resource`; `None` refers to the
    /// same schema.
    pub fn new<I, S>(resource: Option<String>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(ContractError::EmptyCollection("reference.fields"));
        }
        validate_names(&fields)?;
        if let Some(resource) = &resource {
            validate_contract_name(resource)?;
        }
        Ok(Self { resource, fields })
    }

    /// Referenced contract, `None` for a self-reference.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_self_reference(&self) -> bool {
        self.resource.is_none()
    }
}

impl TryFrom<ReferencedFieldDef> for ReferencedField {
    type Error = ContractError;

    fn try_from(def: ReferencedFieldDef) -> Result<Self> {
        Self::new(def.resource, Vec::<String>::from(def.fields))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ForeignKeyDef {
    fields: OneOrMany,
    reference: ReferencedField,
}

/// Fields of this schema whose values must match a tuple in the referenced
/// fields, position by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ForeignKeyDef")]
pub struct ForeignKey {
    fields: Vec<String>,
    reference: ReferencedField,
}

impl ForeignKey {
    /// Creates a foreign key; `fields` and `reference.fields` must have the
    /// same length.
    pub fn new<I, S>(fields: I, reference: ReferencedField) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(ContractError::EmptyCollection("foreignKey.fields"));
        }
        validate_names(&fields)?;
        if fields.len() != reference.fields.len() {
            return Err(ContractError::ForeignKeyLengthMismatch {
                fields,
                referenced: reference.fields,
            });
        }
        Ok(Self { fields, reference })
    }

    /// Referring fields in this schema.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn reference(&self) -> &ReferencedField {
        &self.reference
    }

    pub fn is_self_reference(&self) -> bool {
        self.reference.is_self_reference()
    }

    pub(crate) fn missing_field_message(&self, field_names: &[&str]) -> Option<String> {
        let missing = missing(&self.fields, field_names);
        (!missing.is_empty()).then(|| {
            format!(
                "Foreign key fields {} do not exist in the schema.",
                format_name_list(&missing)
            )
        })
    }

    pub(crate) fn missing_referenced_message(&self, field_names: &[&str]) -> Option<String> {
        let missing = missing(&self.reference.fields, field_names);
        (!missing.is_empty()).then(|| {
            format!(
                "Referenced fields {} do not exist in the referenced resource. ({})",
                format_name_list(&missing),
                self.reference.resource().unwrap_or("self-reference")
            )
        })
    }
}

impl TryFrom<ForeignKeyDef> for ForeignKey {
    type Error = ContractError;

    fn try_from(def: ForeignKeyDef) -> Result<Self> {
        Self::new(Vec::<String>::from(def.fields), def.reference)
    }
}
