//! Semantic role tags attached to fields.
//!
//! A descriptor says what a column *means* (a measured value, a point in
//! time, a place), independent of how it is stored.

use crate::{ContractError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;
use std::sync::OnceLock;

/// Sampling frequency of a time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Yearly,
    Monthly,
    Daily,
    Hourly,
}

/// Granularity of a location column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Country,
    Region,
    State,
    Point,
    City,
}

/// Semantic role of one field, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum FieldDescriptor {
    /// A measured quantity, optionally with a unit
    Value {
        #[serde(deserialize_with = "crate::names::trimmed")]
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// A time axis
    Time {
        #[serde(deserialize_with = "crate::names::trimmed")]
        field: String,
        frequency: Frequency,
    },
    /// A spatial axis
    Location {
        #[serde(deserialize_with = "crate::names::trimmed")]
        field: String,
        #[serde(rename = "locationType")]
        location_type: LocationType,
    },
}

impl FieldDescriptor {
    /// Name of the described field.
    pub fn field(&self) -> &str {
        match self {
            FieldDescriptor::Value { field, .. }
            | FieldDescriptor::Time { field, .. }
            | FieldDescriptor::Location { field, .. } => field,
        }
    }

    /// Discriminator value.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldDescriptor::Value { .. } => "value",
            FieldDescriptor::Time { .. } => "time",
            FieldDescriptor::Location { .. } => "location",
        }
    }
}

/// Non-empty, ordered collection of descriptors with a lazy name index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FieldDescriptors {
    descriptors: Vec<FieldDescriptor>,
    #[serde(skip)]
    index: OnceLock<HashMap<String, usize>>,
}

impl FieldDescriptors {
    /// Creates a collection; fails when `descriptors` is empty.
    pub fn new(descriptors: Vec<FieldDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(ContractError::EmptyCollection("fieldDescriptors"));
        }
        Ok(Self {
            descriptors,
            index: OnceLock::new(),
        })
    }

    fn index(&self) -> &HashMap<String, usize> {
        self.index.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.descriptors.len());
            for (i, d) in self.descriptors.iter().enumerate() {
                map.entry(d.field().to_string()).or_insert(i);
            }
            map
        })
    }

    /// First descriptor attached to `field`.
    pub fn get(&self, field: &str) -> Option<&FieldDescriptor> {
        self.index().get(field).map(|&i| &self.descriptors[i])
    }

    /// Described field names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(FieldDescriptor::field).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// One message per descriptor whose field is not in `field_names`.
    pub(crate) fn missing_field_messages(&self, field_names: &[&str]) -> Vec<String> {
        self.descriptors
            .iter()
            .filter(|d| !field_names.contains(&d.field()))
            .map(|d| {
                format!(
                    "Field '{}' referenced in descriptor does not exist in schema.",
                    d.field()
                )
            })
            .collect()
    }
}

impl PartialEq for FieldDescriptors {
    fn eq(&self, other: &Self) -> bool {
        self.descriptors == other.descriptors
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FieldDescriptors {
    type Error = ContractError;

    fn try_from(value: Vec<FieldDescriptor>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FieldDescriptors> for Vec<FieldDescriptor> {
    fn from(value: FieldDescriptors) -> Self {
        value.descriptors
    }
}

impl Index<usize> for FieldDescriptors {
    type Output = FieldDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.descriptors[index]
    }
}

impl<'a> IntoIterator for &'a FieldDescriptors {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
