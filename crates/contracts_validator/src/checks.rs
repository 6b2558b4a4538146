//! Column-level checks derived from field declarations.

use crate::coerce::{CoercedColumn, CoercedTable};
use crate::{DataValue, FailureCase, Result, ValidationError};
use contracts_core::{CheckSpec, Field};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A check run against a coerced table.
pub trait Check: fmt::Debug + Send + Sync {
    /// Name reported in failure records.
    fn name(&self) -> &str;

    /// Runs the check and returns one failure per offending cell.
    fn run(&self, table: &CoercedTable<'_>) -> Vec<FailureCase>;
}

/// What a [`ColumnCheck`] tests.
#[derive(Debug, Clone)]
pub enum CheckKind {
    /// Value must be present
    NotNullable,
    /// Non-null values must not repeat
    Unique,
    /// Value is one of the listed values
    IsIn(Vec<DataValue>),
    /// Value is at least the bound
    GreaterThanOrEqualTo(DataValue),
    /// Value is at most the bound
    LessThanOrEqualTo(DataValue),
    /// Text matches the pattern from its start
    StrMatches(Regex),
    /// Character count within bounds
    StrLength { min: Option<usize>, max: Option<usize> },
    /// Element count within bounds
    ListLength { min: Option<usize>, max: Option<usize> },
}

/// A check on the values of one column.
#[derive(Debug, Clone)]
pub struct ColumnCheck {
    column: String,
    name: String,
    kind: CheckKind,
}

impl ColumnCheck {
    pub fn new(column: impl Into<String>, name: impl Into<String>, kind: CheckKind) -> Self {
        Self {
            column: column.into(),
            name: name.into(),
            kind,
        }
    }

    /// Builds every column check a field declares.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPattern` when the field's pattern
    /// does not compile.
    pub fn for_field(field: &Field) -> Result<Vec<Self>> {
        let spec = field.column_spec();
        let column = spec.name.as_str();
        let mut checks = Vec::new();

        if !spec.nullable {
            checks.push(Self::new(column, "not_nullable", CheckKind::NotNullable));
        }
        if spec.unique {
            checks.push(Self::new(column, "field_uniqueness", CheckKind::Unique));
        }
        if let Some(pattern) = &spec.regex {
            let regex = Regex::new(&format!("^(?:{})", pattern))
                .map_err(|e| ValidationError::invalid_pattern(column, e.to_string()))?;
            checks.push(Self::new(
                column,
                format!("str_matches('{}')", pattern),
                CheckKind::StrMatches(regex),
            ));
        }
        for check in &spec.checks {
            let kind = match check {
                CheckSpec::IsIn(values) => {
                    CheckKind::IsIn(values.iter().map(DataValue::from).collect())
                }
                CheckSpec::GreaterThanOrEqualTo(v) => CheckKind::GreaterThanOrEqualTo(v.into()),
                CheckSpec::LessThanOrEqualTo(v) => CheckKind::LessThanOrEqualTo(v.into()),
                CheckSpec::StrLength { min, max } => CheckKind::StrLength {
                    min: *min,
                    max: *max,
                },
                CheckSpec::ListLength { min, max } => CheckKind::ListLength {
                    min: *min,
                    max: *max,
                },
            };
            checks.push(Self::new(column, check.name(), kind));
        }
        Ok(checks)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> &CheckKind {
        &self.kind
    }

    /// Positions of the failing cells.
    pub fn failing_rows(&self, column: &CoercedColumn) -> Vec<usize> {
        match &self.kind {
            CheckKind::NotNullable => column
                .values
                .iter()
                .enumerate()
                .filter(|(i, v)| !column.failed[*i] && v.is_null())
                .map(|(i, _)| i)
                .collect(),
            CheckKind::Unique => {
                let mut counts: HashMap<&DataValue, usize> = HashMap::new();
                for (_, value) in column.checkable() {
                    *counts.entry(value).or_default() += 1;
                }
                column
                    .checkable()
                    .filter(|(_, v)| counts.get(v).is_some_and(|&n| n > 1))
                    .map(|(i, _)| i)
                    .collect()
            }
            kind => column
                .checkable()
                .filter(|(_, v)| !value_passes(kind, v))
                .map(|(i, _)| i)
                .collect(),
        }
    }
}

fn value_passes(kind: &CheckKind, value: &DataValue) -> bool {
    match kind {
        CheckKind::NotNullable | CheckKind::Unique => true,
        CheckKind::IsIn(allowed) => allowed
            .iter()
            .any(|a| value.compare(a) == Some(Ordering::Equal)),
        CheckKind::GreaterThanOrEqualTo(bound) => {
            matches!(value.compare(bound), Some(Ordering::Greater | Ordering::Equal))
        }
        CheckKind::LessThanOrEqualTo(bound) => {
            matches!(value.compare(bound), Some(Ordering::Less | Ordering::Equal))
        }
        CheckKind::StrMatches(regex) => value.as_string().is_some_and(|s| regex.is_match(s)),
        CheckKind::StrLength { min, max } => value
            .as_string()
            .is_some_and(|s| within(s.chars().count(), *min, *max)),
        CheckKind::ListLength { min, max } => value
            .as_list()
            .is_some_and(|items| within(items.len(), *min, *max)),
    }
}

fn within(len: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.is_none_or(|m| len >= m) && max.is_none_or(|m| len <= m)
}

impl Check for ColumnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, table: &CoercedTable<'_>) -> Vec<FailureCase> {
        let Some(column) = table.column(&self.column) else {
            return Vec::new();
        };
        self.failing_rows(column)
            .into_iter()
            .map(|i| {
                FailureCase::new(
                    self.name.clone(),
                    Some(self.column.clone()),
                    Some(table.label(i)),
                    column.values[i].clone(),
                )
            })
            .collect()
    }
}
