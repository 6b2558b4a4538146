//! Failure records and their aggregation into a user-facing error list.
//!
//! Checks emit raw [`FailureCase`]s: one per failing cell, plus column-level
//! records without an index. [`SchemaValidationError::errors`] turns them
//! into the final list:
//!
//! 1. generic `dtype` failures are dropped for columns that already report a
//!    `coerce_dtype` failure;
//! 2. primary and foreign key failures collapse to one record per check and
//!    row, with every key column joined in `column` and the key tuple, read
//!    back from the source data, in `failure_case`;
//! 3. NaN becomes null;
//! 4. records are sorted by check, then index (absent indices last).

use crate::{DataSet, DataValue};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

/// Check-name prefix of per-cell coercion failures.
pub const COERCE_DTYPE_CHECK: &str = "coerce_dtype";
/// Check-name prefix of column-level type failures.
pub const DTYPE_CHECK: &str = "dtype";
/// Check-name prefix of primary key failures.
pub const PRIMARY_KEY_CHECK: &str = "PrimaryKeyError";
/// Check-name prefix of foreign key failures.
pub const FOREIGN_KEY_CHECK: &str = "ForeignKeyError";

/// One raw failure produced by a check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureCase {
    /// Name of the failing check
    pub check: String,
    /// Column the failure belongs to; absent for table-level failures
    pub column: Option<String>,
    /// Index label of the failing row; absent for column-level failures
    pub index: Option<usize>,
    /// Offending value
    pub failure_case: DataValue,
}

impl FailureCase {
    pub fn new(
        check: impl Into<String>,
        column: Option<String>,
        index: Option<usize>,
        failure_case: DataValue,
    ) -> Self {
        Self {
            check: check.into(),
            column,
            index,
            failure_case,
        }
    }

    fn is_key_failure(&self) -> bool {
        self.check.contains(PRIMARY_KEY_CHECK) || self.check.contains(FOREIGN_KEY_CHECK)
    }
}

/// The offending value of an error record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FailureValue {
    /// A single cell
    Value(DataValue),
    /// A key tuple
    Tuple(Vec<DataValue>),
}

impl std::fmt::Display for FailureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureValue::Value(v) => write!(f, "{}", v),
            FailureValue::Tuple(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// One entry of the final error list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub check: String,
    pub column: Option<String>,
    pub index: Option<usize>,
    pub failure_case: FailureValue,
}

/// Data failed validation against a schema.
///
/// Holds the raw failure cases and the validated data; the consolidated
/// error list is built on first access and cached.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SchemaValidationError {
    message: String,
    failure_cases: Vec<FailureCase>,
    data: DataSet,
    errors: OnceLock<Vec<ErrorRecord>>,
}

impl SchemaValidationError {
    pub fn new(message: impl Into<String>, failure_cases: Vec<FailureCase>, data: DataSet) -> Self {
        Self {
            message: message.into(),
            failure_cases,
            data,
            errors: OnceLock::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw failures as reported by the checks.
    pub fn failure_cases(&self) -> &[FailureCase] {
        &self.failure_cases
    }

    /// The data that was validated.
    pub fn data(&self) -> &DataSet {
        &self.data
    }

    /// Consolidated error list, computed once.
    pub fn errors(&self) -> &[ErrorRecord] {
        self.errors
            .get_or_init(|| consolidate(&self.failure_cases, &self.data))
    }

    /// Alias of [`errors`](Self::errors).
    pub fn to_list(&self) -> &[ErrorRecord] {
        self.errors()
    }

    /// Renders the error list as an aligned text table.
    pub fn render_table(&self) -> String {
        let header = ["check", "column", "index", "failure_case"];
        let rows: Vec<[String; 4]> = self
            .errors()
            .iter()
            .map(|e| {
                [
                    e.check.clone(),
                    e.column.clone().unwrap_or_default(),
                    e.index.map(|i| i.to_string()).unwrap_or_default(),
                    e.failure_case.to_string(),
                ]
            })
            .collect();

        let mut widths = header.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let render = |cells: [&str; 4]| -> String {
            cells
                .iter()
                .zip(widths)
                .map(|(c, w)| format!("{:<w$}", c, w = w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![render(header)];
        lines.push(render(widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str)));
        for row in &rows {
            lines.push(render(row.each_ref().map(String::as_str)));
        }
        lines.join("\n")
    }
}

fn consolidate(cases: &[FailureCase], data: &DataSet) -> Vec<ErrorRecord> {
    let coercion_failed: HashSet<&str> = cases
        .iter()
        .filter(|c| c.check.starts_with(COERCE_DTYPE_CHECK))
        .filter_map(|c| c.column.as_deref())
        .collect();

    let mut records = Vec::with_capacity(cases.len());
    let mut seen_keys: HashSet<(&str, Option<usize>)> = HashSet::new();
    let mut positions: Option<HashMap<usize, usize>> = None;

    for case in cases {
        if case.is_key_failure() {
            if seen_keys.insert((case.check.as_str(), case.index)) {
                let positions = positions.get_or_insert_with(|| data.label_positions());
                records.push(key_record(case, data, positions));
            }
            continue;
        }
        let redundant_dtype = case.check.starts_with(DTYPE_CHECK)
            && case
                .column
                .as_deref()
                .is_some_and(|c| coercion_failed.contains(c));
        if redundant_dtype {
            continue;
        }
        records.push(ErrorRecord {
            check: case.check.clone(),
            column: case.column.clone(),
            index: case.index,
            failure_case: FailureValue::Value(case.failure_case.clone().nan_to_null()),
        });
    }

    records.sort_by(|a, b| a.check.cmp(&b.check).then_with(|| cmp_index(a.index, b.index)));
    records
}

/// Collapses a key failure into a record holding the whole key tuple.
///
/// Falls back to the recorded cell when the check name carries no column
/// list or the row cannot be found in the data.
fn key_record(
    case: &FailureCase,
    data: &DataSet,
    positions: &HashMap<usize, usize>,
) -> ErrorRecord {
    let columns = parse_column_list(&case.check);
    let tuple = case
        .index
        .filter(|_| !columns.is_empty())
        .and_then(|label| positions.get(&label))
        .and_then(|&position| data.values_at(position, &columns));

    match tuple {
        Some(values) => ErrorRecord {
            check: case.check.clone(),
            column: Some(columns.join(", ")),
            index: case.index,
            failure_case: FailureValue::Tuple(
                values.into_iter().map(DataValue::nan_to_null).collect(),
            ),
        },
        None => ErrorRecord {
            check: case.check.clone(),
            column: case.column.clone(),
            index: case.index,
            failure_case: FailureValue::Value(case.failure_case.clone().nan_to_null()),
        },
    }
}

fn cmp_index(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Extracts the first bracketed list of quoted names from a check name,
/// e.g. `ForeignKeyError: ['a', 'b']` → `["a", "b"]`.
///
/// Anything that is not a well-formed list of quoted strings yields an
/// empty list.
pub fn parse_column_list(check: &str) -> Vec<String> {
    let Some(start) = check.find('[') else {
        return Vec::new();
    };
    let mut chars = check[start + 1..].chars().peekable();
    let mut names = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(']') if names.is_empty() => return names,
            Some(quote @ ('\'' | '"')) => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(c) => name.push(c),
                            None => return Vec::new(),
                        },
                        Some(c) if c == quote => break,
                        Some(c) => name.push(c),
                        None => return Vec::new(),
                    }
                }
                names.push(name);
            }
            _ => return Vec::new(),
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            Some(']') => return names,
            _ => return Vec::new(),
        }
    }
}
