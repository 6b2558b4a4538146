//! Naming rules for fields and contracts.

use crate::{ContractError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::sync::LazyLock;

/// Maximum length of a field name.
pub const MAX_FIELD_NAME_LENGTH: usize = 63;

/// Maximum length of a contract name.
pub const MAX_CONTRACT_NAME_LENGTH: usize = 100;

/// Column name injected by relational projections as surrogate key.
pub const SYNTHETIC_KEY: &str = "_id";

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

static CONTRACT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid contract name regex"));

/// Checks a field name against the field naming rules.
pub fn validate_field_name(name: &str) -> Result<()> {
    validate_name("field", name, &FIELD_NAME, MAX_FIELD_NAME_LENGTH)
}

/// Checks a contract name against the contract naming rules.
pub fn validate_contract_name(name: &str) -> Result<()> {
    validate_name("contract", name, &CONTRACT_NAME, MAX_CONTRACT_NAME_LENGTH)
}

fn validate_name(kind: &'static str, name: &str, pattern: &Regex, max_len: usize) -> Result<()> {
    if name.chars().count() > max_len {
        return Err(ContractError::InvalidName {
            kind,
            name: name.to_string(),
            reason: format!("must not exceed {} characters", max_len),
        });
    }
    if !pattern.is_match(name) {
        return Err(ContractError::InvalidName {
            kind,
            name: name.to_string(),
            reason: format!("must match the pattern {}", pattern.as_str()),
        });
    }
    Ok(())
}

/// Reads a declared name without surrounding whitespace.
pub(crate) fn trimmed<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    String::deserialize(deserializer).map(|name| name.trim().to_string())
}

/// Like [`trimmed`] for optional names.
pub(crate) fn trimmed_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|name| name.map(|n| n.trim().to_string()))
}

/// Renders a list of names as a bracketed, quoted list: `['a', 'b']`.
///
/// Check names produced by the validator embed their columns in this form,
/// and the error report decodes it again.
pub fn format_name_list<S: AsRef<str>>(names: &[S]) -> String {
    let quoted: Vec<String> = names
        .iter()
        .map(|n| format!("'{}'", n.as_ref().replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}
