//! Parser for data contract declarations (YAML/JSON/TOML formats).
//!
//! This module turns declaration documents into the strongly-typed
//! [`Contract`], [`CrossContract`] and [`TableSchema`] structures. Every
//! structural rule of the model runs during deserialization, so a document
//! that parses is a valid contract.
//!
//! # Example
//!
//! ```rust
//! use contracts_parser::parse_yaml;
//!
//! let yaml = r#"
//! name: regions
//! tableschema:
//!   fields:
//!     - name: code
//!       type: string
//!       constraints:
//!         required: true
//!   primaryKey: code
//! "#;
//!
//! let contract = parse_yaml(yaml).expect("Failed to parse contract");
//! assert_eq!(contract.name(), "regions");
//! ```

use contracts_core::{Contract, CrossContract, TableSchema};
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during contract parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported declaration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// JSON format (.json)
    Json,
    /// TOML format (.toml)
    Toml,
}

/// Deserializes any declaration type from a string in the given format.
pub fn parse_str<T: DeserializeOwned>(content: &str, format: ContractFormat) -> Result<T> {
    match format {
        ContractFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
        ContractFormat::Json => Ok(serde_json::from_str(content)?),
        ContractFormat::Toml => {
            toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))
        }
    }
}

/// Parse a contract from a YAML string.
pub fn parse_yaml(content: &str) -> Result<Contract> {
    parse_str(content, ContractFormat::Yaml)
}

/// Parse a contract from a JSON string.
///
/// # Example
///
/// ```rust
/// use contracts_parser::parse_json;
///
/// let json = r#"{
///     "name": "meters",
///     "tableschema": {"fields": [{"name": "reading", "type": "number"}]}
/// }"#;
///
/// let contract = parse_json(json).unwrap();
/// assert_eq!(contract.tableschema().len(), 1);
/// ```
pub fn parse_json(content: &str) -> Result<Contract> {
    parse_str(content, ContractFormat::Json)
}

/// Parse a contract from a TOML string.
///
/// # Example
///
/// ```rust
/// use contracts_parser::parse_toml;
///
/// let toml = r#"
/// name = "meters"
///
/// [[tableschema.fields]]
/// name = "reading"
/// type = "number"
/// "#;
///
/// let contract = parse_toml(toml).unwrap();
/// assert_eq!(contract.name(), "meters");
/// ```
pub fn parse_toml(content: &str) -> Result<Contract> {
    parse_str(content, ContractFormat::Toml)
}

/// Detect the declaration format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `ContractFormat::Yaml`
/// * `.json` → `ContractFormat::Json`
/// * `.toml` → `ContractFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ContractFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(ContractFormat::Yaml),
        "json" => Ok(ContractFormat::Json),
        "toml" => Ok(ContractFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Loads any declaration type from a file with automatic format detection.
///
/// The extension is checked before the file is read, so an unsupported
/// extension is reported even when the file does not exist.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = detect_format(path)?;
    debug!(path = %path.display(), ?format, "Loading declaration");
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format)
}

/// Loads a [`Contract`] from a file.
///
/// ```no_run
/// use contracts_parser::load_contract;
/// use std::path::Path;
///
/// let contract = load_contract(Path::new("contracts/regions.yml")).unwrap();
/// println!("Loaded contract: {}", contract.name());
/// ```
pub fn load_contract(path: &Path) -> Result<Contract> {
    load(path)
}

/// Loads a [`CrossContract`] (contract with title, description, tags).
pub fn load_cross_contract(path: &Path) -> Result<CrossContract> {
    load(path)
}

/// Loads a bare [`TableSchema`].
pub fn load_table_schema(path: &Path) -> Result<TableSchema> {
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts_core::{ContractError, FieldType};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const ENERGY_YAML: &str = r#"
name: energy_balance
tableschema:
  fields:
    - name: country
      type: string
      constraints:
        required: true
        pattern: "[A-Z]{2}"
    - name: year
      type: integer
      constraints:
        required: true
        minimum: 1990
    - name: amount
      type: number
    - name: measured_at
      type: datetime
      format: "%Y-%m-%d"
    - name: sources
      type: list
      itemType: string
  primaryKey: [country, year]
  foreignKeys:
    - fields: country
      reference:
        resource: countries
        fields: code
  fieldDescriptors:
    - type: location
      field: country
      locationType: country
    - type: time
      field: year
      frequency: yearly
    - type: value
      field: amount
      unit: TJ
"#;

    #[test]
    fn test_parse_valid_yaml() {
        let contract = parse_yaml(ENERGY_YAML).expect("Failed to parse valid YAML");
        let schema = contract.tableschema();

        assert_eq!(contract.name(), "energy_balance");
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.primary_key().fields(), ["country", "year"]);
        assert_eq!(schema.foreign_keys()[0].reference().resource(), Some("countries"));
        assert_eq!(schema["measured_at"].field_type(), FieldType::DateTime);
        assert_eq!(schema.field_descriptors().map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_parse_yaml_unknown_type() {
        let yaml = r#"
name: broken
tableschema:
  fields:
    - name: x
      type: decimal
"#;
        let result = parse_yaml(yaml);
        assert!(matches!(result.unwrap_err(), ParserError::YamlError(_)));
    }

    #[test]
    fn test_parse_yaml_structural_error_names_field() {
        let yaml = r#"
name: broken
tableschema:
  fields:
    - name: id
      type: integer
  primaryKey: [identifier]
"#;
        let message = parse_yaml(yaml).unwrap_err().to_string();
        assert!(message.contains("Primary key fields ['identifier'] do not exist in the schema."));
    }

    #[test]
    fn test_parse_json_self_reference_by_name() {
        let json = r#"{
            "name": "tree",
            "tableschema": {
                "fields": [
                    {"name": "id", "type": "integer"},
                    {"name": "parent", "type": "integer"}
                ],
                "foreignKeys": [
                    {"fields": ["parent"], "reference": {"resource": "tree", "fields": ["id"]}}
                ]
            }
        }"#;
        let result = parse_json(json);
        assert!(matches!(result, Err(ParserError::JsonError(_))));
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml = r#"
name = "meters"

[tableschema]
primaryKey = "meter_id"

[[tableschema.fields]]
name = "meter_id"
type = "string"

[tableschema.fields.constraints]
required = true

[[tableschema.fields]]
name = "reading"
type = "number"
"#;

        let contract = parse_toml(toml).expect("Failed to parse TOML");
        assert_eq!(contract.tableschema().field_names(), vec!["meter_id", "reading"]);
        assert!(contract.tableschema()["meter_id"].required());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_toml("name = \"x\"\n[[[invalid syntax");
        assert!(matches!(result.unwrap_err(), ParserError::TomlError(_)));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("c.yaml")).unwrap(), ContractFormat::Yaml);
        assert_eq!(detect_format(Path::new("c.YML")).unwrap(), ContractFormat::Yaml);
        assert_eq!(detect_format(Path::new("c.json")).unwrap(), ContractFormat::Json);
        assert_eq!(detect_format(Path::new("c.toml")).unwrap(), ContractFormat::Toml);
        assert!(matches!(
            detect_format(Path::new("c.xml")),
            Err(ParserError::UnsupportedFormat(ext)) if ext == "xml"
        ));
        assert!(matches!(
            detect_format(Path::new("contract")),
            Err(ParserError::InvalidExtension)
        ));
    }

    #[test]
    fn test_load_contract_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(ENERGY_YAML.as_bytes()).unwrap();

        let contract = load_contract(file.path()).expect("Failed to load contract");
        assert_eq!(contract.name(), "energy_balance");

        let schema: TableSchema = load(file.path())
            .map(|c: Contract| c.tableschema().clone())
            .unwrap();
        assert_eq!(&schema, contract.tableschema());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_contract(Path::new("does/not/exist.yaml"));
        assert!(matches!(result, Err(ParserError::IoError(_))));
    }

    #[test]
    fn test_load_cross_contract_requires_metadata() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(ENERGY_YAML.as_bytes()).unwrap();
        assert!(load_cross_contract(file.path()).is_err());
    }

    #[test]
    fn test_load_table_schema() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"fields": [{"name": "_id", "type": "integer"}]}"#)
            .unwrap();
        let message = load_table_schema(file.path()).unwrap_err().to_string();
        assert!(message.contains(&ContractError::ReservedFieldName("_id".into()).to_string()));
    }

    #[test]
    fn test_round_trip_yaml() {
        let original = parse_yaml(ENERGY_YAML).unwrap();
        let yaml = serde_yaml_ng::to_string(&original).expect("Failed to serialize");
        let parsed = parse_yaml(&yaml).expect("Failed to parse");
        assert_eq!(parsed, original);
    }
}
