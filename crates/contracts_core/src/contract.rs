//! Named contracts wrapping a table schema.
//!
//! A contract adds identity to a [`TableSchema`]. Two flavours exist:
//!
//! - [`Contract`]: a name and a schema
//! - [`CrossContract`]: adds title, description and tags for display
//!
//! Both enforce the contract naming rules and forbid foreign keys that name
//! the contract itself as their resource; a self-reference must leave the
//! resource unset.

use crate::{ContractError, Result, TableSchema, validate_contract_name};
use serde::{Deserialize, Serialize};

/// Common read access to contract variants.
pub trait DataContract {
    /// Unique contract name.
    fn name(&self) -> &str;

    /// Schema of the contract's table.
    fn table_schema(&self) -> &TableSchema;
}

fn check_identity(name: &str, schema: &TableSchema) -> Result<()> {
    validate_contract_name(name)?;
    if schema
        .foreign_keys()
        .iter()
        .any(|fk| fk.reference().resource() == Some(name))
    {
        return Err(ContractError::SelfReference(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ContractDef {
    #[serde(deserialize_with = "crate::names::trimmed")]
    name: String,
    tableschema: TableSchema,
}

/// A named table schema.
///
/// # Example
///
/// ```rust
/// use contracts_core::{Contract, DataContract};
///
/// let contract: Contract = serde_json::from_str(r#"{
///     "name": "regions",
///     "tableschema": {
///         "fields": [{"name": "code", "type": "string", "constraints": {"required": true}}],
///         "primaryKey": "code"
///     }
/// }"#).unwrap();
///
/// assert_eq!(contract.name(), "regions");
/// assert_eq!(contract.table_schema().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContractDef", into = "ContractDef")]
pub struct Contract {
    name: String,
    tableschema: TableSchema,
}

impl Contract {
    /// Creates a contract, checking the name and self-references.
    pub fn new(name: impl Into<String>, tableschema: TableSchema) -> Result<Self> {
        let name = name.into();
        check_identity(&name, &tableschema)?;
        Ok(Self { name, tableschema })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tableschema(&self) -> &TableSchema {
        &self.tableschema
    }
}

impl DataContract for Contract {
    fn name(&self) -> &str {
        &self.name
    }

    fn table_schema(&self) -> &TableSchema {
        &self.tableschema
    }
}

impl TryFrom<ContractDef> for Contract {
    type Error = ContractError;

    fn try_from(def: ContractDef) -> Result<Self> {
        Self::new(def.name, def.tableschema)
    }
}

impl From<Contract> for ContractDef {
    fn from(contract: Contract) -> Self {
        Self {
            name: contract.name,
            tableschema: contract.tableschema,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CrossContractDef {
    #[serde(deserialize_with = "crate::names::trimmed")]
    name: String,
    title: String,
    description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    tableschema: TableSchema,
}

/// A contract with display metadata.
///
/// `title`, `description` and `tags` are informational and carry no
/// validation semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CrossContractDef", into = "CrossContractDef")]
pub struct CrossContract {
    name: String,
    title: String,
    description: String,
    tags: Vec<String>,
    tableschema: TableSchema,
}

impl CrossContract {
    /// Creates a contract with display metadata.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        tableschema: TableSchema,
    ) -> Result<Self> {
        let name = name.into();
        check_identity(&name, &tableschema)?;
        Ok(Self {
            name,
            title: title.into(),
            description: description.into(),
            tags,
            tableschema,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tableschema(&self) -> &TableSchema {
        &self.tableschema
    }
}

impl DataContract for CrossContract {
    fn name(&self) -> &str {
        &self.name
    }

    fn table_schema(&self) -> &TableSchema {
        &self.tableschema
    }
}

impl TryFrom<CrossContractDef> for CrossContract {
    type Error = ContractError;

    fn try_from(def: CrossContractDef) -> Result<Self> {
        Self::new(
            def.name,
            def.title,
            def.description,
            def.tags,
            def.tableschema,
        )
    }
}

impl From<CrossContract> for CrossContractDef {
    fn from(contract: CrossContract) -> Self {
        Self {
            name: contract.name,
            title: contract.title,
            description: contract.description,
            tags: contract.tags,
            tableschema: contract.tableschema,
        }
    }
}

impl From<CrossContract> for Contract {
    fn from(contract: CrossContract) -> Self {
        Self {
            name: contract.name,
            tableschema: contract.tableschema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tableschema(resource: Option<&str>) -> serde_json::Value {
        let mut reference = json!({"fields": ["id"]});
        if let Some(resource) = resource {
            reference["resource"] = json!(resource);
        }
        json!({
            "fields": [
                {"name": "id", "type": "integer"},
                {"name": "parent", "type": "integer"}
            ],
            "primaryKey": "id",
            "foreignKeys": [{"fields": ["parent"], "reference": reference}]
        })
    }

    #[test]
    fn test_self_reference_without_resource() {
        let contract: Contract =
            serde_json::from_value(json!({"name": "tree", "tableschema": tableschema(None)}))
                .unwrap();
        assert!(contract.tableschema().foreign_keys()[0].is_self_reference());
    }

    #[test]
    fn test_self_reference_by_name_rejected() {
        let result: std::result::Result<Contract, _> = serde_json::from_value(
            json!({"name": "tree", "tableschema": tableschema(Some("tree"))}),
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("cannot be the same as the contract name"));
    }

    #[test]
    fn test_declared_names_are_trimmed() {
        let contract: Contract = serde_json::from_value(json!({
            "name": " tree ",
            "tableschema": {
                "fields": [
                    {"name": " id", "type": "integer"},
                    {"name": "region ", "type": "string"}
                ],
                "primaryKey": " id ",
                "foreignKeys": [{
                    "fields": [" region"],
                    "reference": {"resource": " regions ", "fields": " code "}
                }],
                "fieldDescriptors": [{"type": "location", "field": " region ", "locationType": "region"}]
            }
        }))
        .unwrap();

        let schema = contract.tableschema();
        assert_eq!(contract.name(), "tree");
        assert_eq!(schema.field_names(), vec!["id", "region"]);
        assert_eq!(schema.primary_key().fields(), ["id"]);
        let fk = &schema.foreign_keys()[0];
        assert_eq!(fk.fields(), ["region"]);
        assert_eq!(fk.reference().resource(), Some("regions"));
        assert_eq!(fk.reference().fields(), ["code"]);
        assert!(schema.descriptor("region").is_some());
    }

    #[test]
    fn test_invalid_contract_name() {
        let schema: TableSchema = serde_json::from_value(tableschema(None)).unwrap();
        assert!(matches!(
            Contract::new("no spaces allowed", schema),
            Err(ContractError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_cross_contract_metadata() {
        let contract: CrossContract = serde_json::from_value(json!({
            "name": "tree",
            "title": "Tree",
            "description": "A hierarchy",
            "tags": ["demo"],
            "tableschema": tableschema(None)
        }))
        .unwrap();
        assert_eq!(contract.title(), "Tree");
        assert_eq!(contract.tags(), ["demo".to_string()]);
        assert_eq!(DataContract::name(&contract), "tree");

        let plain: Contract = contract.into();
        assert_eq!(plain.name(), "tree");
    }

    #[test]
    fn test_cross_contract_requires_title() {
        let result: std::result::Result<CrossContract, _> = serde_json::from_value(json!({
            "name": "tree",
            "description": "A hierarchy",
            "tableschema": tableschema(None)
        }));
        assert!(result.is_err());
    }
}
