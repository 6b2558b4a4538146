use anyhow::Result;
use contracts_core::{DataContract, format_name_list};
use serde_json::json;
use std::path::Path;
use tracing::info;

use super::LoadedContract;
use crate::{OutputFormat, output};

pub fn execute(contract_path: &Path, format: OutputFormat) -> Result<()> {
    info!("Checking contract: {}", contract_path.display());

    // Parsing runs every structural rule, so a loaded contract is valid.
    let contract = LoadedContract::load(contract_path)?;
    let schema = contract.table_schema();

    if format == OutputFormat::Json {
        let summary = json!({
            "valid": true,
            "name": contract.name(),
            "title": contract.title(),
            "fields": schema.field_names(),
            "primaryKey": schema.primary_key().fields(),
            "foreignKeys": schema
                .foreign_keys()
                .iter()
                .map(|fk| json!({
                    "fields": fk.fields(),
                    "resource": fk.reference().resource(),
                    "referenced": fk.reference().fields(),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::print_success("Contract is valid");

    println!("\nContract Summary:");
    println!("  Name:        {}", contract.name());
    if let Some(title) = contract.title() {
        println!("  Title:       {}", title);
    }
    if let Some(description) = contract.description() {
        println!("  Description: {}", description);
    }
    if !contract.tags().is_empty() {
        println!("  Tags:        {}", contract.tags().join(", "));
    }
    println!("  Fields:      {}", schema.len());

    for field in schema.iter() {
        let required = if field.required() { " (required)" } else { "" };
        println!("    - {}: {}{}", field.name(), field.field_type(), required);
    }

    if !schema.primary_key().is_empty() {
        println!(
            "  Primary Key: {}",
            format_name_list(schema.primary_key().fields())
        );
    }

    for fk in schema.foreign_keys() {
        let target = fk.reference().resource().unwrap_or("self");
        println!(
            "  Foreign Key: {} -> {}{}",
            format_name_list(fk.fields()),
            target,
            format_name_list(fk.reference().fields())
        );
    }

    if let Some(descriptors) = schema.field_descriptors() {
        let kinds: Vec<String> = descriptors
            .iter()
            .map(|d| format!("{} ({})", d.field(), d.kind()))
            .collect();
        println!("  Descriptors: {}", kinds.join(", "));
    }

    Ok(())
}
