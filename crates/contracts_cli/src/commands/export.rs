use anyhow::Result;
use contracts_core::DataContract;
use contracts_validator::to_arrow_schema;
use std::path::Path;
use tracing::info;

use super::LoadedContract;
use crate::ExportTarget;

pub fn execute(contract_path: &Path, target: ExportTarget) -> Result<()> {
    info!("Exporting {} as {:?}", contract_path.display(), target);

    let contract = LoadedContract::load(contract_path)?;
    let schema = contract.table_schema();

    match target {
        ExportTarget::JsonSchema => {
            let document = schema.to_json_schema(contract.name());
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        ExportTarget::Sql => {
            println!("{}", schema.to_sql_table(contract.name()).to_ddl());
        }
        ExportTarget::Arrow => {
            for field in to_arrow_schema(schema).fields() {
                let nullable = if field.is_nullable() { "" } else { " not null" };
                println!("{}: {}{}", field.name(), field.data_type(), nullable);
            }
        }
        ExportTarget::Columns => {
            for spec in schema.to_column_specs() {
                let mut flags = Vec::new();
                if !spec.nullable {
                    flags.push("not_nullable".to_string());
                }
                if spec.unique {
                    flags.push("unique".to_string());
                }
                if let Some(regex) = &spec.regex {
                    flags.push(format!("str_matches('{}')", regex));
                }
                flags.extend(spec.checks.iter().map(|c| c.name()));
                println!("{} {} [{}]", spec.name, spec.dtype, flags.join(", "));
            }
        }
    }

    Ok(())
}
