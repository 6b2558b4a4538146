use anyhow::{Context, Result, bail};
use contracts_core::{DataContract, ValidationOptions};
use contracts_validator::{DataSet, DataValue, KeyContext, ValidationError, validate_data};
use std::path::Path;
use tracing::{debug, info};

use super::LoadedContract;
use crate::{OutputFormat, output};

/// Options of `dce validate` besides the two paths.
#[derive(Debug)]
pub struct ValidateArgs {
    pub existing_keys: Option<std::path::PathBuf>,
    pub skip_primary_key: bool,
    pub skip_foreign_key: bool,
    pub fail_fast: bool,
    pub backend: String,
    pub format: OutputFormat,
}

pub fn execute(contract_path: &Path, data_path: &Path, args: &ValidateArgs) -> Result<()> {
    info!("Validating {} against {}", data_path.display(), contract_path.display());

    let contract = LoadedContract::load(contract_path)?;
    let data = read_data(data_path)?;
    info!("Read {} rows with {} columns", data.len(), data.columns().len());

    let keys = match &args.existing_keys {
        Some(path) => read_keys(path)?,
        None => KeyContext::new(),
    };

    let options = ValidationOptions::new()
        .with_skip_primary_key_validation(args.skip_primary_key)
        .with_skip_foreign_key_validation(args.skip_foreign_key)
        .with_lazy(!args.fail_fast)
        .with_backend(args.backend.as_str());

    match validate_data(contract.table_schema(), &data, &keys, &options) {
        Ok(()) => {
            output::print_passed(contract.name(), data.len(), args.format);
            Ok(())
        }
        Err(ValidationError::Failed(failures)) => {
            output::print_failures(contract.name(), &failures, args.format)?;
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Validation could not run"),
    }
}

/// Reads a dataset from a `.csv` or `.json` file.
pub fn read_data(path: &Path) -> Result<DataSet> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") => read_csv(path),
        Some("json") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read data file: {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON data: {}", path.display()))?;
            Ok(DataSet::from_json(value)?)
        }
        Some(other) => bail!("Unsupported data format: {}", other),
        None => bail!("Data file has no extension: {}", path.display()),
    }
}

/// CSV cells are read as strings and coerced by the validator; empty cells are null.
fn read_csv(path: &Path) -> Result<DataSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    debug!(columns = ?headers, "Read CSV header");
    let mut dataset = DataSet::with_columns(headers);

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let row = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    DataValue::Null
                } else {
                    DataValue::from(cell)
                }
            })
            .collect();
        dataset.push_row(row)?;
    }
    Ok(dataset)
}

fn read_keys(path: &Path) -> Result<KeyContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse key file: {}", path.display()))
}
