pub mod check;
pub mod export;
pub mod validate;

use anyhow::{Context, Result};
use contracts_core::{Contract, CrossContract, DataContract, TableSchema};
use contracts_parser::{load_contract, load_cross_contract};
use std::path::Path;
use tracing::debug;

/// A contract file read as either contract flavour.
pub enum LoadedContract {
    Plain(Contract),
    Cross(CrossContract),
}

impl LoadedContract {
    /// Reads a plain contract, falling back to a contract with display metadata.
    pub fn load(path: &Path) -> Result<Self> {
        match load_contract(path) {
            Ok(contract) => Ok(Self::Plain(contract)),
            Err(plain_error) => match load_cross_contract(path) {
                Ok(contract) => Ok(Self::Cross(contract)),
                Err(cross_error) => {
                    debug!("Not a contract with metadata either: {}", cross_error);
                    Err(plain_error).with_context(|| {
                        format!("Failed to parse contract file: {}", path.display())
                    })
                }
            },
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Cross(c) => Some(c.title()),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Cross(c) => Some(c.description()),
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Plain(_) => &[],
            Self::Cross(c) => c.tags(),
        }
    }
}

impl DataContract for LoadedContract {
    fn name(&self) -> &str {
        match self {
            Self::Plain(c) => c.name(),
            Self::Cross(c) => c.name(),
        }
    }

    fn table_schema(&self) -> &TableSchema {
        match self {
            Self::Plain(c) => c.tableschema(),
            Self::Cross(c) => c.tableschema(),
        }
    }
}
