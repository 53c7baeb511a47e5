use std::path::PathBuf;

use quote_core::{CatalogError, RateTableError, WizardConfigError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while loading wizard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Toml {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("supply item '{0}' is listed more than once")]
    DuplicateSupply(String),

    #[error("supply item '{id}' has a negative price: {price}")]
    NegativeSupplyPrice { id: String, price: Decimal },

    #[error(transparent)]
    Rates(#[from] RateTableError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Wizard(#[from] WizardConfigError),
}

impl From<csv::Error> for ConfigError {
    fn from(err: csv::Error) -> Self {
        ConfigError::CsvParse(err.to_string())
    }
}
