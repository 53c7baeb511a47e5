use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quote_core::{SupplyCatalog, SupplyItem};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ConfigError;

/// A single row of the supplies CSV file.
///
/// - `id`: stable item id, used as the form document key
/// - `category`: grouping shown in the selection step (e.g. `boxes`)
/// - `name`: display name
/// - `description`: optional blurb, may be empty
/// - `price`: unit price
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SupplyRecord {
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
}

impl From<SupplyRecord> for SupplyItem {
    fn from(record: SupplyRecord) -> Self {
        SupplyItem {
            id: record.id,
            category: record.category,
            name: record.name,
            description: record.description,
            price: record.price,
        }
    }
}

/// Loader for the moving supplies catalog.
pub struct SupplyCatalogLoader;

impl SupplyCatalogLoader {
    /// Parse supply records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SupplyRecord>, ConfigError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for result in csv_reader.deserialize() {
            let record: SupplyRecord = result?;
            if !seen.insert(record.id.clone()) {
                return Err(ConfigError::DuplicateSupply(record.id));
            }
            if record.price < Decimal::ZERO {
                return Err(ConfigError::NegativeSupplyPrice {
                    id: record.id,
                    price: record.price,
                });
            }
            records.push(record);
        }

        Ok(records)
    }

    pub fn build<R: Read>(reader: R) -> Result<SupplyCatalog, ConfigError> {
        let records = Self::parse(reader)?;
        Ok(SupplyCatalog::new(
            records.into_iter().map(SupplyItem::from).collect(),
        ))
    }

    pub fn load_from_file(path: &Path) -> Result<SupplyCatalog, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::build(file)
    }
}
