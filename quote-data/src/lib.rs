mod config;
mod error;
mod rates;
mod steps;
mod supplies;

pub use config::{QuoteConfig, RATES_FILE, STEPS_FILE, SUPPLIES_FILE};
pub use error::ConfigError;
pub use rates::RateTablesLoader;
pub use steps::{StepCatalogFile, StepCatalogLoader};
pub use supplies::{SupplyCatalogLoader, SupplyRecord};
