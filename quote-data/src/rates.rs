use std::fs;
use std::path::Path;

use quote_core::RateTables;
use tracing::debug;

use crate::error::ConfigError;

/// Loader for the pricing rate tables.
///
/// The file is TOML with one table per rate category:
///
/// ```toml
/// [move_size.2-bedroom]
/// base_price = "400"
/// hours = "4"
///
/// [challenges.stairs]
/// type = "per_flight"
/// base_modifier = "25"
/// max_flights = 4
///
/// [tax]
/// rate = "0.08"
/// ```
///
/// Decimal values may be written as strings or numbers; strings keep the
/// exact value.
pub struct RateTablesLoader;

impl RateTablesLoader {
    /// Parse and validate rate tables from TOML text.
    ///
    /// `file` names the source in error messages.
    pub fn parse(
        text: &str,
        file: &str,
    ) -> Result<RateTables, ConfigError> {
        let rates: RateTables = toml::from_str(text).map_err(|source| ConfigError::Toml {
            file: file.to_string(),
            source,
        })?;
        rates.validate()?;

        debug!(
            file,
            move_sizes = rates.move_size.len(),
            challenges = rates.challenges.len(),
            services = rates.additional_services.len(),
            "parsed rate tables"
        );
        Ok(rates)
    }

    pub fn load_from_file(path: &Path) -> Result<RateTables, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }
}
