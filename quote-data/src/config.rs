use std::path::Path;
use std::sync::Arc;

use quote_core::WizardConfig;
use tracing::info;

use crate::error::ConfigError;
use crate::rates::RateTablesLoader;
use crate::steps::StepCatalogLoader;
use crate::supplies::SupplyCatalogLoader;

pub const RATES_FILE: &str = "rates.toml";
pub const STEPS_FILE: &str = "steps.toml";
pub const SUPPLIES_FILE: &str = "supplies.csv";

/// Loads a configuration directory holding `rates.toml`, `steps.toml` and
/// `supplies.csv`.
pub struct QuoteConfig;

impl QuoteConfig {
    /// Load and cross-check all three files.
    ///
    /// Every configuration check runs here, so a wizard built from the result
    /// never meets an unresolvable step or an unpriced option.
    pub fn load(dir: &Path) -> Result<Arc<WizardConfig>, ConfigError> {
        let rates = RateTablesLoader::load_from_file(&dir.join(RATES_FILE))?;
        let catalog = StepCatalogLoader::load_from_file(&dir.join(STEPS_FILE))?;
        let supplies = SupplyCatalogLoader::load_from_file(&dir.join(SUPPLIES_FILE))?;

        let config = WizardConfig::new(catalog, rates, supplies)?;
        info!(
            dir = %dir.display(),
            steps = config.catalog().step_count(),
            supplies = config.supplies().len(),
            "loaded wizard configuration"
        );
        Ok(Arc::new(config))
    }
}
