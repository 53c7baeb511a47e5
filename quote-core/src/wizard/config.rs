use thiserror::Error;

use crate::models::{RateTableError, RateTables, SupplyCatalog};
use crate::steps::{CatalogError, CustomStep, SUPPLY_GATE_STEP, StepCatalog};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardConfigError {
    #[error("invalid rate tables: {0}")]
    Rates(#[from] RateTableError),

    #[error("invalid step catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Validated, read-only configuration shared by every wizard instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    catalog: StepCatalog,
    rates: RateTables,
    supplies: SupplyCatalog,
    review_index: Option<usize>,
    supply_gate_index: Option<usize>,
}

impl WizardConfig {
    /// # Errors
    ///
    /// Returns [`WizardConfigError`] if the rate tables are invalid or the
    /// catalog offers an option the rate tables cannot price.
    pub fn new(
        catalog: StepCatalog,
        rates: RateTables,
        supplies: SupplyCatalog,
    ) -> Result<Self, WizardConfigError> {
        rates.validate()?;
        catalog.check_rates(&rates)?;
        let review_index = catalog.index_of_custom(CustomStep::ReviewDetails);
        let supply_gate_index = catalog.index_of(SUPPLY_GATE_STEP);
        Ok(Self {
            catalog,
            rates,
            supplies,
            review_index,
            supply_gate_index,
        })
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn rates(&self) -> &RateTables {
        &self.rates
    }

    pub fn supplies(&self) -> &SupplyCatalog {
        &self.supplies
    }

    /// Position of the review step, the target of a resumed session.
    pub fn review_index(&self) -> Option<usize> {
        self.review_index
    }

    pub fn supply_gate_index(&self) -> Option<usize> {
        self.supply_gate_index
    }
}
