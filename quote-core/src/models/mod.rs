mod catalog_item;
mod challenge;
mod estimate;
mod field;
mod form_document;
mod rate_tables;

pub use catalog_item::{AdditionalService, SupplyCatalog, SupplyItem, SupplySelection};
pub use challenge::{Challenge, ChallengeValue};
pub use estimate::{
    ChallengeCharge, Estimate, Modifier, ModifierKind, ServiceCharge, SupplyCharge,
};
pub use field::{FieldError, FieldKind, FieldPath, FieldValue};
pub use form_document::{Address, Addresses, Contact, FormDocument, Location};
pub use rate_tables::{
    ChallengeKind, ChallengeRate, DistanceRate, MoveSizeRate, MultiplierRate, RateTableError,
    RateTables, ServiceKind, ServiceRate, TaxRate,
};
