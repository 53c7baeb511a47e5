//! Pricing calculations for move estimates.
//!
//! [`EstimateWorksheet`] runs the pricing pipeline over a form document;
//! [`format_estimate`] turns the unrounded result into display strings.

pub mod common;
pub mod estimate;
pub mod formatter;

pub use estimate::{EstimateWorksheet, LABOR_ONLY_SERVICE, PriceRange};
pub use formatter::{FormattedEstimate, format_estimate};
