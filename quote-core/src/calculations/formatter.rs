use serde::{Deserialize, Serialize};

use crate::calculations::common::{format_currency, format_hours};
use crate::models::Estimate;

/// Display strings for an estimate.
///
/// This is the only place estimate amounts are rounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedEstimate {
    pub base_price: String,
    pub distance_cost: String,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub estimated_hours: String,
}

pub fn format_estimate(estimate: &Estimate) -> FormattedEstimate {
    FormattedEstimate {
        base_price: format_currency(estimate.base_price),
        distance_cost: format_currency(estimate.distance_cost),
        subtotal: format_currency(estimate.subtotal),
        tax: format_currency(estimate.tax),
        total: format_currency(estimate.total),
        estimated_hours: format_hours(estimate.estimated_hours),
    }
}
