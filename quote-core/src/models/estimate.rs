//! Itemized pricing output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::challenge::ChallengeValue;
use super::form_document::Location;
use super::rate_tables::{ChallengeKind, ServiceKind};

/// How a recorded modifier was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Multiplier,
    Fixed,
    Percentage,
    Discount,
}

/// An explanation record for one pricing adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    pub value: Decimal,
    pub description: String,
}

impl Modifier {
    pub fn multiplier(
        name: impl Into<String>,
        value: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ModifierKind::Multiplier,
            value,
            description: description.into(),
        }
    }
}

/// A priced (or zero-priced) challenge.
///
/// `kind` is `None` for challenges the rate tables do not know about; those
/// carry a zero amount and a diagnostic description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCharge {
    pub location: Location,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<ChallengeKind>,
    pub modifier: Decimal,
    pub amount: Decimal,
    pub description: String,
    pub value: ChallengeValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCharge {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub modifier: Decimal,
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyCharge {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub amount: Decimal,
    pub description: String,
}

/// The complete result of one pricing run.
///
/// Amounts are unrounded; rounding happens once, when the estimate is
/// formatted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub move_size: Option<String>,
    /// Table base price before any multiplier.
    pub base_price: Decimal,
    pub service_type: Option<String>,
    pub time_window: Option<String>,
    pub distance: Decimal,
    pub distance_cost: Decimal,
    pub challenges: Vec<ChallengeCharge>,
    pub additional_services: Vec<ServiceCharge>,
    pub moving_supplies: Vec<SupplyCharge>,
    pub modifiers: Vec<Modifier>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub estimated_hours: Decimal,
}

impl Estimate {
    /// Sum of every challenge amount, discounts included.
    pub fn challenge_total(&self) -> Decimal {
        self.challenges.iter().map(|c| c.amount).sum()
    }

    pub fn supplies_total(&self) -> Decimal {
        self.moving_supplies.iter().map(|s| s.amount).sum()
    }
}
