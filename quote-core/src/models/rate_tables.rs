//! Static pricing configuration.
//!
//! Rate tables are loaded once at startup and shared read-only by every
//! estimate. Map keys are the option values the wizard writes into the form
//! document (`"2-bedroom"`, `"labor-only"`, `"stairs"`, ...).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sales tax applied to the subtotal when the rate tables do not override it.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Travel charge per mile when the rate tables do not override it.
pub const DEFAULT_COST_PER_MILE: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Errors found while validating rate tables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("{table} multiplier for '{key}' must be positive, got {value}")]
    NonPositiveMultiplier {
        table: &'static str,
        key: String,
        value: Decimal,
    },

    #[error("base price for move size '{key}' must be non-negative, got {value}")]
    NegativeBasePrice { key: String, value: Decimal },

    #[error("hours for move size '{key}' must be non-negative, got {value}")]
    NegativeHours { key: String, value: Decimal },

    #[error("challenge '{0}' must allow at least one flight")]
    ZeroMaxFlights(String),

    #[error("discount challenge '{key}' must have a negative modifier, got {value}")]
    NonNegativeDiscount { key: String, value: Decimal },

    #[error("distance setting '{setting}' must be non-negative, got {value}")]
    NegativeDistanceSetting {
        setting: &'static str,
        value: Decimal,
    },

    #[error("tax rate must be in [0, 1), got {0}")]
    InvalidTaxRate(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSizeRate {
    pub base_price: Decimal,
    pub hours: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierRate {
    pub multiplier: Decimal,
    #[serde(default)]
    pub description: String,
}

/// How a challenge's amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    PerFlight,
    Percentage,
    Fixed,
    Discount,
}

/// Pricing rule for a known challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeRate {
    /// `base_modifier × min(flights, max_flights)`.
    PerFlight {
        base_modifier: Decimal,
        max_flights: u32,
        #[serde(default)]
        description: String,
    },
    /// `running_total × modifier`.
    Percentage {
        modifier: Decimal,
        #[serde(default)]
        description: String,
    },
    /// `modifier` as a flat amount.
    Fixed {
        modifier: Decimal,
        #[serde(default)]
        description: String,
    },
    /// `running_total × modifier`, with a negative modifier.
    Discount {
        modifier: Decimal,
        #[serde(default)]
        description: String,
    },
}

impl ChallengeRate {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            Self::PerFlight { .. } => ChallengeKind::PerFlight,
            Self::Percentage { .. } => ChallengeKind::Percentage,
            Self::Fixed { .. } => ChallengeKind::Fixed,
            Self::Discount { .. } => ChallengeKind::Discount,
        }
    }

    /// The configured modifier (base modifier for per-flight rules).
    pub fn modifier(&self) -> Decimal {
        match self {
            Self::PerFlight { base_modifier, .. } => *base_modifier,
            Self::Percentage { modifier, .. }
            | Self::Fixed { modifier, .. }
            | Self::Discount { modifier, .. } => *modifier,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::PerFlight { description, .. }
            | Self::Percentage { description, .. }
            | Self::Fixed { description, .. }
            | Self::Discount { description, .. } => description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRate {
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub modifier: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceRate {
    pub cost_per_mile: Decimal,
    /// Routes at or below this many miles carry no travel charge.
    pub minimum_distance: Decimal,
}

impl Default for DistanceRate {
    fn default() -> Self {
        Self {
            cost_per_mile: DEFAULT_COST_PER_MILE,
            minimum_distance: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub rate: Decimal,
}

impl Default for TaxRate {
    fn default() -> Self {
        Self {
            rate: DEFAULT_TAX_RATE,
        }
    }
}

/// All pricing inputs other than the form document itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTables {
    #[serde(default)]
    pub move_size: BTreeMap<String, MoveSizeRate>,
    #[serde(default)]
    pub service_type: BTreeMap<String, MultiplierRate>,
    #[serde(default)]
    pub labor_type: BTreeMap<String, MultiplierRate>,
    #[serde(default)]
    pub time_window: BTreeMap<String, MultiplierRate>,
    #[serde(default)]
    pub challenges: BTreeMap<String, ChallengeRate>,
    #[serde(default)]
    pub additional_services: BTreeMap<String, ServiceRate>,
    #[serde(default)]
    pub distance: DistanceRate,
    #[serde(default)]
    pub tax: TaxRate,
}

impl RateTables {
    /// Validates every table entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`RateTableError`] found:
    /// - a multiplier that is zero or negative
    /// - a negative base price or hour count
    /// - a per-flight rule with `max_flights == 0`
    /// - a discount whose modifier is not negative
    /// - a negative cost per mile or minimum distance
    /// - a tax rate outside `[0, 1)`
    pub fn validate(&self) -> Result<(), RateTableError> {
        for (key, rate) in &self.move_size {
            if rate.base_price < Decimal::ZERO {
                return Err(RateTableError::NegativeBasePrice {
                    key: key.clone(),
                    value: rate.base_price,
                });
            }
            if rate.hours < Decimal::ZERO {
                return Err(RateTableError::NegativeHours {
                    key: key.clone(),
                    value: rate.hours,
                });
            }
        }

        for (table, rates) in [
            ("service type", &self.service_type),
            ("labor type", &self.labor_type),
            ("time window", &self.time_window),
        ] {
            for (key, rate) in rates {
                if rate.multiplier <= Decimal::ZERO {
                    return Err(RateTableError::NonPositiveMultiplier {
                        table,
                        key: key.clone(),
                        value: rate.multiplier,
                    });
                }
            }
        }

        for (key, rate) in &self.challenges {
            match rate {
                ChallengeRate::PerFlight { max_flights: 0, .. } => {
                    return Err(RateTableError::ZeroMaxFlights(key.clone()));
                }
                ChallengeRate::Discount { modifier, .. } if *modifier >= Decimal::ZERO => {
                    return Err(RateTableError::NonNegativeDiscount {
                        key: key.clone(),
                        value: *modifier,
                    });
                }
                _ => {}
            }
        }

        if self.distance.cost_per_mile < Decimal::ZERO {
            return Err(RateTableError::NegativeDistanceSetting {
                setting: "cost_per_mile",
                value: self.distance.cost_per_mile,
            });
        }
        if self.distance.minimum_distance < Decimal::ZERO {
            return Err(RateTableError::NegativeDistanceSetting {
                setting: "minimum_distance",
                value: self.distance.minimum_distance,
            });
        }
        if self.tax.rate < Decimal::ZERO || self.tax.rate >= Decimal::ONE {
            return Err(RateTableError::InvalidTaxRate(self.tax.rate));
        }

        Ok(())
    }
}
