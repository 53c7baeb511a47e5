//! The pricing pipeline that folds a form document into an [`Estimate`].
//!
//! # Stages
//!
//! Stages run in a fixed order; percentage stages are relative to the
//! running total accumulated so far, so reordering them changes the result.
//!
//! | Stage | Effect on the running price |
//! |-------|-----------------------------|
//! | 1     | Base price and hours from the move size (zero when unknown) |
//! | 2     | × service type multiplier |
//! | 3     | × labor type multiplier (labor-only service) |
//! | 4     | × time window multiplier |
//! | 5     | + distance × cost per mile, above the minimum distance |
//! | 6     | + pickup challenges, then destination challenges |
//! | 7     | + additional services |
//! | 8     | + moving supplies |
//! | 9     | tax = subtotal × tax rate |
//! | 10    | total = subtotal + tax |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use quote_core::calculations::EstimateWorksheet;
//! use quote_core::{FormDocument, MoveSizeRate, RateTables};
//!
//! let mut rates = RateTables::default();
//! rates.move_size.insert(
//!     "2-bedroom".to_string(),
//!     MoveSizeRate { base_price: dec!(400), hours: dec!(4), description: String::new() },
//! );
//!
//! let mut form = FormDocument::default();
//! form.move_size = Some("2-bedroom".to_string());
//!
//! let estimate = EstimateWorksheet::new(&rates).calculate(&form);
//!
//! assert_eq!(estimate.subtotal, dec!(400));
//! assert_eq!(estimate.tax, dec!(32));
//! assert_eq!(estimate.total, dec!(432));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::round_whole;
use crate::collaborators::MAX_ROUTE_DISTANCE_MILES;
use crate::models::{
    AdditionalService, ChallengeCharge, ChallengeRate, Estimate, FormDocument, Location,
    Modifier, RateTables, ServiceCharge, ServiceKind, SupplyCharge, SupplySelection,
};

/// Service type whose price is further scaled by the labor type.
pub const LABOR_ONLY_SERVICE: &str = "labor-only";

const UNKNOWN_CHALLENGE: &str = "Unknown challenge";
const CUSTOM_CHALLENGE: &str = "Custom challenge (not priced)";

/// Low end of a pre-estimate range, as a fraction of the base price.
const RANGE_LOW_FACTOR: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// High end of a pre-estimate range, as a fraction of the base price.
const RANGE_HIGH_FACTOR: Decimal = Decimal::from_parts(145, 0, 0, false, 2);

/// A rough price range shown before the full estimate is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
    pub hours: Decimal,
    pub description: String,
}

/// Calculator for move estimates.
///
/// Borrows the rate tables; never mutates them or the form document.
#[derive(Debug, Clone)]
pub struct EstimateWorksheet<'a> {
    rates: &'a RateTables,
}

impl<'a> EstimateWorksheet<'a> {
    pub fn new(rates: &'a RateTables) -> Self {
        Self { rates }
    }

    /// Runs every pricing stage and returns the complete estimate.
    ///
    /// Never fails: missing selections price as zero and unknown challenges
    /// are recorded with a zero amount.
    pub fn calculate(
        &self,
        form: &FormDocument,
    ) -> Estimate {
        let mut modifiers = Vec::new();

        let (base_price, estimated_hours) = self.base_price(form.move_size.as_deref());

        let mut price = self.apply_service_type(
            base_price,
            form.service_type.as_deref(),
            &mut modifiers,
        );
        price = self.apply_labor_type(price, form, &mut modifiers);
        price = self.apply_time_window(price, form.time_window.as_deref(), &mut modifiers);

        let distance = form.route_distance.unwrap_or(Decimal::ZERO);
        let distance_cost = self.distance_cost(distance);
        let mut running_total = price.checked_add(distance_cost).unwrap_or_else(|| {
            warn!(%price, %distance_cost, "distance cost does not fit, ignored");
            price
        });

        let mut challenges = Vec::new();
        for location in [Location::Pickup, Location::Destination] {
            running_total = self.apply_challenges(form, location, running_total, &mut challenges);
        }

        let (running_total, additional_services) =
            self.apply_services(&form.additional_services, running_total);

        let moving_supplies = self.supply_charges(&form.moving_supplies);
        let supplies_total: Decimal = moving_supplies.iter().map(|s| s.amount).sum();

        let subtotal = running_total + supplies_total;
        let tax = self.tax(subtotal);
        let total = subtotal + tax;

        debug!(
            move_size = ?form.move_size,
            %subtotal,
            %tax,
            %total,
            "estimate calculated"
        );

        Estimate {
            move_size: form.move_size.clone(),
            base_price,
            service_type: form.service_type.clone(),
            time_window: form.time_window.clone(),
            distance,
            distance_cost,
            challenges,
            additional_services,
            moving_supplies,
            modifiers,
            subtotal,
            tax,
            total,
            estimated_hours,
        }
    }

    /// Pre-estimate range for a move size, rounded to whole currency units.
    ///
    /// Unknown sizes yield an all-zero range.
    pub fn price_range(
        &self,
        move_size: &str,
    ) -> PriceRange {
        match self.rates.move_size.get(move_size) {
            Some(rate) => PriceRange {
                min: round_whole(rate.base_price * RANGE_LOW_FACTOR),
                max: round_whole(rate.base_price * RANGE_HIGH_FACTOR),
                hours: rate.hours,
                description: rate.description.clone(),
            },
            None => PriceRange::default(),
        }
    }

    /// Base price and hours for the move size.
    fn base_price(
        &self,
        move_size: Option<&str>,
    ) -> (Decimal, Decimal) {
        move_size
            .and_then(|size| self.rates.move_size.get(size))
            .map(|rate| (rate.base_price, rate.hours))
            .unwrap_or((Decimal::ZERO, Decimal::ZERO))
    }

    fn apply_service_type(
        &self,
        price: Decimal,
        service_type: Option<&str>,
        modifiers: &mut Vec<Modifier>,
    ) -> Decimal {
        let Some((key, rate)) =
            service_type.and_then(|key| self.rates.service_type.get_key_value(key))
        else {
            return price;
        };
        modifiers.push(Modifier::multiplier(
            format!("Service Type ({key})"),
            rate.multiplier,
            rate.description.clone(),
        ));
        price * rate.multiplier
    }

    /// Applies the labor type multiplier; only labor-only moves have one.
    fn apply_labor_type(
        &self,
        price: Decimal,
        form: &FormDocument,
        modifiers: &mut Vec<Modifier>,
    ) -> Decimal {
        if form.service_type.as_deref() != Some(LABOR_ONLY_SERVICE) {
            return price;
        }
        let Some((key, rate)) = form
            .labor_type
            .as_deref()
            .and_then(|key| self.rates.labor_type.get_key_value(key))
        else {
            return price;
        };
        modifiers.push(Modifier::multiplier(
            format!("Labor Type ({key})"),
            rate.multiplier,
            rate.description.clone(),
        ));
        price * rate.multiplier
    }

    /// Applies the time window multiplier, recording it only when it is not 1.
    fn apply_time_window(
        &self,
        price: Decimal,
        time_window: Option<&str>,
        modifiers: &mut Vec<Modifier>,
    ) -> Decimal {
        let Some((key, rate)) =
            time_window.and_then(|key| self.rates.time_window.get_key_value(key))
        else {
            return price;
        };
        if rate.multiplier != Decimal::ONE {
            modifiers.push(Modifier::multiplier(
                format!("Time Window ({key})"),
                rate.multiplier,
                rate.description.clone(),
            ));
        }
        price * rate.multiplier
    }

    /// Mileage charge above the minimum distance.
    ///
    /// Negative distances and distances beyond [`MAX_ROUTE_DISTANCE_MILES`]
    /// cost nothing.
    fn distance_cost(
        &self,
        distance: Decimal,
    ) -> Decimal {
        if distance < Decimal::ZERO || distance > MAX_ROUTE_DISTANCE_MILES {
            warn!(%distance, "implausible route distance, not charged");
            return Decimal::ZERO;
        }
        if distance <= self.rates.distance.minimum_distance {
            return Decimal::ZERO;
        }
        distance
            .checked_mul(self.rates.distance.cost_per_mile)
            .unwrap_or_else(|| {
                warn!(%distance, "mileage charge does not fit, not charged");
                Decimal::ZERO
            })
    }

    /// Prices the challenges at one location in entry order.
    ///
    /// Each amount is added to the running total before the next challenge
    /// is priced. Returns the updated running total.
    fn apply_challenges(
        &self,
        form: &FormDocument,
        location: Location,
        mut running_total: Decimal,
        charges: &mut Vec<ChallengeCharge>,
    ) -> Decimal {
        for challenge in form.challenges(location) {
            let rate = if challenge.is_custom {
                None
            } else {
                self.rates.challenges.get(&challenge.id)
            };

            let Some(rate) = rate else {
                let description = if challenge.is_custom {
                    CUSTOM_CHALLENGE
                } else {
                    UNKNOWN_CHALLENGE
                };
                debug!(
                    location = location.as_str(),
                    id = %challenge.id,
                    "challenge has no rate, recorded at zero"
                );
                charges.push(ChallengeCharge {
                    location,
                    id: challenge.id.clone(),
                    name: challenge.label.clone(),
                    kind: None,
                    modifier: Decimal::ZERO,
                    amount: Decimal::ZERO,
                    description: description.to_string(),
                    value: challenge.value.clone(),
                });
                continue;
            };

            let amount = match rate {
                ChallengeRate::PerFlight {
                    base_modifier,
                    max_flights,
                    ..
                } => {
                    let flights = challenge.value.flights().min(*max_flights);
                    *base_modifier * Decimal::from(flights)
                }
                ChallengeRate::Percentage { modifier, .. }
                | ChallengeRate::Discount { modifier, .. } => running_total * *modifier,
                ChallengeRate::Fixed { modifier, .. } => *modifier,
            };

            if amount.is_zero() {
                continue;
            }

            charges.push(ChallengeCharge {
                location,
                id: challenge.id.clone(),
                name: challenge.label.clone(),
                kind: Some(rate.kind()),
                modifier: rate.modifier(),
                amount,
                description: rate.description().to_string(),
                value: challenge.value.clone(),
            });
            running_total += amount;
        }
        running_total
    }

    /// Prices selected services. Services without a rate are skipped.
    fn apply_services(
        &self,
        services: &[AdditionalService],
        mut running_total: Decimal,
    ) -> (Decimal, Vec<ServiceCharge>) {
        let mut charges = Vec::with_capacity(services.len());
        for service in services {
            let Some(rate) = self.rates.additional_services.get(&service.id) else {
                debug!(id = %service.id, "service has no rate, skipped");
                continue;
            };
            let amount = match rate.kind {
                ServiceKind::Percentage => running_total * rate.modifier,
                ServiceKind::Fixed => rate.modifier,
            };
            charges.push(ServiceCharge {
                id: service.id.clone(),
                name: service.name.clone(),
                kind: rate.kind,
                modifier: rate.modifier,
                amount,
                description: rate.description.clone(),
            });
            running_total += amount;
        }
        (running_total, charges)
    }

    fn supply_charges(
        &self,
        supplies: &BTreeMap<String, SupplySelection>,
    ) -> Vec<SupplyCharge> {
        supplies
            .iter()
            .filter(|(_, supply)| supply.quantity > 0)
            .map(|(id, supply)| SupplyCharge {
                id: id.clone(),
                name: supply.name.clone(),
                price: supply.price,
                quantity: supply.quantity,
                amount: supply.price * Decimal::from(supply.quantity),
                description: supply.description.clone(),
            })
            .collect()
    }

    fn tax(
        &self,
        subtotal: Decimal,
    ) -> Decimal {
        subtotal * self.rates.tax.rate
    }
}
