//! The form document: everything the customer has entered so far.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog_item::{AdditionalService, SupplyItem, SupplySelection};
use super::challenge::{Challenge, ChallengeValue};
use super::field::{FieldError, FieldKind, FieldPath, FieldValue};

const NEEDS_SUPPLIES_DECLINED: &str = "no";

/// Which end of the move an address or challenge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Pickup,
    Destination,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Destination => "destination",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(Self::Pickup),
            "destination" => Some(Self::Destination),
            _ => None,
        }
    }

    /// The street address field at this end of the move.
    pub fn address_field(&self) -> FieldPath {
        match self {
            Self::Pickup => FieldPath::PickupAddress,
            Self::Destination => FieldPath::DestinationAddress,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub address: String,
    pub map_url: String,
    pub challenges: Vec<Challenge>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Addresses {
    pub pickup: Address,
    pub destination: Address,
}

impl Addresses {
    pub fn at(
        &self,
        location: Location,
    ) -> &Address {
        match location {
            Location::Pickup => &self.pickup,
            Location::Destination => &self.destination,
        }
    }

    pub fn at_mut(
        &mut self,
        location: Location,
    ) -> &mut Address {
        match location {
            Location::Pickup => &mut self.pickup,
            Location::Destination => &mut self.destination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub preferred_contact: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            preferred_contact: "phone".to_string(),
        }
    }
}

/// The single mutable record accumulating all customer input.
///
/// Every field exists at all times; missing data is an explicit `None`,
/// empty string, empty collection or `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDocument {
    pub service_type: Option<String>,
    pub labor_type: Option<String>,
    pub location_type: Option<String>,
    pub move_size: Option<String>,
    pub move_date: Option<NaiveDate>,
    pub time_window: Option<String>,
    pub addresses: Addresses,
    pub contact: Contact,
    pub additional_services: Vec<AdditionalService>,
    pub needs_supplies: Option<String>,
    pub moving_supplies: BTreeMap<String, SupplySelection>,
    pub route_distance: Option<Decimal>,
    pub route_duration: Option<Decimal>,
    pub special_requirements: String,
    pub terms_accepted: bool,
    pub newsletter_opt_in: bool,
}

impl FormDocument {
    /// Reads a field. Unset optional fields read as `None`.
    pub fn field(
        &self,
        path: FieldPath,
    ) -> Option<FieldValue> {
        let text = |s: &String| Some(FieldValue::Text(s.clone()));
        match path {
            FieldPath::ServiceType => self.service_type.as_ref().and_then(text),
            FieldPath::LaborType => self.labor_type.as_ref().and_then(text),
            FieldPath::LocationType => self.location_type.as_ref().and_then(text),
            FieldPath::MoveSize => self.move_size.as_ref().and_then(text),
            FieldPath::MoveDate => self
                .move_date
                .map(|date| FieldValue::Text(date.format("%Y-%m-%d").to_string())),
            FieldPath::TimeWindow => self.time_window.as_ref().and_then(text),
            FieldPath::PickupAddress => text(&self.addresses.pickup.address),
            FieldPath::PickupMapUrl => text(&self.addresses.pickup.map_url),
            FieldPath::DestinationAddress => text(&self.addresses.destination.address),
            FieldPath::DestinationMapUrl => text(&self.addresses.destination.map_url),
            FieldPath::ContactFirstName => text(&self.contact.first_name),
            FieldPath::ContactLastName => text(&self.contact.last_name),
            FieldPath::ContactEmail => text(&self.contact.email),
            FieldPath::ContactPhone => text(&self.contact.phone),
            FieldPath::ContactPreferredChannel => text(&self.contact.preferred_contact),
            FieldPath::NeedsSupplies => self.needs_supplies.as_ref().and_then(text),
            FieldPath::SpecialRequirements => text(&self.special_requirements),
            FieldPath::TermsAccepted => Some(FieldValue::Flag(self.terms_accepted)),
            FieldPath::NewsletterOptIn => Some(FieldValue::Flag(self.newsletter_opt_in)),
        }
    }

    /// Whether a field holds a non-empty value.
    pub fn is_present(
        &self,
        path: FieldPath,
    ) -> bool {
        self.field(path).is_some_and(|value| value.is_present())
    }

    /// Writes a field.
    ///
    /// Blank text clears optional fields. Dates must be `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] when the value kind does not
    /// match the field, and [`FieldError::InvalidDate`] for unparsable dates.
    pub fn set_field(
        &mut self,
        path: FieldPath,
        value: FieldValue,
    ) -> Result<(), FieldError> {
        match (path.kind(), value) {
            (FieldKind::Text, FieldValue::Text(text)) => {
                self.set_text(path, text);
                Ok(())
            }
            (FieldKind::Date, FieldValue::Text(text)) => {
                let trimmed = text.trim();
                self.move_date = if trimmed.is_empty() {
                    None
                } else {
                    Some(
                        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                            .map_err(|_| FieldError::InvalidDate(text.clone()))?,
                    )
                };
                Ok(())
            }
            (FieldKind::Flag, FieldValue::Flag(flag)) => {
                match path {
                    FieldPath::TermsAccepted => self.terms_accepted = flag,
                    _ => self.newsletter_opt_in = flag,
                }
                Ok(())
            }
            (expected, _) => Err(FieldError::TypeMismatch {
                path: path.as_str(),
                expected,
            }),
        }
    }

    fn set_text(
        &mut self,
        path: FieldPath,
        text: String,
    ) {
        let optional = if text.trim().is_empty() {
            None
        } else {
            Some(text.clone())
        };
        match path {
            FieldPath::ServiceType => self.service_type = optional,
            FieldPath::LaborType => self.labor_type = optional,
            FieldPath::LocationType => self.location_type = optional,
            FieldPath::MoveSize => self.move_size = optional,
            FieldPath::TimeWindow => self.time_window = optional,
            FieldPath::NeedsSupplies => self.needs_supplies = optional,
            FieldPath::PickupAddress => self.addresses.pickup.address = text,
            FieldPath::PickupMapUrl => self.addresses.pickup.map_url = text,
            FieldPath::DestinationAddress => self.addresses.destination.address = text,
            FieldPath::DestinationMapUrl => self.addresses.destination.map_url = text,
            FieldPath::ContactFirstName => self.contact.first_name = text,
            FieldPath::ContactLastName => self.contact.last_name = text,
            FieldPath::ContactEmail => self.contact.email = text,
            FieldPath::ContactPhone => self.contact.phone = text,
            FieldPath::ContactPreferredChannel => self.contact.preferred_contact = text,
            FieldPath::SpecialRequirements => self.special_requirements = text,
            FieldPath::MoveDate | FieldPath::TermsAccepted | FieldPath::NewsletterOptIn => {}
        }
    }

    /// True when the customer answered "no" to needing supplies.
    pub fn declined_supplies(&self) -> bool {
        self.needs_supplies.as_deref() == Some(NEEDS_SUPPLIES_DECLINED)
    }

    pub fn challenges(
        &self,
        location: Location,
    ) -> &[Challenge] {
        &self.addresses.at(location).challenges
    }

    /// Adds the challenge, or removes it if one with the same id is present.
    ///
    /// Returns `true` when the challenge is selected afterwards.
    pub fn toggle_challenge(
        &mut self,
        location: Location,
        challenge: Challenge,
    ) -> bool {
        let challenges = &mut self.addresses.at_mut(location).challenges;
        match challenges.iter().position(|c| c.id == challenge.id) {
            Some(index) => {
                challenges.remove(index);
                false
            }
            None => {
                challenges.push(challenge);
                true
            }
        }
    }

    /// Adds a free-text challenge unless the same text is already listed.
    pub fn add_custom_challenge(
        &mut self,
        location: Location,
        label: &str,
    ) -> bool {
        if label.trim().is_empty() {
            return false;
        }
        let challenge = Challenge::custom(label.trim());
        let challenges = &mut self.addresses.at_mut(location).challenges;
        if challenges.iter().any(|c| c.id == challenge.id) {
            return false;
        }
        challenges.push(challenge);
        true
    }

    /// Updates the answer attached to an already selected challenge.
    pub fn set_challenge_value(
        &mut self,
        location: Location,
        challenge_id: &str,
        value: ChallengeValue,
    ) -> bool {
        match self
            .addresses
            .at_mut(location)
            .challenges
            .iter_mut()
            .find(|c| c.id == challenge_id)
        {
            Some(challenge) => {
                challenge.value = value;
                true
            }
            None => false,
        }
    }

    /// Adds a service unless one with the same id is already selected.
    pub fn add_additional_service(
        &mut self,
        service: AdditionalService,
    ) -> bool {
        if self.has_additional_service(&service.id) {
            return false;
        }
        self.additional_services.push(service);
        true
    }

    pub fn remove_additional_service(
        &mut self,
        service_id: &str,
    ) -> bool {
        let before = self.additional_services.len();
        self.additional_services.retain(|s| s.id != service_id);
        before != self.additional_services.len()
    }

    pub fn has_additional_service(
        &self,
        service_id: &str,
    ) -> bool {
        self.additional_services.iter().any(|s| s.id == service_id)
    }

    /// Sets how many of a supply item the customer wants.
    ///
    /// A quantity of zero removes the line. An existing line keeps the price
    /// captured when it was first selected.
    pub fn set_supply_quantity(
        &mut self,
        item: &SupplyItem,
        quantity: u32,
    ) {
        if quantity == 0 {
            self.moving_supplies.remove(&item.id);
            return;
        }
        self.moving_supplies
            .entry(item.id.clone())
            .and_modify(|selection| selection.quantity = quantity)
            .or_insert_with(|| SupplySelection::snapshot(item, quantity));
    }

    pub fn apply_route(
        &mut self,
        distance_miles: Decimal,
        duration_minutes: Decimal,
    ) {
        self.route_distance = Some(distance_miles);
        self.route_duration = Some(duration_minutes);
    }
}
