//! Typed paths into the [`FormDocument`](super::FormDocument).
//!
//! Step definitions reference form fields by dotted path in configuration
//! (`"addresses.pickup.address"`). Those strings are parsed into
//! [`FieldPath`] once, when the catalog is loaded, so a typo is a load-time
//! error rather than a lookup that silently reads nothing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when reading or writing a form field through a [`FieldPath`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field path '{0}'")]
    UnknownPath(String),

    #[error("field '{path}' expects a {expected} value")]
    TypeMismatch {
        path: &'static str,
        expected: FieldKind,
    },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Storage kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Flag,
}

impl fmt::Display for FieldKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::Flag => "boolean",
        };
        f.write_str(name)
    }
}

/// Every form field a step definition may validate, write, or branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldPath {
    ServiceType,
    LaborType,
    LocationType,
    MoveSize,
    MoveDate,
    TimeWindow,
    PickupAddress,
    PickupMapUrl,
    DestinationAddress,
    DestinationMapUrl,
    ContactFirstName,
    ContactLastName,
    ContactEmail,
    ContactPhone,
    ContactPreferredChannel,
    NeedsSupplies,
    SpecialRequirements,
    TermsAccepted,
    NewsletterOptIn,
}

impl FieldPath {
    pub const ALL: [FieldPath; 19] = [
        Self::ServiceType,
        Self::LaborType,
        Self::LocationType,
        Self::MoveSize,
        Self::MoveDate,
        Self::TimeWindow,
        Self::PickupAddress,
        Self::PickupMapUrl,
        Self::DestinationAddress,
        Self::DestinationMapUrl,
        Self::ContactFirstName,
        Self::ContactLastName,
        Self::ContactEmail,
        Self::ContactPhone,
        Self::ContactPreferredChannel,
        Self::NeedsSupplies,
        Self::SpecialRequirements,
        Self::TermsAccepted,
        Self::NewsletterOptIn,
    ];

    /// The dotted path used in configuration files and error maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceType => "serviceType",
            Self::LaborType => "laborType",
            Self::LocationType => "locationType",
            Self::MoveSize => "moveSize",
            Self::MoveDate => "moveDate",
            Self::TimeWindow => "timeWindow",
            Self::PickupAddress => "addresses.pickup.address",
            Self::PickupMapUrl => "addresses.pickup.mapUrl",
            Self::DestinationAddress => "addresses.destination.address",
            Self::DestinationMapUrl => "addresses.destination.mapUrl",
            Self::ContactFirstName => "contact.firstName",
            Self::ContactLastName => "contact.lastName",
            Self::ContactEmail => "contact.email",
            Self::ContactPhone => "contact.phone",
            Self::ContactPreferredChannel => "contact.preferredContact",
            Self::NeedsSupplies => "needsSupplies",
            Self::SpecialRequirements => "specialRequirements",
            Self::TermsAccepted => "termsAccepted",
            Self::NewsletterOptIn => "newsletterOptIn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|path| path.as_str() == s)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::MoveDate => FieldKind::Date,
            Self::TermsAccepted | Self::NewsletterOptIn => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for FieldPath {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(FieldError::UnknownPath(value))
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.as_str().to_string()
    }
}

/// A value read from or written to a form field.
///
/// Dates travel as ISO `YYYY-MM-DD` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Whether the value counts as "filled in" for a required field.
    ///
    /// Blank text and `false` flags are treated as missing.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Text(text) => !text.trim().is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_path() {
        for path in FieldPath::ALL {
            assert_eq!(FieldPath::parse(path.as_str()), Some(path));
        }
    }

    #[test]
    fn parse_rejects_typo() {
        assert_eq!(FieldPath::parse("addresses.pickup.adress"), None);
    }

    #[test]
    fn try_from_reports_unknown_path() {
        let result = FieldPath::try_from("contact.fax".to_string());

        assert_eq!(result, Err(FieldError::UnknownPath("contact.fax".to_string())));
    }

    #[test]
    fn kinds_match_storage() {
        assert_eq!(FieldPath::MoveDate.kind(), FieldKind::Date);
        assert_eq!(FieldPath::TermsAccepted.kind(), FieldKind::Flag);
        assert_eq!(FieldPath::PickupAddress.kind(), FieldKind::Text);
    }

    #[test]
    fn blank_text_and_false_are_not_present() {
        assert!(!FieldValue::from("   ").is_present());
        assert!(!FieldValue::from(false).is_present());
        assert!(FieldValue::from("2-bedroom").is_present());
        assert!(FieldValue::from(true).is_present());
    }
}
