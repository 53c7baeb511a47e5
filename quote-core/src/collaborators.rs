//! Boundaries to external services: lead submission, routing and address
//! lookup.
//!
//! Implementations live outside this crate. Failures never block the wizard:
//! routing and lookup errors degrade to documented defaults, and submission
//! errors are surfaced to the customer verbatim.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{Estimate, FormDocument};

/// Source tag attached to every submitted lead.
pub const LEAD_SOURCE: &str = "moovinleads-widget";

/// Route distance assumed when routing fails.
pub const FALLBACK_DISTANCE_MILES: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Route duration assumed when routing fails.
pub const FALLBACK_DURATION_MINUTES: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Longest route accepted from a routing service.
pub const MAX_ROUTE_DISTANCE_MILES: Decimal = Decimal::from_parts(5_000, 0, 0, false, 0);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The service answered and refused the request; the message is shown
    /// to the customer as-is.
    #[error("{0}")]
    Rejected(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub distance_miles: Decimal,
    pub duration_minutes: Decimal,
}

impl RouteEstimate {
    pub fn fallback() -> Self {
        Self {
            distance_miles: FALLBACK_DISTANCE_MILES,
            duration_minutes: FALLBACK_DURATION_MINUTES,
        }
    }

    /// Rejects negative values and distances above
    /// [`MAX_ROUTE_DISTANCE_MILES`].
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Malformed`] describing the bad value.
    pub fn check(self) -> Result<Self, CollaboratorError> {
        if self.distance_miles < Decimal::ZERO || self.duration_minutes < Decimal::ZERO {
            return Err(CollaboratorError::Malformed(format!(
                "negative route: {} mi, {} min",
                self.distance_miles, self.duration_minutes
            )));
        }
        if self.distance_miles > MAX_ROUTE_DISTANCE_MILES {
            return Err(CollaboratorError::Malformed(format!(
                "route of {} mi exceeds {MAX_ROUTE_DISTANCE_MILES} mi",
                self.distance_miles
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// `geo:` URI (RFC 5870) stored as an address's map link.
    pub fn geo_uri(&self) -> String {
        format!("geo:{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// The payload handed to the lead submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(flatten)]
    pub form: FormDocument,
    pub estimate: Option<Estimate>,
    pub submitted_at: DateTime<Utc>,
    pub source: String,
}

impl Lead {
    pub fn new(
        form: FormDocument,
        estimate: Option<Estimate>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            form,
            estimate,
            submitted_at,
            source: LEAD_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadReceipt {
    pub id: String,
}

#[async_trait]
pub trait LeadSubmitter: Send + Sync {
    async fn submit(
        &self,
        lead: &Lead,
    ) -> Result<LeadReceipt, CollaboratorError>;
}

#[async_trait]
pub trait RouteService: Send + Sync {
    async fn route(
        &self,
        from: &str,
        to: &str,
    ) -> Result<RouteEstimate, CollaboratorError>;
}

#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Ranked address suggestions for a partial query.
    async fn suggest(
        &self,
        query: &str,
    ) -> Result<Vec<String>, CollaboratorError>;

    async fn geocode(
        &self,
        address: &str,
    ) -> Result<Coordinates, CollaboratorError>;
}

/// Routes between two addresses, falling back to 10 miles / 20 minutes
/// when the lookup fails or answers with an impossible route.
pub async fn route_or_default(
    service: &dyn RouteService,
    from: &str,
    to: &str,
) -> RouteEstimate {
    match service.route(from, to).await.and_then(RouteEstimate::check) {
        Ok(route) => route,
        Err(err) => {
            warn!(error = %err, "route lookup failed, using default distance");
            RouteEstimate::fallback()
        }
    }
}

pub async fn suggestions_or_empty(
    lookup: &dyn AddressLookup,
    query: &str,
) -> Vec<String> {
    lookup.suggest(query).await.unwrap_or_else(|err| {
        warn!(error = %err, "address suggestions unavailable");
        Vec::new()
    })
}

pub async fn geocode_or_none(
    lookup: &dyn AddressLookup,
    address: &str,
) -> Option<Coordinates> {
    match lookup.geocode(address).await {
        Ok(coordinates) => Some(coordinates),
        Err(err) => {
            warn!(error = %err, "geocoding failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    struct Offline;

    #[async_trait]
    impl RouteService for Offline {
        async fn route(
            &self,
            _from: &str,
            _to: &str,
        ) -> Result<RouteEstimate, CollaboratorError> {
            Err(CollaboratorError::Transport("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl AddressLookup for Offline {
        async fn suggest(
            &self,
            _query: &str,
        ) -> Result<Vec<String>, CollaboratorError> {
            Err(CollaboratorError::Malformed("empty body".to_string()))
        }

        async fn geocode(
            &self,
            _address: &str,
        ) -> Result<Coordinates, CollaboratorError> {
            Err(CollaboratorError::Transport("timeout".to_string()))
        }
    }

    struct Answers(RouteEstimate);

    #[async_trait]
    impl RouteService for Answers {
        async fn route(
            &self,
            _from: &str,
            _to: &str,
        ) -> Result<RouteEstimate, CollaboratorError> {
            Ok(self.0)
        }
    }

    fn answer(
        distance_miles: Decimal,
        duration_minutes: Decimal,
    ) -> Answers {
        Answers(RouteEstimate {
            distance_miles,
            duration_minutes,
        })
    }

    // =========================================================================
    // Routing
    // =========================================================================

    #[tokio::test]
    async fn failed_route_uses_documented_default() {
        let route = route_or_default(&Offline, "A", "B").await;

        assert_eq!(route.distance_miles, dec!(10));
        assert_eq!(route.duration_minutes, dec!(20));
    }

    #[tokio::test]
    async fn plausible_route_is_kept() {
        let route = route_or_default(&answer(dec!(4999.5), dec!(4800)), "A", "B").await;

        assert_eq!(route.distance_miles, dec!(4999.5));
        assert_eq!(route.duration_minutes, dec!(4800));
    }

    #[tokio::test]
    async fn impossible_route_uses_documented_default() {
        for service in [
            answer(dec!(-3), dec!(20)),
            answer(dec!(12), dec!(-1)),
            answer(dec!(5000.01), dec!(20)),
            answer(Decimal::MAX, dec!(20)),
        ] {
            assert_eq!(
                route_or_default(&service, "A", "B").await,
                RouteEstimate::fallback()
            );
        }
    }

    #[test]
    fn check_reports_the_bad_distance() {
        let err = RouteEstimate {
            distance_miles: dec!(9000),
            duration_minutes: dec!(20),
        }
        .check()
        .unwrap_err();

        assert_eq!(
            err,
            CollaboratorError::Malformed("route of 9000 mi exceeds 5000 mi".to_string())
        );
    }

    // =========================================================================
    // Address lookup
    // =========================================================================

    #[tokio::test]
    async fn failed_lookup_degrades() {
        assert!(suggestions_or_empty(&Offline, "12 El").await.is_empty());
        assert_eq!(geocode_or_none(&Offline, "12 Elm St").await, None);
    }

    #[test]
    fn coordinates_format_as_geo_uri() {
        let point = Coordinates {
            latitude: 33.7490,
            longitude: -84.388,
        };

        assert_eq!(point.geo_uri(), "geo:33.749000,-84.388000");
    }

    // =========================================================================
    // Leads
    // =========================================================================

    #[test]
    fn lead_flattens_form_and_tags_source() {
        let lead = Lead::new(
            FormDocument {
                move_size: Some("studio".to_string()),
                ..FormDocument::default()
            },
            None,
            DateTime::<Utc>::default(),
        );

        let json = serde_json::to_value(&lead).unwrap();

        assert_eq!(json["moveSize"], "studio");
        assert_eq!(json["source"], LEAD_SOURCE);
        assert!(json.get("submittedAt").is_some());
    }

    #[test]
    fn rejected_message_displays_verbatim() {
        let err = CollaboratorError::Rejected("Phone number is invalid".to_string());

        assert_eq!(err.to_string(), "Phone number is invalid");
    }
}
