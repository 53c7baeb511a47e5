//! Collaborators used by the command-line host.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quote_core::{
    AddressLookup, CollaboratorError, Coordinates, Lead, LeadReceipt, LeadSubmitter,
    RouteEstimate, RouteService,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

/// Writes each lead as a pretty-printed JSON file in an outbox directory.
///
/// The lead id is the file stem.
#[derive(Debug)]
pub struct OutboxSubmitter {
    dir: PathBuf,
    sequence: AtomicUsize,
}

impl OutboxSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl LeadSubmitter for OutboxSubmitter {
    async fn submit(
        &self,
        lead: &Lead,
    ) -> Result<LeadReceipt, CollaboratorError> {
        if lead.form.contact.email.trim().is_empty() {
            return Err(CollaboratorError::Rejected(
                "A contact email is required to submit a lead".to_string(),
            ));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!(
            "lead-{}-{sequence:03}",
            lead.submitted_at.format("%Y%m%dT%H%M%S")
        );
        let body = serde_json::to_vec_pretty(lead)
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CollaboratorError::Transport(format!("{}: {e}", self.dir.display())))?;
        let path = self.dir.join(format!("{id}.json"));
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| CollaboratorError::Transport(format!("{}: {e}", path.display())))?;

        info!(lead = %id, path = %path.display(), "lead written to outbox");
        Ok(LeadReceipt { id })
    }
}

/// Answers every route request with the same distance.
#[derive(Debug, Clone, Copy)]
pub struct FixedRouteService {
    route: RouteEstimate,
}

impl FixedRouteService {
    pub fn new(
        distance_miles: Decimal,
        duration_minutes: Decimal,
    ) -> Self {
        Self {
            route: RouteEstimate {
                distance_miles,
                duration_minutes,
            },
        }
    }
}

#[async_trait]
impl RouteService for FixedRouteService {
    async fn route(
        &self,
        from: &str,
        to: &str,
    ) -> Result<RouteEstimate, CollaboratorError> {
        debug!(from, to, miles = %self.route.distance_miles, "fixed route");
        Ok(self.route)
    }
}

/// A routing backend that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRouteService;

#[async_trait]
impl RouteService for UnavailableRouteService {
    async fn route(
        &self,
        _from: &str,
        _to: &str,
    ) -> Result<RouteEstimate, CollaboratorError> {
        Err(CollaboratorError::Transport(
            "no routing backend configured".to_string(),
        ))
    }
}

/// A known address with its coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KnownAddress {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Answers address lookups from a fixed list.
///
/// An empty book behaves like an unreachable lookup service.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: Vec<KnownAddress>,
}

/// Most suggestions returned for one query.
const MAX_SUGGESTIONS: usize = 5;

impl AddressBook {
    pub fn new(entries: Vec<KnownAddress>) -> Self {
        Self { entries }
    }

    fn ensure_available(&self) -> Result<(), CollaboratorError> {
        if self.entries.is_empty() {
            return Err(CollaboratorError::Transport(
                "no address lookup configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AddressLookup for AddressBook {
    /// Case-insensitive substring matches, prefix matches first.
    async fn suggest(
        &self,
        query: &str,
    ) -> Result<Vec<String>, CollaboratorError> {
        self.ensure_available()?;
        let query = query.trim().to_lowercase();
        let mut matches: Vec<(bool, &str)> = self
            .entries
            .iter()
            .map(|entry| entry.address.as_str())
            .filter_map(|address| {
                let lower = address.to_lowercase();
                lower
                    .contains(&query)
                    .then(|| (!lower.starts_with(&query), address))
            })
            .collect();
        matches.sort_by_key(|(not_prefix, _)| *not_prefix);
        Ok(matches
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, address)| address.to_string())
            .collect())
    }

    async fn geocode(
        &self,
        address: &str,
    ) -> Result<Coordinates, CollaboratorError> {
        self.ensure_available()?;
        let wanted = address.trim();
        self.entries
            .iter()
            .find(|entry| entry.address.eq_ignore_ascii_case(wanted))
            .map(|entry| Coordinates {
                latitude: entry.latitude,
                longitude: entry.longitude,
            })
            .ok_or_else(|| CollaboratorError::Rejected(format!("no match for '{wanted}'")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quote_core::FormDocument;
    use rust_decimal_macros::dec;

    use super::*;

    fn lead(email: &str) -> Lead {
        let mut form = FormDocument::default();
        form.contact.email = email.to_string();
        Lead::new(
            form,
            None,
            Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn outbox_writes_numbered_lead_files() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxSubmitter::new(dir.path().join("outbox"));

        let first = outbox.submit(&lead("dana@example.com")).await.unwrap();
        let second = outbox.submit(&lead("dana@example.com")).await.unwrap();

        assert_eq!(first.id, "lead-20261019T143000-001");
        assert_eq!(second.id, "lead-20261019T143000-002");

        let written = std::fs::read_to_string(outbox.dir().join(format!("{}.json", first.id)))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["contact"]["email"], "dana@example.com");
        assert_eq!(json["source"], "moovinleads-widget");
    }

    #[tokio::test]
    async fn outbox_rejects_lead_without_email() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxSubmitter::new(dir.path());

        let err = outbox.submit(&lead("  ")).await.unwrap_err();

        assert_eq!(
            err,
            CollaboratorError::Rejected("A contact email is required to submit a lead".to_string())
        );
    }

    #[tokio::test]
    async fn outbox_reports_unwritable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let outbox = OutboxSubmitter::new(file.path());

        let err = outbox.submit(&lead("dana@example.com")).await.unwrap_err();

        assert!(matches!(err, CollaboratorError::Transport(_)));
    }

    fn book() -> AddressBook {
        AddressBook::new(vec![
            KnownAddress {
                address: "99 Oak Ave, Decatur, GA".to_string(),
                latitude: 33.77,
                longitude: -84.29,
            },
            KnownAddress {
                address: "12 Elm St, Atlanta, GA".to_string(),
                latitude: 33.75,
                longitude: -84.39,
            },
            KnownAddress {
                address: "Atlanta Ave, Marietta, GA".to_string(),
                latitude: 33.95,
                longitude: -84.55,
            },
        ])
    }

    #[tokio::test]
    async fn address_book_ranks_prefix_matches_first() {
        let suggestions = book().suggest("  ATLANTA").await.unwrap();

        assert_eq!(
            suggestions,
            vec!["Atlanta Ave, Marietta, GA", "12 Elm St, Atlanta, GA"]
        );
        assert_eq!(
            book().suggest("12 elm").await.unwrap(),
            vec!["12 Elm St, Atlanta, GA"]
        );
    }

    #[tokio::test]
    async fn address_book_geocodes_exact_addresses() {
        let point = book().geocode(" 12 elm st, atlanta, ga ").await.unwrap();

        assert_eq!(point.latitude, 33.75);
        assert_eq!(
            book().geocode("1 Main St").await.unwrap_err(),
            CollaboratorError::Rejected("no match for '1 Main St'".to_string())
        );
    }

    #[tokio::test]
    async fn empty_address_book_is_unavailable() {
        let book = AddressBook::default();

        assert!(matches!(
            book.suggest("Elm").await,
            Err(CollaboratorError::Transport(_))
        ));
        assert!(book.geocode("12 Elm St").await.is_err());
    }

    #[tokio::test]
    async fn fixed_route_answers_configured_distance() {
        let service = FixedRouteService::new(dec!(12.5), dec!(25));

        let route = service.route("A", "B").await.unwrap();

        assert_eq!(route.distance_miles, dec!(12.5));
        assert!(UnavailableRouteService.route("A", "B").await.is_err());
    }
}
