//! Scripted wizard sessions.
//!
//! A script is a TOML file replaying what a customer does in the widget:
//!
//! ```toml
//! display_name = "Atlanta Movers"
//!
//! [[actions]]
//! action = "select"
//! value = "full-service"
//!
//! [[actions]]
//! action = "set"
//! field = "moveDate"
//! value = "2026-11-14"
//!
//! [[actions]]
//! action = "continue"
//! ```
//!
//! `[[addresses]]` entries feed the address lookup used by `address` actions.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quote_core::{ChallengeValue, FieldPath, FieldValue, Location};
use serde::Deserialize;

use crate::collaborators::KnownAddress;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ScriptAction {
    /// Picks an option on the current declarative step.
    Select { value: String },
    Set { field: FieldPath, value: FieldValue },
    /// Types `query` into an address field, takes suggestion number `pick`
    /// (or the query itself when nothing matches), and locates it.
    Address {
        location: Location,
        query: String,
        #[serde(default)]
        pick: usize,
    },
    Continue,
    Skip,
    Back,
    /// Jumps to a step by id.
    Goto { step: String },
    /// Answers the input of an already selected challenge.
    Challenge {
        location: Location,
        id: String,
        value: ChallengeValue,
    },
    CustomChallenge { location: Location, label: String },
    /// Toggles an additional service directly.
    Service {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Supply { id: String, quantity: u32 },
    /// Looks up the route. Without `miles` the lookup fails and the default
    /// distance applies.
    Route {
        #[serde(default)]
        miles: Option<String>,
        #[serde(default)]
        minutes: Option<String>,
    },
    Resume,
    StartFresh,
    Submit,
}

impl fmt::Display for ScriptAction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Select { value } => write!(f, "select {value}"),
            Self::Set { field, value } => match value {
                FieldValue::Text(text) => write!(f, "set {field} = {text:?}"),
                FieldValue::Flag(flag) => write!(f, "set {field} = {flag}"),
            },
            Self::Address { location, query, .. } => {
                write!(f, "address {} {query:?}", location.as_str())
            }
            Self::Continue => f.write_str("continue"),
            Self::Skip => f.write_str("skip"),
            Self::Back => f.write_str("back"),
            Self::Goto { step } => write!(f, "goto {step}"),
            Self::Challenge { location, id, .. } => {
                write!(f, "challenge {}/{id}", location.as_str())
            }
            Self::CustomChallenge { location, label } => {
                write!(f, "custom challenge {}/{label:?}", location.as_str())
            }
            Self::Service { id, .. } => write!(f, "service {id}"),
            Self::Supply { id, quantity } => write!(f, "supply {id} x{quantity}"),
            Self::Route { miles: Some(miles), .. } => write!(f, "route {miles} mi"),
            Self::Route { miles: None, .. } => f.write_str("route (lookup unavailable)"),
            Self::Resume => f.write_str("resume"),
            Self::StartFresh => f.write_str("start fresh"),
            Self::Submit => f.write_str("submit"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub display_logo: Option<String>,
    #[serde(default)]
    pub addresses: Vec<KnownAddress>,
    #[serde(default)]
    pub actions: Vec<ScriptAction>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid script: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_every_action_shape() {
        let script = Script::parse(
            r#"
            display_name = "Atlanta Movers"

            [[addresses]]
            address = "12 Elm St, Atlanta, GA"
            latitude = 33.75
            longitude = -84.39

            [[actions]]
            action = "select"
            value = "full-service"

            [[actions]]
            action = "address"
            location = "pickup"
            query = "12 Elm"

            [[actions]]
            action = "set"
            field = "termsAccepted"
            value = true

            [[actions]]
            action = "challenge"
            location = "pickup"
            id = "stairs"
            value = 3

            [[actions]]
            action = "custom-challenge"
            location = "destination"
            label = "Spiral staircase"

            [[actions]]
            action = "route"

            [[actions]]
            action = "start-fresh"

            [[actions]]
            action = "continue"
            "#,
        )
        .unwrap();

        assert_eq!(script.display_name.as_deref(), Some("Atlanta Movers"));
        assert_eq!(script.addresses.len(), 1);
        assert_eq!(script.addresses[0].longitude, -84.39);
        assert_eq!(
            script.actions,
            vec![
                ScriptAction::Select {
                    value: "full-service".to_string()
                },
                ScriptAction::Address {
                    location: Location::Pickup,
                    query: "12 Elm".to_string(),
                    pick: 0,
                },
                ScriptAction::Set {
                    field: FieldPath::TermsAccepted,
                    value: FieldValue::Flag(true),
                },
                ScriptAction::Challenge {
                    location: Location::Pickup,
                    id: "stairs".to_string(),
                    value: ChallengeValue::Count(3),
                },
                ScriptAction::CustomChallenge {
                    location: Location::Destination,
                    label: "Spiral staircase".to_string(),
                },
                ScriptAction::Route {
                    miles: None,
                    minutes: None,
                },
                ScriptAction::StartFresh,
                ScriptAction::Continue,
            ]
        );
    }

    #[test]
    fn rejects_unknown_action() {
        let err = Script::parse(
            r#"
            [[actions]]
            action = "teleport"
            "#,
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("teleport"));
    }

    #[test]
    fn describes_actions() {
        let action = ScriptAction::Set {
            field: FieldPath::MoveDate,
            value: FieldValue::Text("2026-11-14".to_string()),
        };

        assert_eq!(action.to_string(), "set moveDate = \"2026-11-14\"");
        assert_eq!(
            ScriptAction::Supply {
                id: "tape".to_string(),
                quantity: 2
            }
            .to_string(),
            "supply tape x2"
        );
    }
}
