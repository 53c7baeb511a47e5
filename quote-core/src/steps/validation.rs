//! Per-field validation results.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{FieldPath, FormDocument};

/// Error key used for submission failures.
pub const SUBMIT_ERROR_KEY: &str = "submit";

const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";

const EMAIL_REGEX: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// `None` only if the pattern fails to compile; every email is then
/// rejected.
static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(EMAIL_REGEX)
        .map_err(|err| error!(%err, "email pattern failed to compile"))
        .ok()
});

/// Field key to user-facing message.
///
/// Keys are field paths (`"contact.email"`) or [`SUBMIT_ERROR_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.0.insert(key.into(), message.into());
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Records an error for `path` unless the field holds a value.
pub fn require(
    errors: &mut ValidationErrors,
    form: &FormDocument,
    path: FieldPath,
    message: Option<&str>,
) {
    if !form.is_present(path) {
        errors.insert(
            path.as_str(),
            message.unwrap_or(DEFAULT_REQUIRED_MESSAGE),
        );
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// Contact details: first and last name, a well-formed email, and a phone.
pub fn validate_contact(form: &FormDocument) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    require(
        &mut errors,
        form,
        FieldPath::ContactFirstName,
        Some("First name is required"),
    );
    require(
        &mut errors,
        form,
        FieldPath::ContactLastName,
        Some("Last name is required"),
    );
    if !form.is_present(FieldPath::ContactEmail) {
        errors.insert(FieldPath::ContactEmail.as_str(), "Email is required");
    } else if !is_valid_email(form.contact.email.trim()) {
        errors.insert(
            FieldPath::ContactEmail.as_str(),
            "Please enter a valid email",
        );
    }
    require(
        &mut errors,
        form,
        FieldPath::ContactPhone,
        Some("Phone number is required"),
    );
    errors
}
