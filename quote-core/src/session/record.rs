use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::FormattedEstimate;
use crate::models::{Estimate, FormDocument};

/// Where the customer was when the session was saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewDetails {
    pub user_agent: String,
    pub url: String,
    pub referrer: String,
}

/// The resumable session record, stored as JSON under one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub timestamp: DateTime<Utc>,
    pub form_data: FormDocument,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub display_logo: Option<String>,
    #[serde(default)]
    pub estimate: Option<Estimate>,
    #[serde(default)]
    pub formatted_pricing: Option<FormattedEstimate>,
    #[serde(default)]
    pub review_details: ReviewDetails,
}

impl PersistedSession {
    /// A session is resumable while its move date is today or later.
    ///
    /// Sessions without a move date are never resumable.
    pub fn is_resumable(
        &self,
        today: NaiveDate,
    ) -> bool {
        self.form_data
            .move_date
            .is_some_and(|move_date| move_date >= today)
    }
}
