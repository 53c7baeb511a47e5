use serde::Serialize;

use crate::calculations::FormattedEstimate;
use crate::models::{Estimate, FormDocument};
use crate::session::ReviewDetails;
use crate::steps::ValidationErrors;

/// Company name and logo shown by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub display_name: Option<String>,
    pub display_logo: Option<String>,
}

/// Snapshot of everything the wizard holds.
///
/// Derived values are plain functions of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub position: usize,
    pub step_count: usize,
    pub form: FormDocument,
    pub errors: ValidationErrors,
    /// Cleared whenever the form changes.
    pub estimate: Option<Estimate>,
    pub formatted: Option<FormattedEstimate>,
    pub submitting: bool,
    pub branding: Branding,
    pub review_details: ReviewDetails,
}

impl WizardState {
    pub fn new(step_count: usize) -> Self {
        Self {
            position: 0,
            step_count,
            form: FormDocument::default(),
            errors: ValidationErrors::new(),
            estimate: None,
            formatted: None,
            submitting: false,
            branding: Branding::default(),
            review_details: ReviewDetails::default(),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.position > 0
    }

    pub fn is_last_step(&self) -> bool {
        self.step_count > 0 && self.position == self.step_count - 1
    }

    /// `round((position + 1) / step_count × 100)`, halves rounded up.
    pub fn progress_percentage(&self) -> u32 {
        if self.step_count == 0 {
            return 0;
        }
        let done = (self.position as u64 + 1) * 200;
        let count = self.step_count as u64;
        ((done + count) / (2 * count)) as u32
    }
}
