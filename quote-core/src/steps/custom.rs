//! Steps whose behaviour is implemented in code rather than described by a
//! [`StepDefinition`](super::StepDefinition).

use std::fmt;

use crate::models::{FieldPath, FormDocument};
use crate::steps::validation::{ValidationErrors, require, validate_contact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomStep {
    Contact,
    DateSelection,
    TimeSelection,
    MoveType,
    MovingSuppliesSelection,
    ReviewDetails,
    VoiceflowScreen,
    Confirmation,
}

impl CustomStep {
    pub const ALL: [CustomStep; 8] = [
        Self::Contact,
        Self::DateSelection,
        Self::TimeSelection,
        Self::MoveType,
        Self::MovingSuppliesSelection,
        Self::ReviewDetails,
        Self::VoiceflowScreen,
        Self::Confirmation,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::DateSelection => "date",
            Self::TimeSelection => "time",
            Self::MoveType => "move-type",
            Self::MovingSuppliesSelection => "moving-supplies-selection",
            Self::ReviewDetails => "review-details",
            Self::VoiceflowScreen => "voiceflow-screen",
            Self::Confirmation => "confirmation",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.id() == id)
    }

    pub fn validate(
        &self,
        form: &FormDocument,
    ) -> ValidationErrors {
        match self {
            Self::Contact => validate_contact(form),
            Self::DateSelection => {
                single(form, FieldPath::MoveDate, "Please select a move date")
            }
            Self::TimeSelection => {
                single(form, FieldPath::TimeWindow, "Please select a time window")
            }
            Self::MoveType => single(
                form,
                FieldPath::LocationType,
                "Please select a location type",
            ),
            Self::MovingSuppliesSelection
            | Self::ReviewDetails
            | Self::VoiceflowScreen
            | Self::Confirmation => ValidationErrors::new(),
        }
    }

    /// Whether the shared footer drives this step. Other custom steps move
    /// the wizard on their own.
    pub fn uses_shared_footer(&self) -> bool {
        matches!(
            self,
            Self::Contact | Self::MovingSuppliesSelection | Self::ReviewDetails
        )
    }

    pub fn can_skip(&self) -> bool {
        matches!(self, Self::MovingSuppliesSelection)
    }

    pub fn button_text(&self) -> &'static str {
        match self {
            Self::MovingSuppliesSelection => "Complete Selection",
            Self::ReviewDetails => "Continue to Final Review",
            _ => "Continue",
        }
    }
}

impl fmt::Display for CustomStep {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn single(
    form: &FormDocument,
    path: FieldPath,
    message: &str,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    require(&mut errors, form, path, Some(message));
    errors
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ids_round_trip() {
        for step in CustomStep::ALL {
            assert_eq!(CustomStep::parse(step.id()), Some(step));
        }
        assert_eq!(CustomStep::parse("welcome"), None);
    }

    #[test]
    fn date_step_requires_move_date() {
        let errors = CustomStep::DateSelection.validate(&FormDocument::default());

        assert_eq!(errors.get("moveDate"), Some("Please select a move date"));
    }

    #[test]
    fn move_type_step_requires_location_type() {
        let mut form = FormDocument::default();
        assert!(!CustomStep::MoveType.validate(&form).is_empty());

        form.location_type = Some("house".to_string());

        assert!(CustomStep::MoveType.validate(&form).is_empty());
    }

    #[test]
    fn footer_steps_advertise_navigation() {
        assert!(CustomStep::Contact.uses_shared_footer());
        assert!(!CustomStep::Contact.can_skip());
        assert!(CustomStep::MovingSuppliesSelection.can_skip());
        assert_eq!(
            CustomStep::ReviewDetails.button_text(),
            "Continue to Final Review"
        );
        assert!(!CustomStep::DateSelection.uses_shared_footer());
        assert!(!CustomStep::Confirmation.uses_shared_footer());
    }

    #[test]
    fn review_step_always_validates() {
        assert!(
            CustomStep::ReviewDetails
                .validate(&FormDocument::default())
                .is_empty()
        );
    }
}
