//! Declarative step definitions, as read from the step catalog file.

use serde::{Deserialize, Serialize};

use crate::models::{FieldPath, FieldValue, FormDocument, Location};
use crate::steps::validation::{ValidationErrors, require};

const DEFAULT_BUTTON_TEXT: &str = "Continue";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub field: Option<FieldPath>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Visibility rule evaluated against the live form document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditional {
    pub field: FieldPath,
    pub value: FieldValue,
    #[serde(default)]
    pub skip_if_not: bool,
}

impl Conditional {
    /// True when the step must be skipped for this form.
    pub fn hides(
        &self,
        form: &FormDocument,
    ) -> bool {
        self.skip_if_not && form.field(self.field).as_ref() != Some(&self.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Grid,
    List,
    Form,
    Calendar,
    Challenges,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub has_input: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryAction {
    Auto,
    #[default]
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryButton {
    #[serde(default)]
    pub action: PrimaryAction,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    #[serde(default)]
    pub primary: PrimaryButton,
}

/// What choosing one of a step's options changes in the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selects {
    /// Writes the option value into the validation field.
    #[default]
    Field,
    /// Toggles the option as an additional service.
    AdditionalServices,
}

/// Where a selected option lands in the form document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Field(FieldPath),
    Challenges(Location),
    AdditionalServices,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub validation: ValidationRule,
    #[serde(default)]
    pub conditional: Option<Conditional>,
    #[serde(default)]
    pub layout: LayoutKind,
    /// Which address a challenges layout edits.
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub selects: Selects,
    #[serde(default)]
    pub options: Vec<StepOption>,
    #[serde(default)]
    pub buttons: Buttons,
}

impl StepDefinition {
    /// Selecting an option advances immediately.
    pub fn is_auto(&self) -> bool {
        self.buttons.primary.action == PrimaryAction::Auto
    }

    pub fn can_skip(&self) -> bool {
        !self.validation.required
    }

    pub fn button_text(&self) -> &str {
        self.buttons
            .primary
            .text
            .as_deref()
            .unwrap_or(DEFAULT_BUTTON_TEXT)
    }

    pub fn is_hidden(
        &self,
        form: &FormDocument,
    ) -> bool {
        self.conditional
            .as_ref()
            .is_some_and(|conditional| conditional.hides(form))
    }

    pub fn option(
        &self,
        value: &str,
    ) -> Option<&StepOption> {
        self.options.iter().find(|option| option.value == value)
    }

    pub fn selection_target(&self) -> Option<SelectionTarget> {
        if self.layout == LayoutKind::Challenges {
            return self.location.map(SelectionTarget::Challenges);
        }
        match self.selects {
            Selects::AdditionalServices => Some(SelectionTarget::AdditionalServices),
            Selects::Field => self.validation.field.map(SelectionTarget::Field),
        }
    }

    /// Passes unless the step is required and its field is empty.
    pub fn validate(
        &self,
        form: &FormDocument,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let (true, Some(field)) = (self.validation.required, self.validation.field) {
            require(
                &mut errors,
                form,
                field,
                self.validation.error_message.as_deref(),
            );
        }
        errors
    }
}
