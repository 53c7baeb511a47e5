//! The ordered step registry and its configuration checks.

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use crate::models::{FieldPath, FormDocument, RateTables};
use crate::steps::custom::CustomStep;
use crate::steps::definition::{LayoutKind, SelectionTarget, StepDefinition};
use crate::steps::validation::ValidationErrors;

/// Step id of the "do you need supplies?" question.
pub const SUPPLY_GATE_STEP: &str = "moving-supplies-question";

/// Configuration errors detected while building or checking a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("step order is empty")]
    EmptyOrder,

    #[error("step '{0}' appears more than once in the step order")]
    DuplicateStep(String),

    #[error("step '{0}' is defined more than once")]
    DuplicateDefinition(String),

    #[error("step '{0}' has neither a definition nor a custom handler")]
    UnresolvedStep(String),

    #[error("challenge step '{0}' has no location")]
    MissingChallengeLocation(String),

    #[error("required step '{0}' has no validation field")]
    RequiredWithoutField(String),

    #[error("auto-advance step '{0}' has no options")]
    AutoWithoutOptions(String),

    #[error("step '{0}' has options but no field to write them to")]
    OptionsWithoutField(String),

    #[error("step '{step}' offers {field} '{value}' which has no rate table entry")]
    UnpricedOption {
        step: String,
        field: FieldPath,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepKind {
    Declarative(StepDefinition),
    Custom(CustomStep),
}

/// A step resolved from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepHandle<'a> {
    Declarative(&'a StepDefinition),
    Custom(CustomStep),
}

impl StepHandle<'_> {
    pub fn id(&self) -> &str {
        match self {
            Self::Declarative(definition) => &definition.id,
            Self::Custom(step) => step.id(),
        }
    }

    /// Whether a conditional rule hides this step for the given form.
    pub fn is_hidden(
        &self,
        form: &FormDocument,
    ) -> bool {
        match self {
            Self::Declarative(definition) => definition.is_hidden(form),
            Self::Custom(_) => false,
        }
    }

    pub fn validate(
        &self,
        form: &FormDocument,
    ) -> ValidationErrors {
        match self {
            Self::Declarative(definition) => definition.validate(form),
            Self::Custom(step) => step.validate(form),
        }
    }
}

/// Ordered registry of every step in the wizard.
///
/// Built once from configuration; every id in the order resolves to exactly
/// one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    steps: Vec<StepKind>,
}

impl StepCatalog {
    /// Resolves every id in `order` against the declarative definitions and
    /// the custom step registry. A definition takes precedence over a custom
    /// handler with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if:
    /// - the order is empty or repeats an id
    /// - two definitions share an id
    /// - an id has no handler
    /// - a definition is internally inconsistent (challenge layout without a
    ///   location, required without a field, auto-advance without options)
    pub fn build(
        order: &[String],
        definitions: Vec<StepDefinition>,
    ) -> Result<Self, CatalogError> {
        if order.is_empty() {
            return Err(CatalogError::EmptyOrder);
        }

        let mut seen = HashSet::new();
        for id in order {
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::DuplicateStep(id.clone()));
            }
        }

        let mut defined = HashSet::new();
        for definition in &definitions {
            if !defined.insert(definition.id.clone()) {
                return Err(CatalogError::DuplicateDefinition(definition.id.clone()));
            }
            check_definition(definition)?;
            if !seen.contains(definition.id.as_str()) {
                warn!(step = %definition.id, "step definition is not in the step order");
            }
        }

        let mut definitions = definitions;
        let mut steps = Vec::with_capacity(order.len());
        for id in order {
            let kind = match definitions.iter().position(|d| &d.id == id) {
                Some(index) => StepKind::Declarative(definitions.swap_remove(index)),
                None => CustomStep::parse(id)
                    .map(StepKind::Custom)
                    .ok_or_else(|| CatalogError::UnresolvedStep(id.clone()))?,
            };
            steps.push(kind);
        }

        Ok(Self { steps })
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn resolve_step(
        &self,
        index: usize,
    ) -> Option<StepHandle<'_>> {
        self.steps.get(index).map(|kind| match kind {
            StepKind::Declarative(definition) => StepHandle::Declarative(definition),
            StepKind::Custom(step) => StepHandle::Custom(*step),
        })
    }

    pub fn step_id(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.steps.get(index).map(|kind| match kind {
            StepKind::Declarative(definition) => definition.id.as_str(),
            StepKind::Custom(step) => step.id(),
        })
    }

    pub fn index_of(
        &self,
        id: &str,
    ) -> Option<usize> {
        (0..self.steps.len()).find(|&index| self.step_id(index) == Some(id))
    }

    pub fn index_of_custom(
        &self,
        step: CustomStep,
    ) -> Option<usize> {
        self.steps
            .iter()
            .position(|kind| matches!(kind, StepKind::Custom(s) if *s == step))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter().filter_map(|kind| match kind {
            StepKind::Declarative(definition) => Some(definition),
            StepKind::Custom(_) => None,
        })
    }

    /// Checks that every option the wizard can write into a priced field has
    /// a rate. Challenge and service options without a rate only log a
    /// warning; they price as zero at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnpricedOption`] for the first move size,
    /// service type, labor type or time window option with no rate.
    pub fn check_rates(
        &self,
        rates: &RateTables,
    ) -> Result<(), CatalogError> {
        for definition in self.definitions() {
            match definition.selection_target() {
                Some(SelectionTarget::Field(field)) => {
                    let unpriced = definition
                        .options
                        .iter()
                        .find(|option| has_rate(rates, field, &option.value) == Some(false));
                    if let Some(option) = unpriced {
                        return Err(CatalogError::UnpricedOption {
                            step: definition.id.clone(),
                            field,
                            value: option.value.clone(),
                        });
                    }
                }
                Some(SelectionTarget::Challenges(_)) => {
                    for option in &definition.options {
                        if !rates.challenges.contains_key(&option.value) {
                            warn!(
                                step = %definition.id,
                                challenge = %option.value,
                                "challenge option has no rate and will price as zero"
                            );
                        }
                    }
                }
                Some(SelectionTarget::AdditionalServices) => {
                    for option in &definition.options {
                        if !rates.additional_services.contains_key(&option.value) {
                            warn!(
                                step = %definition.id,
                                service = %option.value,
                                "service option has no rate and will not be priced"
                            );
                        }
                    }
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// `None` when the field is not priced by the rate tables.
fn has_rate(
    rates: &RateTables,
    field: FieldPath,
    value: &str,
) -> Option<bool> {
    match field {
        FieldPath::MoveSize => Some(rates.move_size.contains_key(value)),
        FieldPath::ServiceType => Some(rates.service_type.contains_key(value)),
        FieldPath::LaborType => Some(rates.labor_type.contains_key(value)),
        FieldPath::TimeWindow => Some(rates.time_window.contains_key(value)),
        _ => None,
    }
}

fn check_definition(definition: &StepDefinition) -> Result<(), CatalogError> {
    if definition.layout == LayoutKind::Challenges && definition.location.is_none() {
        return Err(CatalogError::MissingChallengeLocation(definition.id.clone()));
    }
    if definition.validation.required && definition.validation.field.is_none() {
        return Err(CatalogError::RequiredWithoutField(definition.id.clone()));
    }
    if definition.is_auto() && definition.options.is_empty() {
        return Err(CatalogError::AutoWithoutOptions(definition.id.clone()));
    }
    if !definition.options.is_empty() && definition.selection_target().is_none() {
        return Err(CatalogError::OptionsWithoutField(definition.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Location, MoveSizeRate};
    use crate::steps::definition::{Selects, StepOption, ValidationRule};

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn select_step(
        id: &str,
        field: FieldPath,
        values: &[&str],
    ) -> StepDefinition {
        StepDefinition {
            id: id.to_string(),
            title: String::new(),
            validation: ValidationRule {
                required: true,
                field: Some(field),
                error_message: None,
            },
            conditional: None,
            layout: LayoutKind::Grid,
            location: None,
            selects: Selects::Field,
            options: values
                .iter()
                .map(|v| StepOption {
                    value: v.to_string(),
                    label: v.to_string(),
                    has_input: false,
                })
                .collect(),
            buttons: Default::default(),
        }
    }

    // =========================================================================
    // build tests
    // =========================================================================

    #[test]
    fn build_resolves_declarative_and_custom_steps() {
        let catalog = StepCatalog::build(
            &order(&["move-size", "date", "contact"]),
            vec![select_step("move-size", FieldPath::MoveSize, &["studio"])],
        )
        .unwrap();

        assert_eq!(catalog.step_count(), 3);
        assert!(matches!(
            catalog.resolve_step(0),
            Some(StepHandle::Declarative(_))
        ));
        assert_eq!(
            catalog.resolve_step(1),
            Some(StepHandle::Custom(CustomStep::DateSelection))
        );
        assert_eq!(catalog.resolve_step(3), None);
        assert_eq!(catalog.index_of("contact"), Some(2));
        assert_eq!(catalog.index_of_custom(CustomStep::Contact), Some(2));
    }

    #[test]
    fn every_index_resolves_to_one_handler() {
        let catalog = StepCatalog::build(
            &order(&["move-size", "date", "time", "review-details"]),
            vec![select_step("move-size", FieldPath::MoveSize, &["studio"])],
        )
        .unwrap();

        for index in 0..catalog.step_count() {
            let handle = catalog.resolve_step(index).unwrap();
            assert_eq!(Some(handle.id()), catalog.step_id(index));
        }
    }

    #[test]
    fn build_rejects_unresolved_step() {
        let result = StepCatalog::build(&order(&["welcome"]), Vec::new());

        assert_eq!(
            result,
            Err(CatalogError::UnresolvedStep("welcome".to_string()))
        );
    }

    #[test]
    fn build_rejects_empty_and_duplicate_order() {
        assert_eq!(
            StepCatalog::build(&[], Vec::new()),
            Err(CatalogError::EmptyOrder)
        );
        assert_eq!(
            StepCatalog::build(&order(&["date", "date"]), Vec::new()),
            Err(CatalogError::DuplicateStep("date".to_string()))
        );
    }

    #[test]
    fn build_rejects_duplicate_definition() {
        let result = StepCatalog::build(
            &order(&["move-size"]),
            vec![
                select_step("move-size", FieldPath::MoveSize, &["studio"]),
                select_step("move-size", FieldPath::MoveSize, &["studio"]),
            ],
        );

        assert_eq!(
            result,
            Err(CatalogError::DuplicateDefinition("move-size".to_string()))
        );
    }

    #[test]
    fn build_rejects_challenge_step_without_location() {
        let mut step = select_step("pickup-challenges", FieldPath::PickupAddress, &["stairs"]);
        step.layout = LayoutKind::Challenges;
        step.validation.required = false;

        let result = StepCatalog::build(&order(&["pickup-challenges"]), vec![step.clone()]);
        assert_eq!(
            result,
            Err(CatalogError::MissingChallengeLocation(
                "pickup-challenges".to_string()
            ))
        );

        step.location = Some(Location::Pickup);
        assert!(StepCatalog::build(&order(&["pickup-challenges"]), vec![step]).is_ok());
    }

    #[test]
    fn definition_overrides_custom_handler() {
        let catalog = StepCatalog::build(
            &order(&["time"]),
            vec![select_step("time", FieldPath::TimeWindow, &["morning"])],
        )
        .unwrap();

        assert!(matches!(
            catalog.resolve_step(0),
            Some(StepHandle::Declarative(_))
        ));
    }

    // =========================================================================
    // check_rates tests
    // =========================================================================

    #[test]
    fn check_rates_rejects_unpriced_move_size() {
        let catalog = StepCatalog::build(
            &order(&["move-size"]),
            vec![select_step(
                "move-size",
                FieldPath::MoveSize,
                &["studio", "mansion"],
            )],
        )
        .unwrap();
        let mut rates = RateTables::default();
        rates.move_size.insert(
            "studio".to_string(),
            MoveSizeRate {
                base_price: dec!(250),
                hours: dec!(2),
                description: String::new(),
            },
        );

        assert_eq!(
            catalog.check_rates(&rates),
            Err(CatalogError::UnpricedOption {
                step: "move-size".to_string(),
                field: FieldPath::MoveSize,
                value: "mansion".to_string(),
            })
        );
    }

    #[test]
    fn check_rates_ignores_unpriced_fields() {
        let catalog = StepCatalog::build(
            &order(&["location-type"]),
            vec![select_step(
                "location-type",
                FieldPath::LocationType,
                &["house"],
            )],
        )
        .unwrap();

        assert_eq!(catalog.check_rates(&RateTables::default()), Ok(()));
    }

    #[test]
    fn check_rates_only_warns_for_challenges() {
        let mut step = select_step("pickup-challenges", FieldPath::PickupAddress, &["hot-tub"]);
        step.layout = LayoutKind::Challenges;
        step.location = Some(Location::Pickup);
        step.validation.required = false;
        let catalog = StepCatalog::build(&order(&["pickup-challenges"]), vec![step]).unwrap();

        assert_eq!(catalog.check_rates(&RateTables::default()), Ok(()));
    }
}
