//! Resolves the active step to something renderable and decides whether the
//! shared footer drives it.

use serde::Serialize;

use crate::steps::catalog::{StepCatalog, StepHandle};

/// What the shared footer shows for the active step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepNavigation {
    pub can_skip: bool,
    pub button_text: String,
}

/// A footer button press, delivered to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCommand {
    Continue,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedStep<'a> {
    pub index: usize,
    pub handle: StepHandle<'a>,
    /// `None` when the step navigates on its own: auto-advance steps and
    /// self-navigating custom steps.
    pub navigation: Option<StepNavigation>,
}

#[derive(Debug, Clone, Copy)]
pub struct StepDispatcher<'a> {
    catalog: &'a StepCatalog,
}

impl<'a> StepDispatcher<'a> {
    pub fn new(catalog: &'a StepCatalog) -> Self {
        Self { catalog }
    }

    pub fn dispatch(
        &self,
        index: usize,
    ) -> Option<DispatchedStep<'a>> {
        let handle = self.catalog.resolve_step(index)?;
        let navigation = match handle {
            StepHandle::Declarative(definition) if definition.is_auto() => None,
            StepHandle::Declarative(definition) => Some(StepNavigation {
                can_skip: definition.can_skip(),
                button_text: definition.button_text().to_string(),
            }),
            StepHandle::Custom(step) if step.uses_shared_footer() => Some(StepNavigation {
                can_skip: step.can_skip(),
                button_text: step.button_text().to_string(),
            }),
            StepHandle::Custom(_) => None,
        };
        Some(DispatchedStep {
            index,
            handle,
            navigation,
        })
    }
}
