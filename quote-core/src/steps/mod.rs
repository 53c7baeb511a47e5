//! Step catalog, declarative and custom step handling, and per-step
//! validation.

pub mod catalog;
pub mod custom;
pub mod definition;
pub mod dispatcher;
pub mod validation;

pub use catalog::{CatalogError, SUPPLY_GATE_STEP, StepCatalog, StepHandle};
pub use custom::CustomStep;
pub use definition::{
    Buttons, Conditional, LayoutKind, PrimaryAction, PrimaryButton, SelectionTarget, Selects,
    StepDefinition, StepOption, ValidationRule,
};
pub use dispatcher::{DispatchedStep, NavigationCommand, StepDispatcher, StepNavigation};
pub use validation::{SUBMIT_ERROR_KEY, ValidationErrors, validate_contact};
