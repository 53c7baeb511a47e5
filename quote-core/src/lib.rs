//! Core types and logic for the moving quote wizard.
//!
//! - [`models`]: the form document, rate tables and estimate records
//! - [`calculations`]: the pricing worksheet and display formatting
//! - [`steps`]: the step catalog and per-step validation
//! - [`wizard`]: the controller that walks a customer through the steps
//! - [`session`]: resumable session persistence
//! - [`collaborators`]: boundaries to lead submission, routing and geocoding

pub mod calculations;
pub mod collaborators;
pub mod models;
pub mod session;
pub mod steps;
pub mod wizard;

pub use calculations::{EstimateWorksheet, FormattedEstimate, PriceRange, format_estimate};
pub use collaborators::{
    AddressLookup, CollaboratorError, Coordinates, Lead, LeadReceipt, LeadSubmitter,
    RouteEstimate, RouteService,
};
pub use models::*;
pub use session::{
    FileSessionStore, MemorySessionStore, PersistedSession, ResumeService, ReviewDetails,
    SessionStore, SessionStoreError,
};
pub use steps::{
    CatalogError, CustomStep, DispatchedStep, NavigationCommand, StepCatalog, StepDefinition,
    StepDispatcher, StepHandle, ValidationErrors,
};
pub use wizard::{
    Branding, SubmissionError, Transition, WizardConfig, WizardConfigError, WizardController,
    WizardError, WizardState,
};
