//! The wizard controller and the state it drives.

pub mod config;
pub mod controller;
pub mod state;

pub use config::{WizardConfig, WizardConfigError};
pub use controller::{SubmissionError, Transition, WizardController, WizardError};
pub use state::{Branding, WizardState};
