//! The wizard state machine.
//!
//! The controller owns the form document and the current position. Every
//! transition clears the error map. Conditionally hidden steps are skipped in
//! both directions; the supply gate skip applies only when moving forward.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::{EstimateWorksheet, format_estimate};
use crate::collaborators::{
    AddressLookup, CollaboratorError, Coordinates, Lead, LeadReceipt, LeadSubmitter,
    RouteEstimate, RouteService, geocode_or_none, route_or_default,
};
use crate::models::{
    AdditionalService, Challenge, ChallengeValue, Estimate, FieldError, FieldPath, FieldValue,
    FormDocument, Location,
};
use crate::session::{PersistedSession, ResumeService, ReviewDetails, SessionStore};
use crate::steps::{
    DispatchedStep, NavigationCommand, SUBMIT_ERROR_KEY, SelectionTarget, StepDispatcher,
    StepHandle,
};
use crate::wizard::config::WizardConfig;
use crate::wizard::state::{Branding, WizardState};

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: usize, to: usize },
    Stayed { at: usize },
    /// Validation failed; the error map explains why.
    Blocked { at: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("step '{0}' has no selectable options")]
    NotSelectable(String),

    #[error("step '{step}' has no option '{value}'")]
    UnknownOption { step: String, value: String },

    #[error("unknown supply item '{0}'")]
    UnknownSupply(String),

    #[error("there is no saved session to resume")]
    NothingToResume,

    #[error(transparent)]
    Field(#[from] FieldError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("a submission is already in progress")]
    InProgress,

    #[error("{0}")]
    Failed(String),
}

pub struct WizardController<S> {
    config: Arc<WizardConfig>,
    sessions: ResumeService<S>,
    state: WizardState,
    resume_offer: Option<PersistedSession>,
}

impl<S: SessionStore> WizardController<S> {
    /// Creates a controller at step 0.
    ///
    /// The session store is read once, here. A saved session that can still
    /// be resumed on `today` is offered through [`Self::resume_offer`].
    pub fn new(
        config: Arc<WizardConfig>,
        sessions: ResumeService<S>,
        today: NaiveDate,
    ) -> Self {
        let resume_offer = sessions.load_resumable(today);
        if resume_offer.is_some() {
            info!("found a resumable session");
        }
        let state = WizardState::new(config.catalog().step_count());
        Self {
            config,
            sessions,
            state,
            resume_offer,
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn form(&self) -> &FormDocument {
        &self.state.form
    }

    pub fn position(&self) -> usize {
        self.state.position
    }

    pub fn resume_offer(&self) -> Option<&PersistedSession> {
        self.resume_offer.as_ref()
    }

    pub fn sessions(&self) -> &ResumeService<S> {
        &self.sessions
    }

    pub fn current_step(&self) -> Option<DispatchedStep<'_>> {
        StepDispatcher::new(self.config.catalog()).dispatch(self.state.position)
    }

    pub fn set_branding(
        &mut self,
        branding: Branding,
    ) {
        self.state.branding = branding;
    }

    pub fn set_review_details(
        &mut self,
        details: ReviewDetails,
    ) {
        self.state.review_details = details;
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Advances one step, skipping the supply selection when the customer
    /// declined supplies and any conditionally hidden steps.
    pub fn next(&mut self) -> Transition {
        let from = self.state.position;
        let last = self.last_index();
        let mut target = (from + 1).min(last);
        if self.leaving_declined_gate(from) {
            target = (target + 1).min(last);
        }
        let to = self.first_visible_from(target).unwrap_or(from);
        self.move_to(from, to)
    }

    /// Goes back one step, skipping conditionally hidden steps.
    pub fn prev(&mut self) -> Transition {
        let from = self.state.position;
        let to = self.last_visible_before(from).unwrap_or(from);
        self.move_to(from, to)
    }

    /// Jumps to `index`, clamped into range. Lands on the nearest visible
    /// step, looking forward first.
    pub fn goto(
        &mut self,
        index: usize,
    ) -> Transition {
        let from = self.state.position;
        let index = index.min(self.last_index());
        let to = self
            .first_visible_from(index)
            .or_else(|| self.last_visible_before(index))
            .unwrap_or(from);
        self.move_to(from, to)
    }

    /// Handles a footer button press.
    ///
    /// Skipping a step that cannot be skipped is treated as continuing.
    pub fn navigate(
        &mut self,
        command: NavigationCommand,
    ) -> Transition {
        match command {
            NavigationCommand::Skip if self.current_step_can_skip() => self.next(),
            NavigationCommand::Skip | NavigationCommand::Continue => {
                if self.validate_current_step() {
                    self.next()
                } else {
                    debug!(
                        position = self.state.position,
                        errors = self.state.errors.len(),
                        "step validation failed"
                    );
                    Transition::Blocked {
                        at: self.state.position,
                    }
                }
            }
        }
    }

    /// Validates the current step, replacing the error map.
    pub fn validate_current_step(&mut self) -> bool {
        let errors = match self.config.catalog().resolve_step(self.state.position) {
            Some(handle) => handle.validate(&self.state.form),
            None => Default::default(),
        };
        self.state.errors = errors;
        self.state.errors.is_empty()
    }

    fn current_step_can_skip(&self) -> bool {
        match self.config.catalog().resolve_step(self.state.position) {
            Some(StepHandle::Declarative(definition)) => definition.can_skip(),
            Some(StepHandle::Custom(step)) => step.can_skip(),
            None => false,
        }
    }

    fn last_index(&self) -> usize {
        self.state.step_count.saturating_sub(1)
    }

    fn is_hidden(
        &self,
        index: usize,
    ) -> bool {
        self.config
            .catalog()
            .resolve_step(index)
            .is_some_and(|handle| handle.is_hidden(&self.state.form))
    }

    fn first_visible_from(
        &self,
        index: usize,
    ) -> Option<usize> {
        (index..self.state.step_count).find(|&i| !self.is_hidden(i))
    }

    fn last_visible_before(
        &self,
        index: usize,
    ) -> Option<usize> {
        (0..index).rev().find(|&i| !self.is_hidden(i))
    }

    fn leaving_declined_gate(
        &self,
        from: usize,
    ) -> bool {
        self.config.supply_gate_index() == Some(from) && self.state.form.declined_supplies()
    }

    fn move_to(
        &mut self,
        from: usize,
        to: usize,
    ) -> Transition {
        self.state.errors.clear();
        if from == to {
            return Transition::Stayed { at: from };
        }
        self.state.position = to;
        debug!(
            from,
            to,
            step = self.config.catalog().step_id(to).unwrap_or_default(),
            "moved"
        );
        if self.config.review_index() == Some(to) {
            self.enter_review();
        }
        Transition::Moved { from, to }
    }

    fn enter_review(&mut self) {
        self.refresh_estimate();
        self.persist_session();
    }

    // ---------------------------------------------------------------------
    // Form edits
    // ---------------------------------------------------------------------

    /// Applies an option of the current declarative step.
    ///
    /// Auto-advance steps move on immediately.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError`] if the current step has no options, the value
    /// is not one of them, or the field rejects it.
    pub fn select_option(
        &mut self,
        value: &str,
    ) -> Result<Transition, WizardError> {
        let config = Arc::clone(&self.config);
        let at = self.state.position;
        let definition = match config.catalog().resolve_step(at) {
            Some(StepHandle::Declarative(definition)) => definition,
            Some(handle) => return Err(WizardError::NotSelectable(handle.id().to_string())),
            None => return Err(WizardError::NotSelectable(at.to_string())),
        };
        let option = definition
            .option(value)
            .ok_or_else(|| WizardError::UnknownOption {
                step: definition.id.clone(),
                value: value.to_string(),
            })?;

        match definition.selection_target() {
            Some(SelectionTarget::Field(path)) => {
                self.state
                    .form
                    .set_field(path, FieldValue::Text(option.value.clone()))?;
            }
            Some(SelectionTarget::Challenges(location)) => {
                let initial = if option.has_input {
                    ChallengeValue::Text(String::new())
                } else {
                    ChallengeValue::Flag(true)
                };
                self.state.form.toggle_challenge(
                    location,
                    Challenge::known(option.value.clone(), option.label.clone(), initial),
                );
            }
            Some(SelectionTarget::AdditionalServices) => {
                if !self.state.form.remove_additional_service(&option.value) {
                    self.state.form.add_additional_service(AdditionalService::new(
                        option.value.clone(),
                        option.label.clone(),
                    ));
                }
            }
            None => return Err(WizardError::NotSelectable(definition.id.clone())),
        }
        self.invalidate_estimate();

        if definition.is_auto() {
            Ok(self.next())
        } else {
            Ok(Transition::Stayed { at })
        }
    }

    /// # Errors
    ///
    /// Returns [`WizardError::Field`] if the value does not fit the field.
    pub fn set_field(
        &mut self,
        path: FieldPath,
        value: FieldValue,
    ) -> Result<(), WizardError> {
        self.state.form.set_field(path, value)?;
        self.invalidate_estimate();
        Ok(())
    }

    /// Runs an arbitrary edit against the form document.
    pub fn edit<R>(
        &mut self,
        f: impl FnOnce(&mut FormDocument) -> R,
    ) -> R {
        let result = f(&mut self.state.form);
        self.invalidate_estimate();
        result
    }

    /// Sets the quantity of a catalog supply item; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownSupply`] for ids not in the catalog.
    pub fn set_supply_quantity(
        &mut self,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), WizardError> {
        let config = Arc::clone(&self.config);
        let item = config
            .supplies()
            .get(item_id)
            .ok_or_else(|| WizardError::UnknownSupply(item_id.to_string()))?;
        self.edit(|form| form.set_supply_quantity(item, quantity));
        Ok(())
    }

    /// Looks up the route between the two addresses and stores it on the
    /// form. Lookup failures store the default distance instead.
    ///
    /// Returns `None` without calling the service while either address is
    /// blank.
    pub async fn update_route(
        &mut self,
        service: &dyn RouteService,
    ) -> Option<RouteEstimate> {
        let from = self.state.form.addresses.pickup.address.trim().to_string();
        let to = self.state.form.addresses.destination.address.trim().to_string();
        if from.is_empty() || to.is_empty() {
            return None;
        }
        let route = route_or_default(service, &from, &to).await;
        self.edit(|form| form.apply_route(route.distance_miles, route.duration_minutes));
        Some(route)
    }

    /// Geocodes the address at `location` and stores its map link. A failed
    /// lookup clears the link.
    ///
    /// Returns `None` without calling the service while the address is blank.
    pub async fn locate_address(
        &mut self,
        lookup: &dyn AddressLookup,
        location: Location,
    ) -> Option<Coordinates> {
        let address = self.state.form.addresses.at(location).address.trim().to_string();
        if address.is_empty() {
            return None;
        }
        let coordinates = geocode_or_none(lookup, &address).await;
        self.state.form.addresses.at_mut(location).map_url = coordinates
            .map(|point| point.geo_uri())
            .unwrap_or_default();
        coordinates
    }

    // ---------------------------------------------------------------------
    // Pricing
    // ---------------------------------------------------------------------

    /// Recomputes the estimate from the current form.
    pub fn refresh_estimate(&mut self) -> &Estimate {
        let estimate = EstimateWorksheet::new(self.config.rates()).calculate(&self.state.form);
        self.state.formatted = Some(format_estimate(&estimate));
        self.state.estimate.insert(estimate)
    }

    fn invalidate_estimate(&mut self) {
        self.state.estimate = None;
        self.state.formatted = None;
    }

    // ---------------------------------------------------------------------
    // Resume
    // ---------------------------------------------------------------------

    /// Reinstates the offered session and jumps to the review step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::NothingToResume`] when no session was offered.
    pub fn resume(&mut self) -> Result<Transition, WizardError> {
        let session = self
            .resume_offer
            .take()
            .ok_or(WizardError::NothingToResume)?;
        self.state.form = session.form_data;
        self.state.branding = Branding {
            display_name: session.display_name,
            display_logo: session.display_logo,
        };
        self.state.review_details = session.review_details;
        self.invalidate_estimate();

        let target = self.config.review_index().unwrap_or(session.position);
        info!(target, "resuming saved session");
        Ok(self.goto(target))
    }

    /// Declines the offered session, discards it, and restarts at step 0.
    pub fn start_fresh(&mut self) -> Transition {
        self.resume_offer = None;
        if let Err(err) = self.sessions.discard() {
            warn!(error = %err, "could not discard saved session");
        }
        self.reset()
    }

    /// Clears the form and returns to step 0, keeping branding.
    pub fn reset(&mut self) -> Transition {
        let from = self.state.position;
        let branding = std::mem::take(&mut self.state.branding);
        let review_details = std::mem::take(&mut self.state.review_details);
        self.state = WizardState {
            branding,
            review_details,
            ..WizardState::new(self.state.step_count)
        };
        if from == 0 {
            Transition::Stayed { at: 0 }
        } else {
            Transition::Moved { from, to: 0 }
        }
    }

    fn persist_session(&self) {
        let session = PersistedSession {
            timestamp: Utc::now(),
            form_data: self.state.form.clone(),
            position: self.state.position,
            display_name: self.state.branding.display_name.clone(),
            display_logo: self.state.branding.display_logo.clone(),
            estimate: self.state.estimate.clone(),
            formatted_pricing: self.state.formatted.clone(),
            review_details: self.state.review_details.clone(),
        };
        match self.sessions.save(&session) {
            Ok(()) => debug!(key = self.sessions.key(), "session saved"),
            Err(err) => warn!(error = %err, "could not save session"),
        }
    }

    // ---------------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------------

    /// Marks a submission as pending and builds the lead payload.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InProgress`] while a submission is pending.
    pub fn begin_submission(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Lead, SubmissionError> {
        if self.state.submitting {
            return Err(SubmissionError::InProgress);
        }
        self.state.submitting = true;
        self.state.errors.clear();
        let estimate = self.refresh_estimate().clone();
        Ok(Lead::new(self.state.form.clone(), Some(estimate), now))
    }

    /// Records the submitter's answer.
    ///
    /// Success resets the wizard and discards the saved session. A failure
    /// keeps the form and stores the message under the `submit` error key.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Failed`] carrying the collaborator message.
    pub fn finish_submission(
        &mut self,
        result: Result<LeadReceipt, CollaboratorError>,
    ) -> Result<LeadReceipt, SubmissionError> {
        self.state.submitting = false;
        match result {
            Ok(receipt) => {
                info!(lead = %receipt.id, "lead submitted");
                if let Err(err) = self.sessions.discard() {
                    warn!(error = %err, "could not discard saved session");
                }
                self.reset();
                Ok(receipt)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "lead submission failed");
                self.state.errors.insert(SUBMIT_ERROR_KEY, message.clone());
                Err(SubmissionError::Failed(message))
            }
        }
    }

    /// Submits the current form.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_submission`] and [`Self::finish_submission`].
    pub async fn submit(
        &mut self,
        submitter: &dyn LeadSubmitter,
        now: DateTime<Utc>,
    ) -> Result<LeadReceipt, SubmissionError> {
        let lead = self.begin_submission(now)?;
        let result = submitter.submit(&lead).await;
        self.finish_submission(result)
    }
}
