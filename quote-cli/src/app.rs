use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use quote_core::calculations::common::{format_currency, format_hours};
use quote_core::collaborators::{FALLBACK_DURATION_MINUTES, suggestions_or_empty};
use quote_core::{
    AdditionalService, Branding, EstimateWorksheet, FileSessionStore, FormDocument,
    FormattedEstimate, LeadReceipt, MemorySessionStore, NavigationCommand, PriceRange,
    ResumeService, SessionStore, Transition, WizardConfig, WizardController,
};
use quote_data::QuoteConfig;
use tracing::{debug, info};

use crate::collaborators::{
    AddressBook, FixedRouteService, OutboxSubmitter, UnavailableRouteService,
};
use crate::script::{Script, ScriptAction};
use crate::utils::{parse_non_negative, parse_optional_decimal};

pub type SharedStore = Arc<dyn SessionStore>;

/// Everything needed to replay one script.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_dir: PathBuf,
    pub script: PathBuf,
    /// Where the resumable session is kept; in memory when `None`.
    pub session_dir: Option<PathBuf>,
    pub outbox: PathBuf,
    pub today: NaiveDate,
}

/// What happened when one script action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub number: usize,
    pub action: String,
    pub transition: Option<Transition>,
    /// Step id after the action.
    pub step: String,
    pub errors: Vec<(String, String)>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub resume_offered: bool,
    pub outcomes: Vec<ActionOutcome>,
    pub final_position: usize,
    pub final_step: String,
    pub step_count: usize,
    pub progress: u32,
    /// Pre-estimate range once a move size is chosen.
    pub price_range: Option<PriceRange>,
    pub estimate: Option<FormattedEstimate>,
    pub receipts: Vec<LeadReceipt>,
}

/// Replays script actions against a wizard controller.
pub struct ScriptRunner {
    wizard: WizardController<SharedStore>,
    submitter: OutboxSubmitter,
    addresses: AddressBook,
    resume_offered: bool,
    outcomes: Vec<ActionOutcome>,
    receipts: Vec<LeadReceipt>,
}

impl ScriptRunner {
    pub fn new(
        config: Arc<WizardConfig>,
        store: SharedStore,
        outbox: &Path,
        today: NaiveDate,
    ) -> Self {
        let wizard = WizardController::new(config, ResumeService::new(store), today);
        let resume_offered = wizard.resume_offer().is_some();
        Self {
            wizard,
            submitter: OutboxSubmitter::new(outbox),
            addresses: AddressBook::default(),
            resume_offered,
            outcomes: Vec::new(),
            receipts: Vec::new(),
        }
    }

    pub fn wizard(&self) -> &WizardController<SharedStore> {
        &self.wizard
    }

    /// Applies every action in order, stopping at the first one the wizard
    /// rejects.
    pub async fn run(
        &mut self,
        script: &Script,
    ) -> Result<()> {
        if script.display_name.is_some() || script.display_logo.is_some() {
            self.wizard.set_branding(Branding {
                display_name: script.display_name.clone(),
                display_logo: script.display_logo.clone(),
            });
        }
        self.addresses = AddressBook::new(script.addresses.clone());

        for (index, action) in script.actions.iter().enumerate() {
            self.apply(index + 1, action)
                .await
                .with_context(|| format!("action {}: {action}", index + 1))?;
        }
        Ok(())
    }

    async fn apply(
        &mut self,
        number: usize,
        action: &ScriptAction,
    ) -> Result<()> {
        debug!(number, %action, "applying action");
        let mut note = None;

        let transition = match action {
            ScriptAction::Select { value } => Some(self.wizard.select_option(value)?),
            ScriptAction::Set { field, value } => {
                self.wizard.set_field(*field, value.clone())?;
                None
            }
            ScriptAction::Address {
                location,
                query,
                pick,
            } => {
                let suggestions = suggestions_or_empty(&self.addresses, query).await;
                let chosen = suggestions.get(*pick).unwrap_or(query);
                self.wizard
                    .set_field(location.address_field(), chosen.as_str().into())?;
                let located = self.wizard.locate_address(&self.addresses, *location).await;
                note = Some(format!(
                    "{} suggestion(s), using {chosen:?}, {}",
                    suggestions.len(),
                    match located {
                        Some(point) => point.geo_uri(),
                        None => "not located".to_string(),
                    }
                ));
                None
            }
            ScriptAction::Continue => {
                let (transition, footer_note) = self.press(NavigationCommand::Continue);
                note = Some(footer_note);
                Some(transition)
            }
            ScriptAction::Skip => {
                let (transition, footer_note) = self.press(NavigationCommand::Skip);
                note = Some(footer_note);
                Some(transition)
            }
            ScriptAction::Back => Some(self.wizard.prev()),
            ScriptAction::Goto { step } => {
                let index = self
                    .wizard
                    .config()
                    .catalog()
                    .index_of(step)
                    .ok_or_else(|| anyhow!("unknown step '{step}'"))?;
                Some(self.wizard.goto(index))
            }
            ScriptAction::Challenge {
                location,
                id,
                value,
            } => {
                let updated = self
                    .wizard
                    .edit(|form| form.set_challenge_value(*location, id, value.clone()));
                if !updated {
                    bail!("challenge '{id}' is not selected at {}", location.as_str());
                }
                None
            }
            ScriptAction::CustomChallenge { location, label } => {
                if !self.wizard.edit(|form| form.add_custom_challenge(*location, label)) {
                    note = Some(format!("'{label}' already listed"));
                }
                None
            }
            ScriptAction::Service { id, name } => {
                let added = self.wizard.edit(|form| toggle_service(form, id, name.as_deref()));
                note = Some(if added { "added" } else { "removed" }.to_string());
                None
            }
            ScriptAction::Supply { id, quantity } => {
                self.wizard.set_supply_quantity(id, *quantity)?;
                None
            }
            ScriptAction::Route { miles, minutes } => {
                let route = match miles {
                    Some(miles) => {
                        let service = FixedRouteService::new(
                            parse_non_negative(miles)?,
                            minutes
                                .as_deref()
                                .and_then(parse_optional_decimal)
                                .unwrap_or(FALLBACK_DURATION_MINUTES),
                        );
                        self.wizard.update_route(&service).await
                    }
                    None => self.wizard.update_route(&UnavailableRouteService).await,
                };
                note = Some(match route {
                    Some(route) => format!(
                        "{} mi, {} min",
                        route.distance_miles, route.duration_minutes
                    ),
                    None => "skipped, both addresses are needed".to_string(),
                });
                None
            }
            ScriptAction::Resume => Some(self.wizard.resume()?),
            ScriptAction::StartFresh => Some(self.wizard.start_fresh()),
            ScriptAction::Submit => {
                match self.wizard.submit(&self.submitter, Utc::now()).await {
                    Ok(receipt) => {
                        note = Some(format!("lead {}", receipt.id));
                        self.receipts.push(receipt);
                    }
                    Err(err) => note = Some(format!("submission failed: {err}")),
                }
                None
            }
        };

        let state = self.wizard.state();
        let outcome = ActionOutcome {
            number,
            action: action.to_string(),
            transition,
            step: self.step_id(state.position),
            errors: state
                .errors
                .iter()
                .map(|(field, message)| (field.to_string(), message.to_string()))
                .collect(),
            note,
        };
        self.outcomes.push(outcome);
        Ok(())
    }

    /// Presses a footer button on the active step.
    ///
    /// Steps without a footer advance themselves, so `Continue` hands over to
    /// the step's own validation and `Skip` does nothing.
    fn press(
        &mut self,
        command: NavigationCommand,
    ) -> (Transition, String) {
        let at = self.wizard.position();
        let Some((id, navigation)) = self
            .wizard
            .current_step()
            .map(|step| (step.handle.id().to_string(), step.navigation))
        else {
            return (Transition::Stayed { at }, "no active step".to_string());
        };
        let Some(footer) = navigation else {
            return match command {
                NavigationCommand::Continue => (
                    self.wizard.navigate(command),
                    format!("no footer on {id}, the step advances itself"),
                ),
                NavigationCommand::Skip => (
                    Transition::Stayed { at },
                    format!("no footer on {id}, skip ignored"),
                ),
            };
        };

        let note = match command {
            NavigationCommand::Skip if footer.can_skip => "skipped".to_string(),
            NavigationCommand::Skip => format!("cannot skip, pressed {:?}", footer.button_text),
            NavigationCommand::Continue => format!("pressed {:?}", footer.button_text),
        };
        (self.wizard.navigate(command), note)
    }

    fn step_id(
        &self,
        index: usize,
    ) -> String {
        self.wizard
            .config()
            .catalog()
            .step_id(index)
            .unwrap_or_default()
            .to_string()
    }

    /// Finishes the run. Prices the form if anything was entered and the
    /// wizard has not priced it yet.
    pub fn into_report(mut self) -> RunReport {
        if self.wizard.state().formatted.is_none() && self.wizard.form() != &FormDocument::default()
        {
            self.wizard.refresh_estimate();
        }
        let price_range = self.wizard.form().move_size.as_deref().map(|size| {
            EstimateWorksheet::new(self.wizard.config().rates()).price_range(size)
        });
        let state = self.wizard.state();
        RunReport {
            resume_offered: self.resume_offered,
            price_range,
            final_position: state.position,
            final_step: self.step_id(state.position),
            step_count: state.step_count,
            progress: state.progress_percentage(),
            estimate: state.formatted.clone(),
            outcomes: self.outcomes,
            receipts: self.receipts,
        }
    }
}

/// Returns `true` when the service was added.
fn toggle_service(
    form: &mut FormDocument,
    id: &str,
    name: Option<&str>,
) -> bool {
    if form.remove_additional_service(id) {
        return false;
    }
    form.add_additional_service(AdditionalService::new(id, name.unwrap_or(id)))
}

/// Loads the configuration and script, then replays the script.
pub async fn run(options: &RunOptions) -> Result<RunReport> {
    let config = QuoteConfig::load(&options.config_dir).with_context(|| {
        format!(
            "Failed to load configuration from: {}",
            options.config_dir.display()
        )
    })?;
    let script = Script::load(&options.script)?;

    let store: SharedStore = match &options.session_dir {
        Some(dir) => Arc::new(FileSessionStore::new(dir)),
        None => Arc::new(MemorySessionStore::new()),
    };

    info!(
        script = %options.script.display(),
        actions = script.actions.len(),
        "replaying script"
    );
    let mut runner = ScriptRunner::new(config, store, &options.outbox, options.today);
    runner.run(&script).await?;
    Ok(runner.into_report())
}

impl fmt::Display for ActionOutcome {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:>3}. {}", self.number, self.action)?;
        match self.transition {
            Some(Transition::Moved { from, to }) => {
                write!(f, " -> moved {from} to {to} ({})", self.step)?
            }
            Some(Transition::Stayed { at }) => write!(f, " -> stayed at {at} ({})", self.step)?,
            Some(Transition::Blocked { at }) => {
                write!(f, " -> blocked at {at} ({})", self.step)?
            }
            None => {}
        }
        if let Some(note) = &self.note {
            write!(f, " [{note}]")?;
        }
        for (field, message) in &self.errors {
            write!(f, "\n       {field}: {message}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RunReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Resumable session offered: {}",
            if self.resume_offered { "yes" } else { "no" }
        )?;
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        writeln!(
            f,
            "Final step: {} ({} of {}, {}%)",
            self.final_step,
            self.final_position + 1,
            self.step_count,
            self.progress
        )?;
        if let Some(range) = &self.price_range {
            writeln!(
                f,
                "Price range: {} to {} ({})",
                format_currency(range.min),
                format_currency(range.max),
                format_hours(range.hours)
            )?;
        }
        if let Some(estimate) = &self.estimate {
            writeln!(f, "Estimate:")?;
            writeln!(f, "  Base price:     {}", estimate.base_price)?;
            writeln!(f, "  Distance:       {}", estimate.distance_cost)?;
            writeln!(f, "  Subtotal:       {}", estimate.subtotal)?;
            writeln!(f, "  Tax:            {}", estimate.tax)?;
            writeln!(f, "  Total:          {}", estimate.total)?;
            writeln!(f, "  Estimated time: {}", estimate.estimated_hours)?;
        }
        for receipt in &self.receipts {
            writeln!(f, "Lead submitted: {}", receipt.id)?;
        }
        Ok(())
    }
}
