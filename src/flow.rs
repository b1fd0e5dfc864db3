// Booking flow controller: the four-step state machine
// (service -> date/time -> contact form -> confirmation) over a backend and a view.

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    backend::{BackendError, BookingBackend},
    models::{BookingDraft, ConfirmationDetails, DateLocale, DraftField, Service, TimeSlot},
    view::{BookingView, Step, SubmitControl, NO_AVAILABILITY_MESSAGE},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Please fill in all fields (missing: {})", join_fields(.missing))]
    ValidationFailed { missing: Vec<DraftField> },

    #[error("Could not load data: {0}")]
    FetchFailed(BackendError),

    #[error("Booking failed: {0}. Please try again.")]
    SubmissionFailed(BackendError),

    #[error("Cannot {action} during step {step:?}")]
    InvalidStep { action: &'static str, step: Step },

    #[error("Unknown service id {0}")]
    UnknownService(u32),

    #[error("Available times for the selected date have not been loaded")]
    AvailabilityNotLoaded,

    #[error("Time slot {0} is not offered for the selected date")]
    SlotNotOffered(TimeSlot),

    #[error("Date {date} is before the first selectable date {min}")]
    DateBeforeMinimum { date: NaiveDate, min: NaiveDate },

    #[error("A booking submission is already in progress")]
    SubmissionInProgress,
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default)]
pub struct FlowConfig {
    // Earliest date the user may pick. None means today's local date.
    pub min_date: Option<NaiveDate>,
    pub date_locale: DateLocale,
}

pub struct BookingFlow<B, V> {
    backend: B,
    view: V,
    config: FlowConfig,
    step: Step,
    services: Vec<Service>,
    draft: BookingDraft,
    // None until the availability fetch for the chosen date resolves.
    offered_slots: Option<Vec<TimeSlot>>,
    submit_pending: bool,
    confirmation: Option<ConfirmationDetails>,
}

impl<B: BookingBackend, V: BookingView> BookingFlow<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self::with_config(backend, view, FlowConfig::default())
    }

    pub fn with_config(backend: B, view: V, config: FlowConfig) -> Self {
        Self {
            backend,
            view,
            config,
            step: Step::ChoosingService,
            services: Vec::new(),
            draft: BookingDraft::default(),
            offered_slots: None,
            submit_pending: false,
            confirmation: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn offered_slots(&self) -> Option<&[TimeSlot]> {
        self.offered_slots.as_deref()
    }

    pub fn confirmation(&self) -> Option<&ConfirmationDetails> {
        self.confirmation.as_ref()
    }

    pub fn is_submit_pending(&self) -> bool {
        self.submit_pending
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn min_selectable_date(&self) -> NaiveDate {
        self.config
            .min_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    // Loads the catalog and shows step 1. Callable again after a failure.
    pub async fn start(&mut self) -> Result<(), FlowError> {
        info!("loading services");
        self.show_step(self.step);

        match self.backend.list_services().await {
            Ok(services) => {
                info!(count = services.len(), "services loaded");
                self.view.render_services(&services);
                self.services = services;
                Ok(())
            }
            Err(err) => {
                self.services.clear();
                self.view.render_services(&[]);
                Err(self.surface(FlowError::FetchFailed(err)))
            }
        }
    }

    // Replaces any earlier service and drops the chosen time. Clicking the
    // service that is already selected changes nothing.
    pub fn choose_service(&mut self, service_id: u32) -> Result<&Service, FlowError> {
        if self.step == Step::Confirmed {
            return Err(self.invalid_step("choose a service"));
        }

        let already_selected = self
            .draft
            .service
            .as_ref()
            .is_some_and(|s| s.id == service_id);

        if already_selected {
            debug!(service_id, "service already selected");
        } else {
            let found = self.services.iter().find(|s| s.id == service_id).cloned();
            let service = match found {
                Some(service) => service,
                None => return Err(self.surface(FlowError::UnknownService(service_id))),
            };

            info!(service_id, service = %service.name, "service selected");
            self.draft.service = Some(service);
            self.draft.time = None;
            self.view.highlight_service(Some(service_id));
            self.view.highlight_time(None);
            self.show_step(Step::ChoosingDateTime);
        }

        self.draft
            .service
            .as_ref()
            .ok_or(FlowError::UnknownService(service_id))
    }

    // Returns how many slots are offered; zero is not an error.
    pub async fn choose_date(&mut self, date: NaiveDate) -> Result<usize, FlowError> {
        if !matches!(
            self.step,
            Step::ChoosingDateTime | Step::EnteringContactInfo
        ) {
            return Err(self.invalid_step("choose a date"));
        }

        let min = self.min_selectable_date();
        if date < min {
            return Err(self.surface(FlowError::DateBeforeMinimum { date, min }));
        }

        info!(%date, "date selected");
        self.draft.date = Some(date);
        self.draft.time = None;
        self.offered_slots = None;
        self.view.highlight_time(None);
        self.show_step(Step::ChoosingDateTime);
        self.view.show_slots_loading();

        match self.backend.list_available_times(date).await {
            Ok(slots) => {
                debug!(%date, count = slots.len(), "availability loaded");
                if slots.is_empty() {
                    self.view.show_no_availability(NO_AVAILABILITY_MESSAGE);
                } else {
                    self.view.render_time_slots(&slots);
                }
                let count = slots.len();
                self.offered_slots = Some(slots);
                Ok(count)
            }
            Err(err) => {
                self.view.render_time_slots(&[]);
                Err(self.surface(FlowError::FetchFailed(err)))
            }
        }
    }

    pub fn choose_time(&mut self, slot: TimeSlot) -> Result<(), FlowError> {
        if !matches!(
            self.step,
            Step::ChoosingDateTime | Step::EnteringContactInfo
        ) {
            return Err(self.invalid_step("choose a time"));
        }

        match self.offered_slots.as_ref().map(|slots| slots.contains(&slot)) {
            Some(true) => {}
            Some(false) => return Err(self.surface(FlowError::SlotNotOffered(slot))),
            None => return Err(self.surface(FlowError::AvailabilityNotLoaded)),
        }

        info!(time = %slot, "time selected");
        self.draft.time = Some(slot);
        self.view.highlight_time(Some(slot));
        self.show_step(Step::EnteringContactInfo);
        Ok(())
    }

    // Missing fields never reach the backend. The draft survives a failed submit.
    pub async fn submit(
        &mut self,
        client_name: &str,
        client_phone: &str,
    ) -> Result<ConfirmationDetails, FlowError> {
        if self.step != Step::EnteringContactInfo {
            return Err(self.invalid_step("submit a booking"));
        }
        if self.submit_pending {
            return Err(self.surface(FlowError::SubmissionInProgress));
        }

        let (request, service) = match (
            self.draft.to_request(client_name, client_phone),
            self.draft.service.clone(),
        ) {
            (Ok(request), Some(service)) => (request, service),
            (Err(missing), _) => {
                return Err(self.surface(FlowError::ValidationFailed { missing }))
            }
            (Ok(_), None) => {
                return Err(self.surface(FlowError::ValidationFailed {
                    missing: vec![DraftField::Service],
                }))
            }
        };

        info!(
            service_id = request.service_id,
            date = %request.date,
            time = %request.time,
            "submitting booking"
        );
        self.submit_pending = true;
        self.view.set_submit_control(SubmitControl::pending());

        let result = self.backend.submit_booking(request.clone()).await;

        self.submit_pending = false;
        self.view.set_submit_control(SubmitControl::idle());

        let confirmation = result.map_err(|err| self.surface(FlowError::SubmissionFailed(err)))?;

        // Details echo the draft as submitted; the backend only contributes the id.
        let details = ConfirmationDetails::new(
            confirmation.id,
            &service,
            request.date,
            request.time,
            self.config.date_locale,
        );
        info!(booking_id = %details.booking_id, "booking confirmed");

        self.show_step(Step::Confirmed);
        self.view.show_confirmation(&details);
        self.confirmation = Some(details.clone());
        Ok(details)
    }

    pub fn dismiss_confirmation(&mut self) -> Result<(), FlowError> {
        if self.step != Step::Confirmed {
            return Err(self.invalid_step("dismiss the confirmation"));
        }
        self.reset();
        Ok(())
    }

    // Works from any step; the catalog stays loaded.
    pub fn reset(&mut self) {
        debug!(step = ?self.step, "resetting booking flow");
        self.draft.clear();
        self.offered_slots = None;
        self.confirmation = None;
        self.submit_pending = false;
        self.view.reset();
        self.view.set_submit_control(SubmitControl::idle());
        self.show_step(Step::ChoosingService);
    }

    fn show_step(&mut self, step: Step) {
        self.step = step;
        self.view.show_step(step);
    }

    fn surface(&mut self, err: FlowError) -> FlowError {
        warn!(step = ?self.step, error = %err, "booking flow error");
        self.view.show_error(&err.to_string());
        err
    }

    fn invalid_step(&self, action: &'static str) -> FlowError {
        debug!(step = ?self.step, action, "action not allowed in current step");
        FlowError::InvalidStep {
            action,
            step: self.step,
        }
    }
}
