use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::{
    backend::{BackendError, BookingBackend},
    models::{BookingConfirmation, BookingRequest, ConfirmationDetails, Price, Service, TimeSlot},
    view::{BookingView, Step, SubmitControl},
};

pub fn sample_services() -> Vec<Service> {
    vec![
        Service::new(1, "Corte Social", 30, Price::from_minor_units(4000)),
        Service::new(2, "Barba Terapia", 45, Price::from_minor_units(5000)),
        Service::new(3, "Corte + Barba", 75, Price::from_minor_units(8500)),
    ]
}

pub fn sample_slots() -> Vec<TimeSlot> {
    ["09:00", "09:30", "14:00", "16:00"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect()
}

pub struct RecordingBackendInner {
    pub services: Mutex<Result<Vec<Service>, BackendError>>,
    pub slots: Mutex<Result<Vec<TimeSlot>, BackendError>>,
    pub submit_error: Mutex<Option<BackendError>>,
    pub hang_submissions: AtomicBool,
    pub calls_to_list_services: AtomicU64,
    pub calls_to_list_available_times: AtomicU64,
    pub calls_to_submit_booking: AtomicU64,
    pub submitted: Mutex<Vec<BookingRequest>>,
    next_id: AtomicU64,
}

// Canned, immediately resolving backend that records every call.
#[derive(Clone)]
pub struct RecordingBackend(pub Arc<RecordingBackendInner>);

impl RecordingBackend {
    pub fn new() -> Self {
        Self(Arc::new(RecordingBackendInner {
            services: Mutex::new(Ok(sample_services())),
            slots: Mutex::new(Ok(sample_slots())),
            submit_error: Mutex::new(None),
            hang_submissions: AtomicBool::new(false),
            calls_to_list_services: AtomicU64::default(),
            calls_to_list_available_times: AtomicU64::default(),
            calls_to_submit_booking: AtomicU64::default(),
            submitted: Mutex::default(),
            next_id: AtomicU64::new(1),
        }))
    }

    pub fn fail_services(&self, err: BackendError) {
        *self.0.services.lock() = Err(err);
    }

    pub fn restore_services(&self) {
        *self.0.services.lock() = Ok(sample_services());
    }

    pub fn set_slots(&self, slots: Vec<TimeSlot>) {
        *self.0.slots.lock() = Ok(slots);
    }

    pub fn fail_slots(&self, err: BackendError) {
        *self.0.slots.lock() = Err(err);
    }

    pub fn fail_submission(&self, err: BackendError) {
        *self.0.submit_error.lock() = Some(err);
    }

    pub fn restore_submission(&self) {
        *self.0.submit_error.lock() = None;
    }

    pub fn submitted(&self) -> Vec<BookingRequest> {
        self.0.submitted.lock().clone()
    }
}

#[async_trait]
impl BookingBackend for RecordingBackend {
    async fn list_services(&self) -> Result<Vec<Service>, BackendError> {
        self.0.calls_to_list_services.fetch_add(1, Ordering::SeqCst);
        self.0.services.lock().clone()
    }

    async fn list_available_times(&self, _date: NaiveDate) -> Result<Vec<TimeSlot>, BackendError> {
        self.0
            .calls_to_list_available_times
            .fetch_add(1, Ordering::SeqCst);
        self.0.slots.lock().clone()
    }

    async fn submit_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, BackendError> {
        self.0.calls_to_submit_booking.fetch_add(1, Ordering::SeqCst);
        if self.0.hang_submissions.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.0.submit_error.lock().clone() {
            return Err(err);
        }
        self.0.submitted.lock().push(request.clone());
        let id = self.0.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(BookingConfirmation::from_request(request, format!("booking-{id}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Services(Vec<u32>),
    HighlightService(Option<u32>),
    Step(Step),
    SlotsLoading,
    TimeSlots(Vec<TimeSlot>),
    NoAvailability(String),
    HighlightTime(Option<TimeSlot>),
    SubmitControl(SubmitControl),
    Error(String),
    Confirmation(ConfirmationDetails),
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotsState {
    #[default]
    Hidden,
    Loading,
    Slots(Vec<TimeSlot>),
    NoAvailability(String),
}

// Keeps the event log plus what a screen would currently show.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub services: Vec<Service>,
    pub step: Option<Step>,
    pub selected_service: Option<u32>,
    pub selected_time: Option<TimeSlot>,
    pub slots: SlotsState,
    pub submit_control: Option<SubmitControl>,
    pub errors: Vec<String>,
    pub confirmation: Option<ConfirmationDetails>,
}

impl BookingView for RecordingView {
    fn render_services(&mut self, services: &[Service]) {
        self.events
            .push(ViewEvent::Services(services.iter().map(|s| s.id).collect()));
        self.services = services.to_vec();
    }

    fn highlight_service(&mut self, service_id: Option<u32>) {
        self.events.push(ViewEvent::HighlightService(service_id));
        self.selected_service = service_id;
    }

    fn show_step(&mut self, step: Step) {
        self.events.push(ViewEvent::Step(step));
        self.step = Some(step);
    }

    fn show_slots_loading(&mut self) {
        self.events.push(ViewEvent::SlotsLoading);
        self.slots = SlotsState::Loading;
    }

    fn render_time_slots(&mut self, slots: &[TimeSlot]) {
        self.events.push(ViewEvent::TimeSlots(slots.to_vec()));
        self.slots = SlotsState::Slots(slots.to_vec());
    }

    fn show_no_availability(&mut self, message: &str) {
        self.events
            .push(ViewEvent::NoAvailability(message.to_string()));
        self.slots = SlotsState::NoAvailability(message.to_string());
    }

    fn highlight_time(&mut self, slot: Option<TimeSlot>) {
        self.events.push(ViewEvent::HighlightTime(slot));
        self.selected_time = slot;
    }

    fn set_submit_control(&mut self, control: SubmitControl) {
        self.events.push(ViewEvent::SubmitControl(control.clone()));
        self.submit_control = Some(control);
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(ViewEvent::Error(message.to_string()));
        self.errors.push(message.to_string());
    }

    fn show_confirmation(&mut self, details: &ConfirmationDetails) {
        self.events.push(ViewEvent::Confirmation(details.clone()));
        self.confirmation = Some(details.clone());
    }

    fn reset(&mut self) {
        self.events.push(ViewEvent::Reset);
        self.selected_service = None;
        self.selected_time = None;
        self.slots = SlotsState::Hidden;
        self.confirmation = None;
    }
}
