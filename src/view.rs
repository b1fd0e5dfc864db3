// Rendering boundary between the booking flow and whatever draws it.

use crate::models::{ConfirmationDetails, Service, TimeSlot};

pub const SUBMIT_LABEL: &str = "Confirm booking";
pub const SUBMIT_PENDING_LABEL: &str = "Booking...";
pub const NO_AVAILABILITY_MESSAGE: &str =
    "No time slots available for this date. Please choose another one.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ChoosingService,
    ChoosingDateTime,
    EnteringContactInfo,
    Confirmed,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::ChoosingService => 1,
            Step::ChoosingDateTime => 2,
            Step::EnteringContactInfo => 3,
            Step::Confirmed => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl SubmitControl {
    pub fn idle() -> Self {
        Self {
            enabled: true,
            label: SUBMIT_LABEL,
        }
    }

    pub fn pending() -> Self {
        Self {
            enabled: false,
            label: SUBMIT_PENDING_LABEL,
        }
    }
}

// Each call replaces whatever the view showed before for that region.
pub trait BookingView {
    fn render_services(&mut self, services: &[Service]);

    fn highlight_service(&mut self, service_id: Option<u32>);

    fn show_step(&mut self, step: Step);

    fn show_slots_loading(&mut self);

    fn render_time_slots(&mut self, slots: &[TimeSlot]);

    fn show_no_availability(&mut self, message: &str);

    fn highlight_time(&mut self, slot: Option<TimeSlot>);

    fn set_submit_control(&mut self, control: SubmitControl);

    fn show_error(&mut self, message: &str);

    fn show_confirmation(&mut self, details: &ConfirmationDetails);

    // Clears form inputs, slot list, highlights and hides the confirmation.
    fn reset(&mut self);
}
