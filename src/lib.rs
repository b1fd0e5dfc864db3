// Booking flow library: a four-step booking state machine over a swappable backend

pub mod backend;
pub mod flow;
pub mod http_backend;
pub mod mock_backend;
pub mod models;
pub mod view;

#[cfg(test)]
mod testutils;

// Re-export key types for convenience
pub use backend::{BackendConfig, BackendError, BookingBackend};
pub use flow::{BookingFlow, FlowConfig, FlowError};
pub use http_backend::HttpBackend;
pub use mock_backend::{MockBackend, MockConfig, ServerMode};
pub use models::{
    BookingConfirmation, BookingDraft, BookingRequest, ConfirmationDetails, DateLocale,
    DraftField, ModelError, Price, Service, TimeSlot,
};
pub use view::{BookingView, Step, SubmitControl};
