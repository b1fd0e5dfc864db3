// Backend facade: the three calls the booking flow depends on.
// Implementations: mock_backend (in-memory stub) and http_backend (REST).

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{BookingConfirmation, BookingRequest, Service, TimeSlot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponse { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[async_trait]
pub trait BookingBackend: Send + Sync + 'static {
    async fn list_services(&self) -> Result<Vec<Service>, BackendError>;

    // An empty list means "no availability" for that date, not a failure.
    async fn list_available_times(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, BackendError>;

    async fn submit_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, BackendError>;
}

// Lets the flow hold a shared handle (e.g. Arc<MockBackend>) so the caller
// keeps access to the backend's knobs.
#[async_trait]
impl<B: BookingBackend + ?Sized> BookingBackend for std::sync::Arc<B> {
    async fn list_services(&self) -> Result<Vec<Service>, BackendError> {
        (**self).list_services().await
    }

    async fn list_available_times(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, BackendError> {
        (**self).list_available_times(date).await
    }

    async fn submit_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, BackendError> {
        (**self).submit_booking(request).await
    }
}
