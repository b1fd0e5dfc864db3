// REST client for a real booking server.
//
//   GET  /services                      -> [Service]
//   GET  /availability?date=YYYY-MM-DD  -> ["HH:MM", ...]
//   POST /bookings                      -> {success, booking | message}

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info, warn};

use crate::{
    backend::{BackendConfig, BackendError, BookingBackend},
    models::{BookingConfirmation, BookingRequest, Service, TimeSlot},
};

#[derive(Debug, Deserialize)]
struct SubmitBookingResponse {
    success: bool,
    booking: Option<BookingConfirmation>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn map_transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout(self.config.timeout_ms)
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|p| p.message.or(p.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::CONFLICT => BackendError::Unavailable(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            BackendError::ValidationFailed(message)
        }
        _ => BackendError::ApiResponse {
            status_code: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl BookingBackend for HttpBackend {
    async fn list_services(&self) -> Result<Vec<Service>, BackendError> {
        let url = self.endpoint("services");
        debug!(%url, "fetching services");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let services: Vec<Service> = self.read_json(response).await?;
        info!(count = services.len(), "services fetched");
        Ok(services)
    }

    async fn list_available_times(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, BackendError> {
        let url = self.endpoint("availability");
        let date = date.format("%Y-%m-%d").to_string();
        debug!(%url, %date, "fetching availability");
        let response = self
            .client
            .get(&url)
            .query(&[("date", date.as_str())])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let slots: Vec<TimeSlot> = self.read_json(response).await?;
        info!(%date, count = slots.len(), "availability fetched");
        Ok(slots)
    }

    async fn submit_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, BackendError> {
        let url = self.endpoint("bookings");
        debug!(%url, service_id = request.service_id, "submitting booking");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let payload: SubmitBookingResponse = self.read_json(response).await?;

        match payload {
            SubmitBookingResponse {
                success: true,
                booking: Some(booking),
                ..
            } => {
                info!(booking_id = %booking.id, "booking accepted");
                Ok(booking)
            }
            SubmitBookingResponse {
                success: true,
                booking: None,
                ..
            } => Err(BackendError::Decode(
                "success response without booking".to_string(),
            )),
            SubmitBookingResponse { message, .. } => {
                let message = message.unwrap_or_else(|| "booking rejected".to_string());
                warn!(%message, "booking rejected by server");
                Err(BackendError::Unavailable(message))
            }
        }
    }
}
