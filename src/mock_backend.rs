// In-memory stand-in for the booking server.
// Serves a fixed catalog, hides a random share of the daily slots to fake
// existing bookings, and echoes submissions back with a wall-clock id.

use std::{
    sync::atomic::{AtomicU8, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    backend::{BackendError, BookingBackend},
    models::{BookingConfirmation, BookingRequest, Price, Service, TimeSlot},
};

const DAILY_SLOTS: [(u8, u8); 14] = [
    (9, 0),
    (9, 30),
    (10, 0),
    (10, 30),
    (11, 0),
    (11, 30),
    (14, 0),
    (14, 30),
    (15, 0),
    (15, 30),
    (16, 0),
    (16, 30),
    (17, 0),
    (17, 30),
];

pub fn default_catalog() -> Vec<Service> {
    vec![
        Service::new(1, "Corte Social", 30, Price::from_minor_units(4000)),
        Service::new(2, "Barba Terapia", 45, Price::from_minor_units(5000)),
        Service::new(3, "Corte + Barba", 75, Price::from_minor_units(8500)),
        Service::new(4, "Pezinho", 15, Price::from_minor_units(1500)),
        Service::new(5, "Sobrancelha", 20, Price::from_minor_units(2500)),
        Service::new(6, "Platinado", 120, Price::from_minor_units(25000)),
    ]
}

pub fn daily_slots() -> Vec<TimeSlot> {
    DAILY_SLOTS
        .iter()
        .filter_map(|&(hour, minute)| TimeSlot::new(hour, minute).ok())
        .collect()
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub services_delay_ms: u64,
    pub availability_delay_ms: u64,
    pub submit_delay_ms: u64,
    // Chance that each daily slot is reported free.
    pub slot_retention: f64,
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            services_delay_ms: 500,
            availability_delay_ms: 300,
            submit_delay_ms: 1000,
            slot_retention: 0.7,
            seed: None,
        }
    }
}

impl MockConfig {
    // No latency; handy for tests and benchmarks.
    pub fn instant() -> Self {
        Self {
            services_delay_ms: 0,
            availability_delay_ms: 0,
            submit_delay_ms: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Normal,
    CompleteOutage,
}

pub struct MockBackend {
    config: MockConfig,
    catalog: Vec<Service>,
    rng: Mutex<StdRng>,
    mode: AtomicU8,
    request_count: AtomicUsize,
    fail_next_requests: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl MockBackend {
    pub fn new(config: MockConfig) -> Self {
        Self::with_catalog(config, default_catalog())
    }

    pub fn with_catalog(config: MockConfig, catalog: Vec<Service>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            catalog,
            rng: Mutex::new(rng),
            mode: AtomicU8::new(0),
            request_count: AtomicUsize::new(0),
            fail_next_requests: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: ServerMode) {
        let mode_value = match mode {
            ServerMode::Normal => 0,
            ServerMode::CompleteOutage => 1,
        };
        self.mode.store(mode_value, Ordering::SeqCst);
    }

    // The next `count` calls, of any kind, fail with Unavailable.
    pub fn fail_next_requests(&self, count: usize) {
        self.fail_next_requests.store(count, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn catalog(&self) -> &[Service] {
        &self.catalog
    }

    // Each daily slot survives independently with `slot_retention` probability.
    pub fn generate_slots(&self) -> Vec<TimeSlot> {
        // NaN and infinities count as "nothing free".
        let retention = match self.config.slot_retention {
            r if r.is_finite() => r.clamp(0.0, 1.0),
            _ => 0.0,
        };
        let mut rng = self.rng.lock();
        daily_slots()
            .into_iter()
            .filter(|_| rng.gen_bool(retention))
            .collect()
    }

    async fn begin_request(&self, operation: &str, delay_ms: u64) -> Result<(), BackendError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if self.mode.load(Ordering::SeqCst) == 1 {
            warn!(operation, "mock backend in outage mode");
            return Err(BackendError::Unavailable("Service unavailable".to_string()));
        }

        let taken = self
            .fail_next_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if taken.is_ok() {
            warn!(operation, "mock backend injected failure");
            return Err(BackendError::Unavailable(
                "Service temporarily unavailable".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl BookingBackend for MockBackend {
    async fn list_services(&self) -> Result<Vec<Service>, BackendError> {
        debug!("mock backend: listing services");
        self.begin_request("list_services", self.config.services_delay_ms)
            .await?;
        info!(count = self.catalog.len(), "mock backend: services found");
        Ok(self.catalog.clone())
    }

    async fn list_available_times(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, BackendError> {
        debug!(%date, "mock backend: looking up available times");
        self.begin_request("list_available_times", self.config.availability_delay_ms)
            .await?;
        let slots = self.generate_slots();
        info!(%date, count = slots.len(), "mock backend: available times found");
        Ok(slots)
    }

    async fn submit_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, BackendError> {
        debug!(?request, "mock backend: submitting booking");
        self.begin_request("submit_booking", self.config.submit_delay_ms)
            .await?;

        if request.client_name.trim().is_empty() || request.client_phone.trim().is_empty() {
            return Err(BackendError::ValidationFailed(
                "client name and phone are required".to_string(),
            ));
        }
        if !self.catalog.iter().any(|s| s.id == request.service_id) {
            return Err(BackendError::ValidationFailed(format!(
                "unknown service id {}",
                request.service_id
            )));
        }

        let id = Utc::now().timestamp_millis().to_string();
        info!(booking_id = %id, "mock backend: booking confirmed");
        Ok(BookingConfirmation::from_request(request, id))
    }
}
