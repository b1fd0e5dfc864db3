// Booking data model: catalog entries, time slots, the session draft and
// what the backend hands back once a booking is accepted.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid time slot: {0} (expected HH:MM)")]
    InvalidTimeSlot(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),
}

// Price in minor units (centavos). The catalog is priced in BRL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u32);

impl Price {
    pub const fn from_minor_units(minor: u32) -> Self {
        Self(minor)
    }

    pub const fn minor_units(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {},{:02}", self.0 / 100, self.0 % 100)
    }
}

// Accepts "40,00", "40.00", "40,5" and "40".
impl FromStr for Price {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidPrice(s.to_string());
        let trimmed = s.trim().trim_start_matches("R$").trim();
        let (whole, frac) = match trimmed.split_once([',', '.']) {
            Some((whole, frac)) => (whole, frac),
            None => (trimmed, "0"),
        };
        if !is_digits(whole) || !is_digits(frac) || frac.len() > 2 {
            return Err(invalid());
        }
        let whole: u32 = whole.parse().map_err(|_| invalid())?;
        let mut cents: u32 = frac.parse().map_err(|_| invalid())?;
        if frac.len() == 1 {
            cents *= 10;
        }
        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .map(Price)
            .ok_or_else(invalid)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u32,
    pub name: String,
    pub duration_minutes: u32,
    pub price: Price,
}

impl Service {
    pub fn new(id: u32, name: impl Into<String>, duration_minutes: u32, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            duration_minutes,
            price,
        }
    }
}

// 24-hour "HH:MM" label. Ordering follows the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ModelError> {
        if hour > 23 || minute > 59 {
            return Err(ModelError::InvalidTimeSlot(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidTimeSlot(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 || !is_digits(hour) || !is_digits(minute) {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ModelError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ModelError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Service,
    Date,
    Time,
    ClientName,
    ClientPhone,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::Service => "service",
            DraftField::Date => "date",
            DraftField::Time => "time",
            DraftField::ClientName => "name",
            DraftField::ClientPhone => "phone",
        };
        f.write_str(name)
    }
}

// Selections made so far in the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub service: Option<Service>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
}

impl BookingDraft {
    pub fn is_empty(&self) -> bool {
        self.service.is_none() && self.date.is_none() && self.time.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // Reports every missing field. Whitespace-only contact fields count as missing.
    pub fn to_request(
        &self,
        client_name: &str,
        client_phone: &str,
    ) -> Result<BookingRequest, Vec<DraftField>> {
        let client_name = client_name.trim();
        let client_phone = client_phone.trim();

        let mut missing = Vec::new();
        if self.service.is_none() {
            missing.push(DraftField::Service);
        }
        if self.date.is_none() {
            missing.push(DraftField::Date);
        }
        if self.time.is_none() {
            missing.push(DraftField::Time);
        }
        if client_name.is_empty() {
            missing.push(DraftField::ClientName);
        }
        if client_phone.is_empty() {
            missing.push(DraftField::ClientPhone);
        }

        match (&self.service, self.date, self.time) {
            (Some(service), Some(date), Some(time)) if missing.is_empty() => Ok(BookingRequest {
                service_id: service.id,
                date,
                time,
                client_name: client_name.to_string(),
                client_phone: client_phone.to_string(),
            }),
            _ => Err(missing),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub service_id: u32,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub client_name: String,
    pub client_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub service_id: u32,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub client_name: String,
    pub client_phone: String,
}

// Servers hand out either numeric or string ids; both are kept as text.
fn opaque_id<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

impl BookingConfirmation {
    pub fn from_request(request: BookingRequest, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            service_id: request.service_id,
            date: request.date,
            time: request.time,
            client_name: request.client_name,
            client_phone: request.client_phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    #[default]
    PtBr,
    EnUs,
    Iso,
}

impl DateLocale {
    pub fn format(self, date: NaiveDate) -> String {
        let pattern = match self {
            DateLocale::PtBr => "%d/%m/%Y",
            DateLocale::EnUs => "%m/%d/%Y",
            DateLocale::Iso => "%Y-%m-%d",
        };
        date.format(pattern).to_string()
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" => Ok(DateLocale::PtBr),
            "en-us" => Ok(DateLocale::EnUs),
            "iso" => Ok(DateLocale::Iso),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

// What the confirmation dialog displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationDetails {
    pub booking_id: String,
    pub service_name: String,
    pub date_display: String,
    pub time: TimeSlot,
}

impl ConfirmationDetails {
    pub fn new(
        booking_id: impl Into<String>,
        service: &Service,
        date: NaiveDate,
        time: TimeSlot,
        locale: DateLocale,
    ) -> Self {
        Self {
            booking_id: booking_id.into(),
            service_name: service.name.clone(),
            date_display: locale.format(date),
            time,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Service: {}\nDate: {}\nTime: {}",
            self.service_name, self.date_display, self.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corte_social() -> Service {
        Service::new(1, "Corte Social", 30, Price::from_minor_units(4000))
    }

    #[test]
    fn test_price_display_and_parse() {
        let price: Price = "40,00".parse().unwrap();
        assert_eq!(price.minor_units(), 4000);
        assert_eq!(price.to_string(), "R$ 40,00");

        assert_eq!("R$ 250,00".parse::<Price>().unwrap().minor_units(), 25000);
        assert_eq!("12.5".parse::<Price>().unwrap().minor_units(), 1250);
        assert_eq!("15".parse::<Price>().unwrap().minor_units(), 1500);
        assert!("abc".parse::<Price>().is_err());
        for bad in ["1,234", "+40", "40,+5", "-1", "40,", ",50", "4 0"] {
            assert!(bad.parse::<Price>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_time_slot_parsing() {
        let slot: TimeSlot = "09:30".parse().unwrap();
        assert_eq!(slot.hour(), 9);
        assert_eq!(slot.minute(), 30);
        assert_eq!(slot.to_string(), "09:30");

        for bad in ["9:30", "24:00", "12:60", "1230", "", "ab:cd", "+9:30", "09:+5"] {
            assert!(bad.parse::<TimeSlot>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_time_slot_serializes_as_label() {
        let slot: TimeSlot = "17:00".parse().unwrap();
        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"17:00\"");
        let back: TimeSlot = serde_json::from_str("\"17:00\"").unwrap();
        assert_eq!(back, slot);
        assert!(serde_json::from_str::<TimeSlot>("\"7pm\"").is_err());
    }

    #[test]
    fn test_empty_draft_reports_every_missing_field() {
        let draft = BookingDraft::default();
        let missing = draft.to_request("", "  ").unwrap_err();
        assert_eq!(
            missing,
            vec![
                DraftField::Service,
                DraftField::Date,
                DraftField::Time,
                DraftField::ClientName,
                DraftField::ClientPhone,
            ]
        );
    }

    #[test]
    fn test_complete_draft_builds_request() {
        let draft = BookingDraft {
            service: Some(corte_social()),
            date: Some(parse_date("2025-03-10").unwrap()),
            time: Some("09:30".parse().unwrap()),
        };

        let request = draft.to_request(" Ana ", "11999999999").unwrap();
        assert_eq!(request.service_id, 1);
        assert_eq!(request.client_name, "Ana");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "serviceId": 1,
                "date": "2025-03-10",
                "time": "09:30",
                "clientName": "Ana",
                "clientPhone": "11999999999",
            })
        );
    }

    #[test]
    fn test_confirmation_details_use_locale() {
        let date = parse_date("2025-03-10").unwrap();
        let time: TimeSlot = "09:30".parse().unwrap();

        let details =
            ConfirmationDetails::new("42", &corte_social(), date, time, DateLocale::PtBr);
        assert_eq!(details.booking_id, "42");
        assert_eq!(details.date_display, "10/03/2025");
        assert_eq!(
            details.summary(),
            "Service: Corte Social\nDate: 10/03/2025\nTime: 09:30"
        );

        let us = ConfirmationDetails::new("42", &corte_social(), date, time, DateLocale::EnUs);
        assert_eq!(us.date_display, "03/10/2025");
    }

    #[test]
    fn test_confirmation_accepts_numeric_id() {
        let confirmation: BookingConfirmation = serde_json::from_value(serde_json::json!({
            "id": 1741600000000u64,
            "serviceId": 1,
            "date": "2025-03-10",
            "time": "09:30",
            "clientName": "Ana",
            "clientPhone": "11999999999",
        }))
        .unwrap();
        assert_eq!(confirmation.id, "1741600000000");
    }

    #[test]
    fn test_service_wire_shape() {
        let json = serde_json::to_value(corte_social()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "Corte Social", "durationMinutes": 30, "price": 4000})
        );
    }
}
