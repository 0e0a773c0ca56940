//! Vehicle booking requests and cost totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type VehicleId = i64;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("both start and end dates are required")]
    MissingDates,

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("booking is already cancelled")]
    AlreadyCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A validated booking ready to be inserted. New bookings start `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    pub vehicle_id: VehicleId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
}

impl BookingRequest {
    /// Validate the raw form input. Blank fields count as missing.
    pub fn new(
        vehicle_id: VehicleId,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, BookingError> {
        let (start, end) = match (non_blank(start_date), non_blank(end_date)) {
            (Some(start), Some(end)) => (parse_date(start)?, parse_date(end)?),
            _ => return Err(BookingError::MissingDates),
        };

        if end < start {
            return Err(BookingError::EndBeforeStart { start, end });
        }

        Ok(Self {
            vehicle_id,
            start_date: start,
            end_date: end,
            status: BookingStatus::Pending,
        })
    }

    pub fn days(&self) -> i64 {
        inclusive_days(self.start_date, self.end_date)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| BookingError::InvalidDate(value.to_string()))
}

/// Both the first and the last day are billed.
fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Vehicle columns joined onto a booking row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub price_per_day: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A stored booking, with its vehicle joined in when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub vehicle_id: VehicleId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    #[serde(rename = "vehicles", default)]
    pub vehicle: Option<VehicleSummary>,
}

impl Booking {
    pub fn days(&self) -> i64 {
        inclusive_days(self.start_date, self.end_date)
    }

    /// Daily price times billed days; 0 when the vehicle is unknown.
    pub fn cost(&self) -> f64 {
        self.vehicle
            .as_ref()
            .map(|v| v.price_per_day * self.days() as f64)
            .unwrap_or(0.0)
    }

    pub fn cancel(&mut self) -> Result<(), BookingError> {
        if self.status == BookingStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }
        self.status = BookingStatus::Cancelled;
        Ok(())
    }
}

/// Sum of every booking's cost, cancelled ones included.
pub fn bookings_total(bookings: &[Booking]) -> f64 {
    bookings.iter().map(Booking::cost).sum()
}
