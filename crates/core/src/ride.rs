//! Ride records and the payloads that create or update them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::id::{RideId, UserId};

/// Lifecycle of a ride. Transitions happen server-side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Open,
    Completed,
    Cancelled,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Open => "open",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
            RideStatus::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver summary embedded in ride responses (no contact details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideDriver {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
}

/// A ride as returned by `GET /rides/` and `GET /rides/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    #[serde(default)]
    pub driver: Option<RideDriver>,
    pub origin_name: String,
    pub dest_name: String,
    pub depart_time: DateTime<Utc>,
    pub total_seats: i64,
    pub seats_available: i64,
    #[serde(with = "crate::decimal", default)]
    pub price_per_seat: f64,
    #[serde(default)]
    pub vehicle_company: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    /// Kept as sent, so it displays the way the server renders it.
    #[serde(default)]
    pub vehicle_safety_rating: Decimal,
    pub status: RideStatus,
    #[serde(default)]
    pub preferences: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ride {
    /// `"{company} {model} ({safety})"`, or `"N/A"` when no vehicle is recorded.
    pub fn vehicle_label(&self) -> String {
        match self.vehicle_company.as_deref().filter(|c| !c.is_empty()) {
            Some(company) => format!(
                "{} {} ({})",
                company,
                self.vehicle_model.as_deref().unwrap_or_default(),
                self.vehicle_safety_rating
            ),
            None => "N/A".to_string(),
        }
    }

    pub fn driver_name(&self) -> &str {
        self.driver
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("Driver")
    }

    pub fn route_label(&self) -> String {
        format!("{} → {}", self.origin_name, self.dest_name)
    }
}

/// Body of `POST /rides/create/`.
///
/// Text fields are forwarded as the driver typed them; the API validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRide {
    pub driver_id: UserId,
    pub origin_name: String,
    pub dest_name: String,
    pub depart_time: String,
    pub total_seats: i64,
    pub seats_available: i64,
    pub price_per_seat: f64,
    pub preferences: String,
    pub vehicle_company: String,
    pub vehicle_model: String,
    pub vehicle_safety_rating: f64,
}

/// Raw driver input for posting a ride, before numeric coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRideForm {
    pub origin_name: String,
    pub dest_name: String,
    pub depart_time: String,
    pub total_seats: String,
    pub price_per_seat: String,
    pub vehicle_company: String,
    pub vehicle_model: String,
    pub vehicle_safety: String,
    pub preferences: String,
}

impl PostRideForm {
    /// Coerce the form into a create payload.
    ///
    /// Unparseable or zero seat counts fall back to 1; unparseable price and
    /// safety fall back to 0. Every ride starts with all seats available.
    pub fn into_new_ride(self, driver_id: UserId) -> NewRide {
        let total_seats = self
            .total_seats
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n != 0)
            .unwrap_or(1);
        let price_per_seat = parse_or_zero(&self.price_per_seat);
        let vehicle_safety_rating = parse_or_zero(&self.vehicle_safety);

        NewRide {
            driver_id,
            origin_name: self.origin_name.trim().to_string(),
            dest_name: self.dest_name.trim().to_string(),
            depart_time: self.depart_time,
            total_seats,
            seats_available: total_seats,
            price_per_seat,
            preferences: self.preferences.trim().to_string(),
            vehicle_company: self.vehicle_company.trim().to_string(),
            vehicle_model: self.vehicle_model.trim().to_string(),
            vehicle_safety_rating,
        }
    }
}

fn parse_or_zero(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Response of `POST /rides/create/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRide {
    #[serde(default)]
    pub message: Option<String>,
    pub ride_id: RideId,
}

/// Body of status-only PATCH requests on rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideStatusUpdate {
    pub status: RideStatus,
}
