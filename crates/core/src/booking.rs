//! Booking records, seat requests and status updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{BookingId, RideId, UserId};
use crate::metrics::round_one_decimal;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    AwaitingRating,
    Rated,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::AwaitingRating => "awaiting_rating",
            BookingStatus::Rated => "rated",
            BookingStatus::Unknown => "unknown",
        }
    }

    /// Statuses that count as a passenger actually on (or done with) the ride.
    pub fn is_on_ride(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::AwaitingRating | BookingStatus::Rated
        )
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passenger details embedded in booking responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// A booking as returned by `GET /bookings/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub ride: RideId,
    #[serde(default)]
    pub passenger: Option<Passenger>,
    pub seats_booked: i64,
    #[serde(default)]
    pub payment_mode: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub legroom_rating: Option<i64>,
    #[serde(default)]
    pub cleanliness_rating: Option<i64>,
    #[serde(default)]
    pub driving_smoothness_rating: Option<i64>,
    #[serde(default)]
    pub temperature_comfort_rating: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Sub-ratings that were actually given (absent or zero entries skipped).
    pub fn sub_ratings(&self) -> Vec<i64> {
        [
            self.legroom_rating,
            self.cleanliness_rating,
            self.driving_smoothness_rating,
            self.temperature_comfort_rating,
        ]
        .into_iter()
        .flatten()
        .filter(|r| *r != 0)
        .collect()
    }

    pub fn has_rating(&self) -> bool {
        !self.sub_ratings().is_empty()
    }

    /// Mean of the given sub-ratings, if any.
    pub fn mean_rating(&self) -> Option<f64> {
        let ratings = self.sub_ratings();
        if ratings.is_empty() {
            return None;
        }
        Some(ratings.iter().sum::<i64>() as f64 / ratings.len() as f64)
    }

    /// `"{mean} stars"`, or `"N/A stars"` when no sub-rating was recorded.
    pub fn stars_label(&self) -> String {
        match self.mean_rating() {
            Some(mean) => format!("{:.1} stars", round_one_decimal(mean)),
            None => "N/A stars".to_string(),
        }
    }

    /// Rating column shown to drivers in the passenger list.
    pub fn rating_text(&self) -> String {
        match self.status {
            BookingStatus::Rated => self.stars_label(),
            BookingStatus::AwaitingRating => "Awaiting".to_string(),
            _ => "N/A".to_string(),
        }
    }

    /// Review column shown to admins.
    pub fn review_text(&self) -> String {
        match self.status {
            BookingStatus::Rated => {
                let mut text = self.stars_label();
                if !self.description.is_empty() {
                    text.push_str(&format!(": \"{}\"", self.description));
                }
                text
            }
            BookingStatus::AwaitingRating => "Awaiting Rating".to_string(),
            other => other.to_string(),
        }
    }

    /// First 30 characters of the review, for the passenger's own table.
    pub fn review_excerpt(&self) -> Option<String> {
        if self.description.is_empty() {
            return None;
        }
        let excerpt: String = self.description.chars().take(30).collect();
        Some(format!("{excerpt}..."))
    }
}

/// Body of `POST /bookings/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub ride_id: RideId,
    pub passenger_id: UserId,
    pub seats_booked: i64,
    pub status: BookingStatus,
    pub payment_mode: String,
}

impl NewBooking {
    pub fn offline(ride_id: RideId, passenger_id: UserId, seats_booked: i64) -> Self {
        Self {
            ride_id,
            passenger_id,
            seats_booked,
            status: BookingStatus::Confirmed,
            payment_mode: "offline".to_string(),
        }
    }
}

/// Response of `POST /bookings/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBooking {
    #[serde(default)]
    pub message: Option<String>,
    pub booking_id: BookingId,
}

/// Parse a requested seat count against what the ride still has.
///
/// `available` is the bound shown to the passenger when the booking prompt
/// opened; the server re-checks it.
pub fn parse_seat_request(raw: &str, available: Option<i64>) -> DomainResult<i64> {
    let seats = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| DomainError::validation("Invalid number of seats entered."))?;

    if let Some(max) = available {
        if seats > max {
            return Err(DomainError::validation(format!(
                "Only {max} seat(s) available."
            )));
        }
    }
    Ok(seats)
}

/// Body of status-only PATCH requests on bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(status: BookingStatus, ratings: [Option<i64>; 4]) -> Booking {
        Booking {
            id: BookingId::new(1),
            ride: RideId::new(1),
            passenger: None,
            seats_booked: 1,
            payment_mode: "offline".into(),
            status,
            legroom_rating: ratings[0],
            cleanliness_rating: ratings[1],
            driving_smoothness_rating: ratings[2],
            temperature_comfort_rating: ratings[3],
            description: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn parses_awaiting_rating_status() {
        let status: BookingStatus = serde_json::from_str("\"awaiting_rating\"").unwrap();
        assert_eq!(status, BookingStatus::AwaitingRating);
    }

    #[test]
    fn mean_ignores_missing_sub_ratings() {
        let b = booking(BookingStatus::Rated, [Some(4), None, Some(5), Some(0)]);
        assert_eq!(b.sub_ratings(), vec![4, 5]);
        assert_eq!(b.mean_rating(), Some(4.5));
        assert_eq!(b.rating_text(), "4.5 stars");
    }

    #[test]
    fn rating_text_by_status() {
        let awaiting = booking(BookingStatus::AwaitingRating, [None; 4]);
        assert_eq!(awaiting.rating_text(), "Awaiting");
        assert_eq!(awaiting.review_text(), "Awaiting Rating");

        let cancelled = booking(BookingStatus::Cancelled, [None; 4]);
        assert_eq!(cancelled.rating_text(), "N/A");
        assert_eq!(cancelled.review_text(), "cancelled");
    }

    #[test]
    fn review_text_quotes_description() {
        let mut b = booking(BookingStatus::Rated, [Some(5); 4]);
        b.description = "Smooth ride".into();
        assert_eq!(b.review_text(), "5.0 stars: \"Smooth ride\"");
    }

    #[test]
    fn review_excerpt_truncates_to_thirty_chars() {
        let mut b = booking(BookingStatus::Rated, [Some(5); 4]);
        assert_eq!(b.review_excerpt(), None);
        b.description = "a".repeat(40);
        assert_eq!(b.review_excerpt().unwrap(), format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn seat_request_validation() {
        assert_eq!(parse_seat_request("2", Some(3)), Ok(2));
        assert_eq!(parse_seat_request(" 1 ", None), Ok(1));
        assert!(parse_seat_request("0", Some(3)).is_err());
        assert!(parse_seat_request("-1", None).is_err());
        assert!(parse_seat_request("two", None).is_err());
        assert!(matches!(
            parse_seat_request("4", Some(3)),
            Err(DomainError::Validation(msg)) if msg == "Only 3 seat(s) available."
        ));
    }

    #[test]
    fn new_booking_is_confirmed_and_offline() {
        let body = serde_json::to_value(NewBooking::offline(RideId::new(4), UserId::new(8), 2)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "ride_id": 4, "passenger_id": 8, "seats_booked": 2,
                "status": "confirmed", "payment_mode": "offline"
            })
        );
    }
}
