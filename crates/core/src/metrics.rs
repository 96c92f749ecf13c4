//! Presentational values derived client-side from fetched records.
//!
//! Nothing here is cached: callers fetch the bookings for a ride every time a
//! row is rendered and pass them in.

use chrono::NaiveDate;

use crate::booking::{Booking, BookingStatus};
use crate::ride::Ride;

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Number of bookings in `bookings` whose status is confirmed.
pub fn confirmed_seat_count(bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count()
}

/// Average driver rating over a ride's rated bookings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageRating {
    NotRated,
    Rated { average: f64, reviews: usize },
}

impl AverageRating {
    /// Mean over rated bookings (that carry at least one sub-rating) of each
    /// booking's own sub-rating mean.
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        let means: Vec<f64> = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Rated)
            .filter_map(Booking::mean_rating)
            .collect();

        if means.is_empty() {
            return AverageRating::NotRated;
        }
        AverageRating::Rated {
            average: means.iter().sum::<f64>() / means.len() as f64,
            reviews: means.len(),
        }
    }
}

impl core::fmt::Display for AverageRating {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AverageRating::NotRated => f.write_str("N/A"),
            AverageRating::Rated { average, reviews } => write!(
                f,
                "{:.1} / 5 ({} reviews)",
                round_one_decimal(*average),
                reviews
            ),
        }
    }
}

/// Highest non-zero safety rating in `rides`, if any.
pub fn max_safety_rating(rides: &[Ride]) -> Option<f64> {
    rides
        .iter()
        .map(|r| r.vehicle_safety_rating.value())
        .filter(|r| r.is_finite())
        .fold(None, |max: Option<f64>, r| match max {
            Some(m) if m >= r => Some(m),
            _ => Some(r),
        })
        .filter(|m| *m > 0.0)
}

/// One flag per ride: whether it has the best vehicle safety rating of the set.
pub fn safest_flags(rides: &[Ride]) -> Vec<bool> {
    let max = max_safety_rating(rides);
    rides
        .iter()
        .map(|r| max.is_some_and(|m| r.vehicle_safety_rating.value() == m))
        .collect()
}

/// Client-side part of the ride search.
///
/// The server filters by origin/destination text and status; seat availability
/// and departure date are checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub date: Option<NaiveDate>,
}

impl SearchFilter {
    pub fn matches(&self, ride: &Ride) -> bool {
        let date_ok = self
            .date
            .is_none_or(|d| ride.depart_time.date_naive() == d);
        ride.seats_available > 0 && date_ok
    }

    pub fn apply(&self, rides: Vec<Ride>) -> Vec<Ride> {
        rides.into_iter().filter(|r| self.matches(r)).collect()
    }
}
