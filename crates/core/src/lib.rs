//! `carpool-core`: record shapes and client-side rules of the carpool client.
//!
//! This crate contains **pure** types and derivations (no I/O). Everything
//! that talks to the remote API lives in `carpool-client`.

pub mod booking;
pub mod decimal;
pub mod error;
pub mod id;
pub mod metrics;
pub mod rating;
pub mod ride;
pub mod role;
pub mod session;
pub mod user;

pub use booking::{
    Booking, BookingStatus, BookingStatusUpdate, CreatedBooking, NewBooking, Passenger,
    parse_seat_request,
};
pub use decimal::Decimal;
pub use error::{DomainError, DomainResult};
pub use id::{BookingId, RideId, UserId};
pub use metrics::{AverageRating, SearchFilter, confirmed_seat_count, safest_flags};
pub use rating::{RatingForm, RatingSubmission};
pub use ride::{
    CreatedRide, NewRide, PostRideForm, Ride, RideDriver, RideStatus, RideStatusUpdate,
};
pub use role::Role;
pub use session::SessionIdentity;
pub use user::{AuthResponse, LoginRequest, SignupRequest, SummaryCounts, UserRecord};
