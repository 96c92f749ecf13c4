//! Passenger page: search, book, rate, cancel.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use carpool_core::{
    Booking, BookingId, BookingStatus, BookingStatusUpdate, CreatedBooking, DomainError,
    NewBooking, RatingForm, RatingSubmission, Ride, RideId, SearchFilter, UserRecord,
    parse_seat_request, safest_flags,
};

use crate::action::Action;
use crate::api::{Query, endpoints};
use crate::error::ClientError;
use crate::views::Context;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub origin: String,
    pub dest: String,
    /// `YYYY-MM-DD`, or empty for any date.
    pub date: String,
}

impl SearchForm {
    fn filter(&self) -> Result<SearchFilter, DomainError> {
        let raw = self.date.trim();
        if raw.is_empty() {
            return Ok(SearchFilter::default());
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| DomainError::validation("Invalid date, expected YYYY-MM-DD."))?;
        Ok(SearchFilter { date: Some(date) })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub ride: Ride,
    /// Safety rating equals the best rating among the results.
    pub safest: bool,
}

impl SearchResult {
    pub fn action(&self) -> Action {
        Action::OpenBooking(self.ride.id)
    }
}

/// Ride shown in the booking prompt, with the seat bound it was opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPrompt {
    pub ride: Ride,
    pub max_seats: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRow {
    pub booking: Booking,
    /// `None` when the booking's ride is missing from the ride list.
    pub ride: Option<Ride>,
    pub actions: Vec<Action>,
    pub note: Option<String>,
}

impl BookingRow {
    fn new(booking: Booking, ride: Option<Ride>) -> Self {
        let id = booking.id;
        let view_driver = Action::ViewDriver(booking.ride);
        let (actions, note) = match booking.status {
            BookingStatus::Confirmed => (vec![Action::CancelBooking(id), view_driver], None),
            BookingStatus::AwaitingRating => {
                (vec![Action::ToggleRatingForm(id), view_driver], None)
            }
            BookingStatus::Rated => {
                let mut note = format!("Rated ({})", booking.stars_label());
                if let Some(excerpt) = booking.review_excerpt() {
                    note.push_str(&format!(" ({excerpt})"));
                }
                (vec![view_driver], Some(note))
            }
            _ => (vec![view_driver], Some("No action".to_string())),
        };
        Self {
            booking,
            ride,
            actions,
            note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverDetails {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub vehicle: String,
}

#[derive(Debug, Clone, Default)]
struct PassengerState {
    open_rating_forms: HashSet<BookingId>,
    prompt: Option<BookingPrompt>,
}

#[derive(Debug, Clone)]
pub struct PassengerView {
    ctx: Context,
    state: Arc<Mutex<PassengerState>>,
}

impl PassengerView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: Arc::default(),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PassengerState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Open rides matching origin/destination, with free seats, optionally on
    /// one departure date.
    pub async fn search(&self, form: SearchForm) -> Option<Vec<SearchResult>> {
        let result = self.try_search(&form).await;
        let results = self.ctx.report("search rides", result, None)?;
        if results.is_empty() {
            self.ctx
                .notifier
                .info("No rides found matching your criteria.");
        }
        Some(results)
    }

    async fn try_search(&self, form: &SearchForm) -> Result<Vec<SearchResult>, ClientError> {
        let filter = form.filter()?;
        let query = Query::new()
            .with("origin", form.origin.trim())
            .with("dest", form.dest.trim())
            .with("status", "open");
        let rides: Vec<Ride> = self.ctx.api.list(endpoints::RIDES, &query).await?;
        let rides = filter.apply(rides);

        let flags = safest_flags(&rides);
        Ok(rides
            .into_iter()
            .zip(flags)
            .map(|(ride, safest)| SearchResult { ride, safest })
            .collect())
    }

    /// Fetch the ride fresh and open the booking prompt for it.
    pub async fn open_booking(&self, ride: RideId) -> Option<BookingPrompt> {
        let result = self.fetch_ride(ride).await;
        let ride = self.ctx.report("open booking", result, None)?;
        if ride.seats_available <= 0 {
            self.ctx.notifier.warning("No seats available");
            return None;
        }

        let prompt = BookingPrompt {
            max_seats: ride.seats_available,
            ride,
        };
        self.with_state(|s| s.prompt = Some(prompt.clone()));
        Some(prompt)
    }

    async fn fetch_ride(&self, ride: RideId) -> Result<Ride, ClientError> {
        match self.ctx.api.item::<Ride>(endpoints::RIDES, ride).await {
            Ok(ride) => Ok(ride),
            Err(err) if err.is_not_found() => Err(DomainError::not_found("Ride not found").into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Book `seats` on `ride`. Opens the prompt first when it is not already
    /// open for that ride.
    pub async fn book(&self, ride: RideId, seats: &str) -> Option<CreatedBooking> {
        let open = self.with_state(|s| s.prompt.clone().filter(|p| p.ride.id == ride));
        let prompt = match open {
            Some(prompt) => prompt,
            None => self.open_booking(ride).await?,
        };

        let result = self.try_book(&prompt, seats).await;
        let (created, seats) = self.ctx.report("book ride", result, None)?;
        self.with_state(|s| s.prompt = None);
        self.ctx
            .notifier
            .success(format!("Booked {seats} seat(s)! Payment: Offline"));
        Some(created)
    }

    async fn try_book(
        &self,
        prompt: &BookingPrompt,
        seats: &str,
    ) -> Result<(CreatedBooking, i64), ClientError> {
        let seats = parse_seat_request(seats, Some(prompt.max_seats))?;
        let user = self.ctx.require_user()?;
        let body = NewBooking::offline(prompt.ride.id, user.id, seats);
        let created: CreatedBooking = self.ctx.api.create(endpoints::BOOKINGS, &body).await?;
        tracing::info!(booking_id = %created.booking_id, ride_id = %prompt.ride.id, seats, "ride booked");
        Ok((created, seats))
    }

    /// Bookings of the logged-in passenger joined with their rides.
    pub async fn my_bookings(&self) -> Option<Vec<BookingRow>> {
        let result = self.try_my_bookings().await;
        self.ctx.report("load bookings", result, None)
    }

    async fn try_my_bookings(&self) -> Result<Vec<BookingRow>, ClientError> {
        let user = self.ctx.require_user()?;
        let bookings: Vec<Booking> = self
            .ctx
            .api
            .list(endpoints::BOOKINGS, &Query::new().with("passenger_id", user.id))
            .await?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let rides: Vec<Ride> = self
            .ctx
            .api
            .list(endpoints::RIDES, &Query::new().with("status", "all"))
            .await?;
        let rides: HashMap<RideId, Ride> = rides.into_iter().map(|r| (r.id, r)).collect();

        Ok(bookings
            .into_iter()
            .map(|b| {
                let ride = rides.get(&b.ride).cloned();
                BookingRow::new(b, ride)
            })
            .collect())
    }

    /// Open or close the rating form of a booking. Returns whether it is now open.
    pub fn toggle_rating_form(&self, booking: BookingId) -> bool {
        self.with_state(|s| {
            if s.open_rating_forms.remove(&booking) {
                false
            } else {
                s.open_rating_forms.insert(booking);
                true
            }
        })
    }

    /// Validate and submit a rating. Invalid input never reaches the network.
    pub async fn submit_rating(&self, booking: BookingId, form: RatingForm) -> Option<RatingSubmission> {
        let submission = match form.validate() {
            Ok(submission) => submission,
            Err(err) => {
                return self.ctx.report("rate driver", Err(err.into()), None);
            }
        };

        let result = self
            .ctx
            .api
            .update_data(endpoints::BOOKINGS, booking, &submission)
            .await
            .map_err(ClientError::from);
        self.ctx
            .report("rate driver", result, Some("Failed to submit rating."))?;

        self.with_state(|s| s.open_rating_forms.remove(&booking));
        self.ctx.notifier.success(format!(
            "Thank you! You rated the driver {:.1} stars on average.",
            carpool_core::metrics::round_one_decimal(submission.average())
        ));
        Some(submission)
    }

    /// Cancel a confirmed booking; the server returns its seats to the ride.
    pub async fn cancel_booking(&self, booking: BookingId) -> Option<Vec<BookingRow>> {
        if !self.ctx.confirm.confirm("Cancel booking?") {
            return None;
        }

        let body = BookingStatusUpdate {
            status: BookingStatus::Cancelled,
        };
        let result = self
            .ctx
            .api
            .update_action(endpoints::BOOKINGS, booking, "cancel", &body)
            .await
            .map_err(ClientError::from);
        self.ctx
            .report("cancel booking", result, Some("Failed to cancel booking."))?;

        tracing::info!(%booking, "booking cancelled");
        self.ctx
            .notifier
            .success("Booking successfully cancelled. Seat returned to ride.");
        self.my_bookings().await
    }

    /// Contact details of the driver of `ride`.
    pub async fn driver_details(&self, ride: RideId) -> Option<DriverDetails> {
        let result = self.try_driver_details(ride).await;
        self.ctx.report("driver details", result, None)
    }

    async fn try_driver_details(&self, ride: RideId) -> Result<DriverDetails, ClientError> {
        let ride = self.fetch_ride(ride).await?;
        let driver = ride
            .driver
            .as_ref()
            .ok_or_else(|| DomainError::not_found("Driver details not found"))?;

        let user = match self.ctx.api.item::<UserRecord>(endpoints::USERS, driver.id).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => {
                return Err(DomainError::not_found("Driver details not found").into());
            }
            Err(err) => return Err(err.into()),
        };

        Ok(DriverDetails {
            name: user.first_name,
            email: user.email,
            phone_number: user
                .phone_number
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            vehicle: ride.vehicle_label(),
        })
    }

    pub fn rating_form_open(&self, booking: BookingId) -> bool {
        self.with_state(|s| s.open_rating_forms.contains(&booking))
    }
}
