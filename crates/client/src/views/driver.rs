//! Driver page: post rides, list own rides, manage passengers.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use carpool_core::metrics::confirmed_seat_count;
use carpool_core::{
    AverageRating, Booking, BookingStatus, CreatedRide, PostRideForm, Ride, RideId, RideStatus,
    RideStatusUpdate,
};

use crate::action::Action;
use crate::api::{Query, endpoints};
use crate::error::ClientError;
use crate::views::{Context, Panel};

/// One row of the "my rides" table.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRideRow {
    pub ride: Ride,
    pub confirmed: usize,
    pub rating: AverageRating,
    pub actions: Vec<Action>,
    /// Shown instead of actions for rides that are no longer open.
    pub note: Option<&'static str>,
}

impl DriverRideRow {
    fn new(ride: Ride, confirmed: usize, rating: AverageRating) -> Self {
        let (actions, note) = match ride.status {
            RideStatus::Open => (
                vec![
                    Action::CancelRide(ride.id),
                    Action::TogglePassengers(ride.id),
                    Action::MarkCompleted(ride.id),
                ],
                None,
            ),
            RideStatus::Completed => (Vec::new(), Some("Completed")),
            _ => (Vec::new(), Some("No action")),
        };
        Self {
            ride,
            confirmed,
            rating,
            actions,
            note,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyRides {
    pub rows: Vec<DriverRideRow>,
}

/// One passenger in the expanded panel of a ride.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerRow {
    pub name: String,
    pub email: String,
    pub seats: i64,
    pub status: BookingStatus,
    pub rating: String,
}

impl From<&Booking> for PassengerRow {
    fn from(booking: &Booking) -> Self {
        let (name, email) = booking
            .passenger
            .as_ref()
            .map(|p| (p.name.clone(), p.email.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));
        Self {
            name,
            email,
            seats: booking.seats_booked,
            status: booking.status,
            rating: booking.rating_text(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverView {
    ctx: Context,
    expanded: Arc<Mutex<HashSet<RideId>>>,
}

impl DriverView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            expanded: Arc::default(),
        }
    }

    /// Post a ride for the logged-in driver; on success the refreshed list
    /// is returned.
    pub async fn post_ride(&self, form: PostRideForm) -> Option<MyRides> {
        let result = self.try_post_ride(form).await;
        self.ctx.report("post ride", result, Some("Failed to post ride."))?;
        self.ctx.notifier.success("Ride posted successfully!");
        self.my_rides().await
    }

    async fn try_post_ride(&self, form: PostRideForm) -> Result<CreatedRide, ClientError> {
        let user = self.ctx.require_user()?;
        let ride = form.into_new_ride(user.id);
        let created: CreatedRide = self.ctx.api.create(endpoints::CREATE_RIDE, &ride).await?;
        tracing::info!(ride_id = %created.ride_id, "ride posted");
        Ok(created)
    }

    /// All rides of the logged-in driver, every status.
    ///
    /// Each row costs two extra requests: the confirmed bookings and the
    /// rated bookings of that ride.
    pub async fn my_rides(&self) -> Option<MyRides> {
        let result = self.try_my_rides().await;
        self.ctx.report("load driver rides", result, None)
    }

    async fn try_my_rides(&self) -> Result<MyRides, ClientError> {
        let user = self.ctx.require_user()?;
        let query = Query::new()
            .with("driver_id", user.id)
            .with("status", "all");
        let rides: Vec<Ride> = self.ctx.api.list(endpoints::RIDES, &query).await?;

        let mut rows = Vec::with_capacity(rides.len());
        for ride in rides {
            let confirmed = self.bookings_with_status(ride.id, BookingStatus::Confirmed).await?;
            let rated = self.bookings_with_status(ride.id, BookingStatus::Rated).await?;
            rows.push(DriverRideRow::new(
                ride,
                confirmed_seat_count(&confirmed),
                AverageRating::from_bookings(&rated),
            ));
        }
        // A fresh table starts with every panel closed.
        self.expanded.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(MyRides { rows })
    }

    async fn bookings_with_status(
        &self,
        ride: RideId,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, ClientError> {
        let query = Query::new()
            .with("ride_id", ride)
            .with("status", status.as_str());
        Ok(self.ctx.api.list(endpoints::BOOKINGS, &query).await?)
    }

    /// Open or close the passenger panel of `ride`. Opening always refetches.
    pub async fn toggle_passengers(&self, ride: RideId) -> Option<Panel<Vec<PassengerRow>>> {
        if self.close_if_open(ride) {
            return Some(Panel::Closed);
        }

        let query = Query::new().with("ride_id", ride);
        let result = self
            .ctx
            .api
            .list::<Booking>(endpoints::BOOKINGS, &query)
            .await
            .map_err(ClientError::from);
        let bookings = self.ctx.report("load passengers", result, None)?;

        let rows = bookings
            .iter()
            .filter(|b| b.status.is_on_ride())
            .map(PassengerRow::from)
            .collect();
        self.mark_open(ride);
        Some(Panel::Opened(rows))
    }

    fn close_if_open(&self, ride: RideId) -> bool {
        let mut expanded = self.expanded.lock().unwrap_or_else(|e| e.into_inner());
        expanded.remove(&ride)
    }

    fn mark_open(&self, ride: RideId) {
        let mut expanded = self.expanded.lock().unwrap_or_else(|e| e.into_inner());
        expanded.insert(ride);
    }

    /// Mark an open ride completed. Confirmed bookings move to awaiting rating
    /// on the server.
    pub async fn mark_completed(&self, ride: RideId) -> Option<MyRides> {
        if !self
            .ctx
            .confirm
            .confirm("Mark this ride as completed? Passengers will be asked to rate you.")
        {
            return None;
        }
        let result = self.set_status(ride, RideStatus::Completed).await;
        self.ctx
            .report("complete ride", result, Some("Failed to complete ride."))?;
        self.ctx
            .notifier
            .success("Ride marked as completed. Passengers can now rate you.");
        self.my_rides().await
    }

    /// Cancel an open ride. The server cancels its confirmed bookings and
    /// returns their seats.
    pub async fn cancel_ride(&self, ride: RideId) -> Option<MyRides> {
        if !self.ctx.confirm.confirm("Cancel this ride?") {
            return None;
        }
        let result = self.set_status(ride, RideStatus::Cancelled).await;
        self.ctx
            .report("cancel ride", result, Some("Failed to cancel ride."))?;
        self.ctx
            .notifier
            .success("Ride successfully cancelled. Associated bookings were also cancelled.");
        self.my_rides().await
    }

    async fn set_status(&self, ride: RideId, status: RideStatus) -> Result<(), ClientError> {
        self.ctx
            .api
            .update_data(endpoints::RIDES, ride, &RideStatusUpdate { status })
            .await?;
        tracing::info!(%ride, status = status.as_str(), "ride status updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ride(status: RideStatus) -> Ride {
        Ride {
            id: RideId::new(3),
            driver: None,
            origin_name: "Pune".into(),
            dest_name: "Mumbai".into(),
            depart_time: Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap(),
            total_seats: 3,
            seats_available: 3,
            price_per_seat: 250.0,
            vehicle_company: None,
            vehicle_model: None,
            vehicle_safety_rating: 0.0.into(),
            status,
            preferences: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn open_rides_offer_the_three_driver_actions() {
        let row = DriverRideRow::new(ride(RideStatus::Open), 0, AverageRating::NotRated);
        assert_eq!(
            row.actions,
            vec![
                Action::CancelRide(RideId::new(3)),
                Action::TogglePassengers(RideId::new(3)),
                Action::MarkCompleted(RideId::new(3)),
            ]
        );
        assert_eq!(row.note, None);
    }

    #[test]
    fn closed_rides_show_a_note_instead() {
        let done = DriverRideRow::new(ride(RideStatus::Completed), 2, AverageRating::NotRated);
        assert!(done.actions.is_empty());
        assert_eq!(done.note, Some("Completed"));

        let cancelled = DriverRideRow::new(ride(RideStatus::Cancelled), 0, AverageRating::NotRated);
        assert_eq!(cancelled.note, Some("No action"));
    }
}
