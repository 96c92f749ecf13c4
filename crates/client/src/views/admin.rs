//! Admin dashboard: platform counts, user and ride moderation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use carpool_core::{
    AverageRating, Booking, BookingStatus, Ride, RideId, UserId, UserRecord,
};

use crate::action::Action;
use crate::api::{Query, endpoints};
use crate::error::ClientError;
use crate::views::{Context, Panel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCards {
    pub users: usize,
    pub rides: usize,
    pub bookings: usize,
    pub cancellations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminUserRow {
    pub user: UserRecord,
    /// Admin accounts are never offered for deletion.
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminRideRow {
    pub ride: Ride,
    pub driver_name: String,
    pub rating: AverageRating,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub cards: DashboardCards,
    pub users: Vec<AdminUserRow>,
    pub rides: Vec<AdminRideRow>,
}

/// One booking in the expanded panel of a ride.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminBookingRow {
    pub passenger: String,
    pub seats: i64,
    pub status: BookingStatus,
    pub review: String,
}

#[derive(Debug, Clone)]
pub struct AdminView {
    ctx: Context,
    expanded: Arc<Mutex<HashSet<RideId>>>,
}

impl AdminView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            expanded: Arc::default(),
        }
    }

    pub async fn dashboard(&self) -> Option<Dashboard> {
        let result = self.try_dashboard().await;
        self.ctx.report("load dashboard", result, None)
    }

    async fn try_dashboard(&self) -> Result<Dashboard, ClientError> {
        let api = &self.ctx.api;
        let users: Vec<UserRecord> = api.list(endpoints::USERS, &Query::new()).await?;
        let rides: Vec<Ride> = api
            .list(endpoints::RIDES, &Query::new().with("status", "all"))
            .await?;
        let bookings: Vec<Booking> = api.list(endpoints::BOOKINGS, &Query::new()).await?;

        let cards = DashboardCards {
            users: users.len(),
            rides: rides.len(),
            bookings: bookings.len(),
            cancellations: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Cancelled)
                .count(),
        };

        let names: HashMap<UserId, String> = users
            .iter()
            .map(|u| (u.id, u.first_name.clone()))
            .collect();

        let mut ride_rows = Vec::with_capacity(rides.len());
        for ride in rides {
            let query = Query::new()
                .with("ride_id", ride.id)
                .with("status", BookingStatus::Rated.as_str());
            let rated: Vec<Booking> = api.list(endpoints::BOOKINGS, &query).await?;
            let driver_name = ride
                .driver
                .as_ref()
                .and_then(|d| names.get(&d.id).cloned())
                .unwrap_or_else(|| "N/A".to_string());
            ride_rows.push(AdminRideRow {
                actions: vec![Action::DeleteRide(ride.id), Action::ToggleBookings(ride.id)],
                rating: AverageRating::from_bookings(&rated),
                driver_name,
                ride,
            });
        }

        let user_rows = users
            .into_iter()
            .map(|user| AdminUserRow {
                actions: if user.is_admin() {
                    Vec::new()
                } else {
                    vec![Action::DeleteUser(user.id)]
                },
                user,
            })
            .collect();

        self.expanded.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(Dashboard {
            cards,
            users: user_rows,
            rides: ride_rows,
        })
    }

    /// Open or close the bookings panel of `ride`. Opening always refetches.
    pub async fn toggle_bookings(&self, ride: RideId) -> Option<Panel<Vec<AdminBookingRow>>> {
        {
            let mut expanded = self.expanded.lock().unwrap_or_else(|e| e.into_inner());
            if expanded.remove(&ride) {
                return Some(Panel::Closed);
            }
        }

        let result = self.try_ride_bookings(ride).await;
        let rows = self.ctx.report("load ride bookings", result, None)?;
        self.expanded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(ride);
        Some(Panel::Opened(rows))
    }

    async fn try_ride_bookings(&self, ride: RideId) -> Result<Vec<AdminBookingRow>, ClientError> {
        let api = &self.ctx.api;
        let bookings: Vec<Booking> = api
            .list(endpoints::BOOKINGS, &Query::new().with("ride_id", ride))
            .await?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let users: Vec<UserRecord> = api.list(endpoints::USERS, &Query::new()).await?;
        Ok(bookings
            .iter()
            .map(|b| {
                let passenger = b
                    .passenger
                    .as_ref()
                    .and_then(|p| users.iter().find(|u| u.id == p.id))
                    .map(|u| u.first_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                AdminBookingRow {
                    passenger,
                    seats: b.seats_booked,
                    status: b.status,
                    review: b.review_text(),
                }
            })
            .collect())
    }

    /// Delete a user and, server-side, their rides and bookings.
    pub async fn delete_user(&self, user: UserId) -> Option<Dashboard> {
        if !self
            .ctx
            .confirm
            .confirm("Delete this user? This will remove their rides and bookings.")
        {
            return None;
        }
        let result = self
            .ctx
            .api
            .delete_data(endpoints::USERS, user)
            .await
            .map_err(ClientError::from);
        self.ctx
            .report("delete user", result, Some("Failed to delete user profile."))?;
        tracing::info!(%user, "user deleted");
        self.ctx.notifier.success("User profile deleted.");
        self.dashboard().await
    }

    pub async fn delete_ride(&self, ride: RideId) -> Option<Dashboard> {
        if !self.ctx.confirm.confirm("Delete this ride?") {
            return None;
        }
        let result = self
            .ctx
            .api
            .delete_data(endpoints::RIDES, ride)
            .await
            .map_err(ClientError::from);
        self.ctx
            .report("delete ride", result, Some("Failed to delete ride."))?;
        tracing::info!(%ride, "ride deleted");
        self.ctx.notifier.success("Ride deleted.");
        self.dashboard().await
    }
}
