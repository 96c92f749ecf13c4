//! Typed row actions.
//!
//! Views attach the actions available on each row; [`crate::app::App::dispatch`]
//! routes a chosen action to the controller that owns it.

use carpool_core::{BookingId, RideId, UserId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    // driver
    CancelRide(RideId),
    TogglePassengers(RideId),
    MarkCompleted(RideId),
    // passenger
    OpenBooking(RideId),
    CancelBooking(BookingId),
    ToggleRatingForm(BookingId),
    ViewDriver(RideId),
    // admin
    DeleteUser(UserId),
    DeleteRide(RideId),
    ToggleBookings(RideId),
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::CancelRide(_) | Action::CancelBooking(_) => "Cancel",
            Action::TogglePassengers(_) => "Passengers",
            Action::MarkCompleted(_) => "Reached",
            Action::OpenBooking(_) => "Book",
            Action::ToggleRatingForm(_) => "Rate Driver",
            Action::ViewDriver(_) => "View Details",
            Action::DeleteUser(_) | Action::DeleteRide(_) => "Delete",
            Action::ToggleBookings(_) => "View Bookings",
        }
    }

    /// Whether the action changes server state and so must be confirmed.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Action::CancelRide(_)
                | Action::MarkCompleted(_)
                | Action::CancelBooking(_)
                | Action::DeleteUser(_)
                | Action::DeleteRide(_)
        )
    }

    /// Command-line form of the action, e.g. `cancel-ride 4`.
    pub fn command(&self) -> String {
        match self {
            Action::CancelRide(id) => format!("cancel-ride {id}"),
            Action::TogglePassengers(id) => format!("passengers {id}"),
            Action::MarkCompleted(id) => format!("complete {id}"),
            Action::OpenBooking(id) => format!("book {id} <seats>"),
            Action::CancelBooking(id) => format!("cancel-booking {id}"),
            Action::ToggleRatingForm(id) => format!("rate {id} <legroom> <cleanliness> <driving> <temperature> [review]"),
            Action::ViewDriver(id) => format!("driver {id}"),
            Action::DeleteUser(id) => format!("delete-user {id}"),
            Action::DeleteRide(id) => format!("delete-ride {id}"),
            Action::ToggleBookings(id) => format!("admin-bookings {id}"),
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
