//! Wiring of controllers, route guard and action dispatch.

use carpool_core::{BookingId, CreatedBooking, RideId, SessionIdentity};

use crate::action::Action;
use crate::cli::Command;
use crate::route::{Page, guard};
use crate::views::admin::{AdminBookingRow, Dashboard};
use crate::views::driver::{MyRides, PassengerRow};
use crate::views::home::HomeSummary;
use crate::views::passenger::{BookingPrompt, BookingRow, DriverDetails, SearchResult};
use crate::views::{AdminView, AuthView, Context, DriverView, HomeView, Panel, PassengerView};

/// What a handled command or action leaves on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Help,
    Home(HomeSummary),
    /// The guard sent the user elsewhere; the command did not run.
    Redirect(Page),
    /// Navigation after login, signup or logout.
    Landing(Page),
    Whoami(Option<SessionIdentity>),
    MyRides(MyRides),
    Passengers(RideId, Panel<Vec<PassengerRow>>),
    Search(Vec<SearchResult>),
    BookingPrompt(BookingPrompt),
    Booked(CreatedBooking, Vec<BookingRow>),
    Bookings(Vec<BookingRow>),
    RatingForm { booking: BookingId, open: bool },
    DriverDetails(DriverDetails),
    Dashboard(Dashboard),
    RideBookings(RideId, Panel<Vec<AdminBookingRow>>),
}

#[derive(Debug, Clone)]
pub struct App {
    ctx: Context,
    home: HomeView,
    auth: AuthView,
    driver: DriverView,
    passenger: PassengerView,
    admin: AdminView,
}

impl App {
    pub fn new(ctx: Context) -> Self {
        Self {
            home: HomeView::new(ctx.clone()),
            auth: AuthView::new(ctx.clone()),
            driver: DriverView::new(ctx.clone()),
            passenger: PassengerView::new(ctx.clone()),
            admin: AdminView::new(ctx.clone()),
            ctx,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Route a row action to the controller that owns it.
    pub async fn dispatch(&self, action: Action) -> Option<Screen> {
        tracing::debug!(?action, "dispatch");
        match action {
            Action::CancelRide(ride) => self.driver.cancel_ride(ride).await.map(Screen::MyRides),
            Action::MarkCompleted(ride) => {
                self.driver.mark_completed(ride).await.map(Screen::MyRides)
            }
            Action::TogglePassengers(ride) => self
                .driver
                .toggle_passengers(ride)
                .await
                .map(|panel| Screen::Passengers(ride, panel)),
            Action::OpenBooking(ride) => self
                .passenger
                .open_booking(ride)
                .await
                .map(Screen::BookingPrompt),
            Action::CancelBooking(booking) => self
                .passenger
                .cancel_booking(booking)
                .await
                .map(Screen::Bookings),
            Action::ToggleRatingForm(booking) => Some(Screen::RatingForm {
                booking,
                open: self.passenger.toggle_rating_form(booking),
            }),
            Action::ViewDriver(ride) => self
                .passenger
                .driver_details(ride)
                .await
                .map(Screen::DriverDetails),
            Action::DeleteUser(user) => self.admin.delete_user(user).await.map(Screen::Dashboard),
            Action::DeleteRide(ride) => self.admin.delete_ride(ride).await.map(Screen::Dashboard),
            Action::ToggleBookings(ride) => self
                .admin
                .toggle_bookings(ride)
                .await
                .map(|panel| Screen::RideBookings(ride, panel)),
        }
    }

    /// Run one command after checking the route guard of its page.
    pub async fn run(&self, command: Command) -> Option<Screen> {
        if let Some(page) = command.page() {
            let identity = self.ctx.session.current_user();
            if let Some(target) = guard(page, identity.as_ref()) {
                tracing::info!(from = %page, to = %target, "redirected by route guard");
                return Some(Screen::Redirect(target));
            }
        }

        match command {
            Command::Help => Some(Screen::Help),
            Command::Home => Some(Screen::Home(self.home.summary().await)),
            Command::Signup(form) => self.auth.signup(form).await.map(Screen::Landing),
            Command::Login(form) => self.auth.login(form).await.map(Screen::Landing),
            Command::Logout => Some(Screen::Landing(self.auth.logout())),
            Command::Whoami => Some(Screen::Whoami(self.ctx.session.current_user())),

            Command::Rides => self.driver.my_rides().await.map(Screen::MyRides),
            Command::PostRide(form) => self.driver.post_ride(form).await.map(Screen::MyRides),
            Command::Passengers(ride) => self.dispatch(Action::TogglePassengers(ride)).await,
            Command::Complete(ride) => self.dispatch(Action::MarkCompleted(ride)).await,
            Command::CancelRide(ride) => self.dispatch(Action::CancelRide(ride)).await,

            Command::Search(form) => self.passenger.search(form).await.map(Screen::Search),
            Command::Book { ride, seats } => {
                let created = self.passenger.book(ride, &seats).await?;
                let rows = self.passenger.my_bookings().await.unwrap_or_default();
                Some(Screen::Booked(created, rows))
            }
            Command::Bookings => self.passenger.my_bookings().await.map(Screen::Bookings),
            Command::Rate { booking, form } => {
                if !self.passenger.rating_form_open(booking) {
                    self.passenger.toggle_rating_form(booking);
                }
                self.passenger.submit_rating(booking, form).await?;
                self.passenger.my_bookings().await.map(Screen::Bookings)
            }
            Command::CancelBooking(booking) => self.dispatch(Action::CancelBooking(booking)).await,
            Command::Driver(ride) => self.dispatch(Action::ViewDriver(ride)).await,

            Command::Admin => self.admin.dashboard().await.map(Screen::Dashboard),
            Command::AdminBookings(ride) => self.dispatch(Action::ToggleBookings(ride)).await,
            Command::DeleteUser(user) => self.dispatch(Action::DeleteUser(user)).await,
            Command::DeleteRide(ride) => self.dispatch(Action::DeleteRide(ride)).await,
        }
    }
}
