//! Command-line surface of the `carpool` binary.
//!
//! Every command maps onto one page operation or row action.

use std::ffi::OsString;

use carpool_core::{BookingId, PostRideForm, RatingForm, RideId, Role, UserId};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use crate::route::Page;
use crate::views::auth::{LoginForm, SignupForm};
use crate::views::passenger::SearchForm;

#[derive(Parser, Debug)]
#[command(name = "carpool", author, version, about = "Share rides, book seats and rate drivers")]
pub struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    User,
    Driver,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Driver => Role::Driver,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Platform counters
    Home,
    Signup {
        name: String,
        phone: String,
        email: String,
        password: String,
        #[arg(value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Whoami,

    /// Your posted rides (driver)
    Rides,
    PostRide {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        dest: String,
        /// Departure, e.g. 2026-05-01T08:00
        #[arg(long)]
        depart: String,
        #[arg(long)]
        seats: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        safety: Option<String>,
        #[arg(long)]
        preferences: Option<String>,
    },
    Passengers { ride: RideId },
    Complete { ride: RideId },
    CancelRide { ride: RideId },

    Search {
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        dest: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    Book {
        ride: RideId,
        #[arg(default_value = "1")]
        seats: String,
    },
    Bookings,
    Rate {
        booking: BookingId,
        legroom: String,
        cleanliness: String,
        driving: String,
        temperature: String,
        #[arg(trailing_var_arg = true)]
        review: Vec<String>,
    },
    CancelBooking { booking: BookingId },
    /// Driver contact and vehicle for a ride
    Driver { ride: RideId },

    /// Counters, users and rides (admin)
    Admin,
    AdminBookings { ride: RideId },
    DeleteUser { user: UserId },
    DeleteRide { ride: RideId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Home,
    Signup(SignupForm),
    Login(LoginForm),
    Logout,
    Whoami,
    // driver
    Rides,
    PostRide(PostRideForm),
    Passengers(RideId),
    Complete(RideId),
    CancelRide(RideId),
    // passenger
    Search(SearchForm),
    Book { ride: RideId, seats: String },
    Bookings,
    Rate { booking: BookingId, form: RatingForm },
    CancelBooking(BookingId),
    Driver(RideId),
    // admin
    Admin,
    AdminBookings(RideId),
    DeleteUser(UserId),
    DeleteRide(RideId),
}

impl Command {
    /// Page whose route guard applies before the command runs.
    pub fn page(&self) -> Option<Page> {
        match self {
            Command::Help | Command::Logout | Command::Whoami => None,
            Command::Home => Some(Page::Index),
            Command::Signup(_) => Some(Page::Signup),
            Command::Login(_) => Some(Page::Login),
            Command::Rides
            | Command::PostRide(_)
            | Command::Passengers(_)
            | Command::Complete(_)
            | Command::CancelRide(_) => Some(Page::Driver),
            Command::Search(_)
            | Command::Book { .. }
            | Command::Bookings
            | Command::Rate { .. }
            | Command::CancelBooking(_)
            | Command::Driver(_) => Some(Page::User),
            Command::Admin
            | Command::AdminBookings(_)
            | Command::DeleteUser(_)
            | Command::DeleteRide(_) => Some(Page::Admin),
        }
    }
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Home => Command::Home,
            CliCommand::Signup {
                name,
                phone,
                email,
                password,
                role,
            } => Command::Signup(SignupForm {
                name,
                phone_number: phone,
                email,
                password,
                role: role.into(),
            }),
            CliCommand::Login { email, password } => Command::Login(LoginForm { email, password }),
            CliCommand::Logout => Command::Logout,
            CliCommand::Whoami => Command::Whoami,
            CliCommand::Rides => Command::Rides,
            CliCommand::PostRide {
                origin,
                dest,
                depart,
                seats,
                price,
                company,
                model,
                safety,
                preferences,
            } => Command::PostRide(PostRideForm {
                origin_name: origin,
                dest_name: dest,
                depart_time: depart,
                total_seats: seats.unwrap_or_default(),
                price_per_seat: price.unwrap_or_default(),
                vehicle_company: company.unwrap_or_default(),
                vehicle_model: model.unwrap_or_default(),
                vehicle_safety: safety.unwrap_or_default(),
                preferences: preferences.unwrap_or_default(),
            }),
            CliCommand::Passengers { ride } => Command::Passengers(ride),
            CliCommand::Complete { ride } => Command::Complete(ride),
            CliCommand::CancelRide { ride } => Command::CancelRide(ride),
            CliCommand::Search { origin, dest, date } => Command::Search(SearchForm {
                origin: origin.unwrap_or_default(),
                dest: dest.unwrap_or_default(),
                date: date.unwrap_or_default(),
            }),
            CliCommand::Book { ride, seats } => Command::Book { ride, seats },
            CliCommand::Bookings => Command::Bookings,
            CliCommand::Rate {
                booking,
                legroom,
                cleanliness,
                driving,
                temperature,
                review,
            } => Command::Rate {
                booking,
                form: RatingForm {
                    legroom,
                    cleanliness,
                    driving_smoothness: driving,
                    temperature_comfort: temperature,
                    description: review.join(" "),
                },
            },
            CliCommand::CancelBooking { booking } => Command::CancelBooking(booking),
            CliCommand::Driver { ride } => Command::Driver(ride),
            CliCommand::Admin => Command::Admin,
            CliCommand::AdminBookings { ride } => Command::AdminBookings(ride),
            CliCommand::DeleteUser { user } => Command::DeleteUser(user),
            CliCommand::DeleteRide { ride } => Command::DeleteRide(ride),
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `--yes`: skip confirmation prompts.
    pub yes: bool,
    pub command: Command,
}

impl From<Cli> for Invocation {
    fn from(cli: Cli) -> Self {
        Self {
            yes: cli.yes,
            command: cli.command.map_or(Command::Help, Command::from),
        }
    }
}

/// Parse a full argv, program name first.
pub fn parse<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map(Invocation::from)
}

/// Generated help text.
pub fn help() -> String {
    Cli::command().render_help().to_string()
}
