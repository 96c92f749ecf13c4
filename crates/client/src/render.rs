//! Plain-text rendering of screens and notices.

use core::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::app::Screen;
use crate::notify::Notice;
use crate::views::Panel;

pub const SAFEST_MARK: &str = "- the car is safest of available";

/// Column-aligned text table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain([self.headers.len()])
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for line in core::iter::once(&self.headers).chain(&self.rows) {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        write_row(f, &widths, &self.headers)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(f, &widths, &rule)?;
        for row in &self.rows {
            write_row(f, &widths, row)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut core::fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> core::fmt::Result {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        if i + 1 < widths.len() {
            line.push_str(&" ".repeat(width - cell.chars().count() + 2));
        }
    }
    writeln!(f, "{}", line.trim_end())
}

fn when(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn actions(list: &[crate::action::Action]) -> String {
    list.iter()
        .map(|a| format!("{} [{}]", a.label(), a.command()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// `[severity] message`
pub fn notice(notice: &Notice) -> String {
    format!("[{}] {}", notice.severity, notice.message)
}

pub fn screen(screen: &Screen) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_screen(&mut out, screen);
    out
}

fn write_screen(out: &mut String, screen: &Screen) -> core::fmt::Result {
    match screen {
        Screen::Help => writeln!(out, "{}", crate::cli::help()),
        Screen::Home(summary) => {
            let count = |n: Option<u64>| n.map_or_else(|| "Error".to_string(), |n| n.to_string());
            let counts = summary.counts;
            writeln!(out, "Users:    {}", count(counts.map(|c| c.total_users)))?;
            writeln!(out, "Rides:    {}", count(counts.map(|c| c.total_rides)))?;
            writeln!(out, "Bookings: {}", count(counts.map(|c| c.total_bookings)))
        }
        Screen::Redirect(page) => writeln!(out, "Redirected to the {page} page."),
        Screen::Landing(page) => writeln!(out, "Now on the {page} page."),
        Screen::Whoami(None) => writeln!(out, "Not logged in."),
        Screen::Whoami(Some(me)) => {
            writeln!(out, "{} <{}> ({}, id {})", me.name, me.email, me.role, me.id)
        }
        Screen::MyRides(rides) => {
            if rides.rows.is_empty() {
                return writeln!(out, "No rides posted yet.");
            }
            let mut table = Table::new([
                "Id", "Route", "Depart", "Vehicle", "Seats", "Price", "Booked", "Rating",
                "Status", "Actions",
            ]);
            for row in &rides.rows {
                let ride = &row.ride;
                let actions = match row.note {
                    Some(note) => note.to_string(),
                    None => row
                        .actions
                        .iter()
                        .map(|a| match a {
                            crate::action::Action::TogglePassengers(_) => {
                                format!("{} ({}) [{}]", a.label(), row.confirmed, a.command())
                            }
                            _ => format!("{} [{}]", a.label(), a.command()),
                        })
                        .collect::<Vec<_>>()
                        .join("; "),
                };
                table.row([
                    ride.id.to_string(),
                    ride.route_label(),
                    when(&ride.depart_time),
                    ride.vehicle_label(),
                    format!("{}/{}", ride.seats_available, ride.total_seats),
                    format!("{:.2}", ride.price_per_seat),
                    row.confirmed.to_string(),
                    row.rating.to_string(),
                    ride.status.to_string(),
                    actions,
                ]);
            }
            write!(out, "{table}")
        }
        Screen::Passengers(ride, panel) => match panel {
            Panel::Closed => writeln!(out, "Passengers of ride {ride} hidden."),
            Panel::Opened(rows) if rows.is_empty() => {
                writeln!(out, "No passengers booked yet.")
            }
            Panel::Opened(rows) => {
                let mut table = Table::new(["Name", "Email", "Seats", "Status", "Rating"]);
                for p in rows {
                    table.row([
                        p.name.clone(),
                        p.email.clone(),
                        p.seats.to_string(),
                        p.status.to_string(),
                        p.rating.clone(),
                    ]);
                }
                write!(out, "{table}")
            }
        },
        Screen::Search(results) => {
            if results.is_empty() {
                return Ok(());
            }
            let mut table = Table::new([
                "Id", "Route", "Depart", "Driver", "Vehicle", "Seats", "Price", "Action",
            ]);
            for result in results {
                let ride = &result.ride;
                let mut vehicle = ride.vehicle_label();
                if result.safest {
                    vehicle = format!("{vehicle} {SAFEST_MARK}");
                }
                let action = result.action();
                table.row([
                    ride.id.to_string(),
                    ride.route_label(),
                    when(&ride.depart_time),
                    ride.driver_name().to_string(),
                    vehicle,
                    ride.seats_available.to_string(),
                    format!("{:.2}", ride.price_per_seat),
                    format!("{} [{}]", action.label(), action.command()),
                ]);
            }
            write!(out, "{table}")
        }
        Screen::BookingPrompt(prompt) => {
            let ride = &prompt.ride;
            writeln!(out, "Route:          {}", ride.route_label())?;
            writeln!(out, "Departure:      {}", when(&ride.depart_time))?;
            writeln!(out, "Price per seat: {:.2}", ride.price_per_seat)?;
            writeln!(out, "Driver:         {}", ride.driver_name())?;
            writeln!(out, "Vehicle:        {}", ride.vehicle_label())?;
            let prefs = if ride.preferences.is_empty() {
                "None"
            } else {
                ride.preferences.as_str()
            };
            writeln!(out, "Preferences:    {prefs}")?;
            writeln!(out, "Seats available: {}", prompt.max_seats)
        }
        Screen::Booked(created, rows) => {
            writeln!(out, "Booking {} created.", created.booking_id)?;
            write_bookings(out, rows)
        }
        Screen::Bookings(rows) => write_bookings(out, rows),
        Screen::RatingForm { booking, open: true } => writeln!(
            out,
            "Rate booking {booking}: legroom, cleanliness, driving smoothness and temperature comfort (1-5), optional review up to 100 words."
        ),
        Screen::RatingForm { open: false, .. } => writeln!(out, "Rating form closed."),
        Screen::DriverDetails(d) => {
            writeln!(out, "Name:    {}", d.name)?;
            writeln!(out, "Email:   {}", d.email)?;
            writeln!(out, "Phone:   {}", d.phone_number)?;
            writeln!(out, "Vehicle: {}", d.vehicle)
        }
        Screen::Dashboard(dash) => {
            let c = dash.cards;
            writeln!(
                out,
                "Users: {}  Rides: {}  Bookings: {}  Cancellations: {}",
                c.users, c.rides, c.bookings, c.cancellations
            )?;
            writeln!(out)?;

            let mut users = Table::new(["Id", "Name", "Email", "Role", "Actions"]);
            for row in &dash.users {
                users.row([
                    row.user.id.to_string(),
                    row.user.first_name.clone(),
                    row.user.email.clone(),
                    row.user.role.to_string(),
                    actions(&row.actions),
                ]);
            }
            write!(out, "{users}")?;
            writeln!(out)?;

            let mut rides = Table::new([
                "Id", "Driver", "Route", "Depart", "Vehicle", "Seats", "Status", "Rating",
                "Actions",
            ]);
            for row in &dash.rides {
                let ride = &row.ride;
                rides.row([
                    ride.id.to_string(),
                    row.driver_name.clone(),
                    ride.route_label(),
                    when(&ride.depart_time),
                    ride.vehicle_label(),
                    format!("{}/{}", ride.seats_available, ride.total_seats),
                    ride.status.to_string(),
                    row.rating.to_string(),
                    actions(&row.actions),
                ]);
            }
            write!(out, "{rides}")
        }
        Screen::RideBookings(ride, panel) => match panel {
            Panel::Closed => writeln!(out, "Bookings of ride {ride} hidden."),
            Panel::Opened(rows) if rows.is_empty() => {
                writeln!(out, "No bookings found for this ride.")
            }
            Panel::Opened(rows) => {
                let mut table = Table::new(["Passenger Name", "Seats", "Status", "Rating/Review"]);
                for b in rows {
                    table.row([
                        b.passenger.clone(),
                        b.seats.to_string(),
                        b.status.to_string(),
                        b.review.clone(),
                    ]);
                }
                write!(out, "{table}")
            }
        },
    }
}

fn write_bookings(out: &mut String, rows: &[crate::views::passenger::BookingRow]) -> core::fmt::Result {
    if rows.is_empty() {
        return writeln!(out, "No bookings yet.");
    }
    let mut table = Table::new(["Id", "Ride", "When", "Seats", "Status", "Action"]);
    for row in rows {
        let (route, depart) = match &row.ride {
            Some(ride) => (ride.route_label(), when(&ride.depart_time)),
            None => (format!("ride {}", row.booking.ride), String::new()),
        };
        let mut action = actions(&row.actions);
        if let Some(note) = &row.note {
            action = format!("{note}; {action}");
        }
        table.row([
            row.booking.id.to_string(),
            route,
            depart,
            row.booking.seats_booked.to_string(),
            row.booking.status.to_string(),
            action,
        ]);
    }
    write!(out, "{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_columns_are_aligned() {
        let mut table = Table::new(["Name", "Seats"]);
        table.row(["Asha", "2"]).row(["Kiranmayi", "10"]);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name       Seats");
        assert_eq!(lines[1], "---------  -----");
        assert_eq!(lines[2], "Asha       2");
        assert_eq!(lines[3], "Kiranmayi  10");
    }

    #[test]
    fn home_shows_error_when_counts_failed() {
        let text = screen(&Screen::Home(crate::views::home::HomeSummary { counts: None }));
        assert_eq!(text.matches("Error").count(), 3);
    }
}
