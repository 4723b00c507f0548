use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use spdlog::info;

use crate::text_utils::format_post_date;

/// Bookable half-hour slots. The gap around lunch is intentional.
pub const TIME_SLOTS: [&str; 15] = [
    "09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM",
    "11:00 AM", "11:30 AM", "12:00 PM", "12:30 PM",
    "02:00 PM", "02:30 PM", "03:00 PM", "03:30 PM",
    "04:00 PM", "04:30 PM", "05:00 PM",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeetingLength {
    Min15,
    Min30,
}

impl MeetingLength {
    pub fn minutes(&self) -> u32 {
        match self {
            MeetingLength::Min15 => 15,
            MeetingLength::Min30 => 30,
        }
    }
}

impl FromStr for MeetingLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15" => Ok(MeetingLength::Min15),
            "30" => Ok(MeetingLength::Min30),
            other => Err(format!("Unknown meeting length {}", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Duration,
    DateTime,
    Details,
    Confirmed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub company: String,
    pub agenda: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub length: MeetingLength,
    pub date: NaiveDate,
    pub time: String,
    pub details: ContactDetails,
}

/// The scheduling collaborator behind the confirmation screen. The default
/// deployment has no real calendar integration: bookings are logged and
/// acknowledged.
pub trait BookingBackend {
    fn book(&self, booking: &Booking) -> Result<(), String>;
}

pub struct LoggedBooking;

impl BookingBackend for LoggedBooking {
    fn book(&self, booking: &Booking) -> Result<(), String> {
        info!("Meeting booked: {} min on {} at {} for {} <{}>",
            booking.length.minutes(),
            format_post_date(&booking.date),
            booking.time,
            booking.details.name,
            booking.details.email);
        Ok(())
    }
}

pub fn is_bookable_date(date: &NaiveDate, today: &NaiveDate) -> Result<(), String> {
    if date < today {
        return Err("Past dates cannot be booked".to_string());
    }
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => Err("Meetings are booked on weekdays only".to_string()),
        _ => Ok(()),
    }
}

pub fn is_valid_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}

/// Four steps, strictly linear: Duration -> DateTime -> Details ->
/// Confirmed. Each setter only works on its own step, each gate blocks
/// advancing until its selections exist, and Confirmed is terminal.
pub struct Wizard {
    step: Step,
    length: Option<MeetingLength>,
    date: Option<NaiveDate>,
    time: Option<String>,
    details: ContactDetails,
}

impl Wizard {
    pub fn new() -> Wizard {
        Wizard {
            step: Step::Duration,
            length: None,
            date: None,
            time: None,
            details: ContactDetails::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn select_length(&mut self, length: MeetingLength) -> Result<(), String> {
        self.expect_step(Step::Duration)?;
        self.length = Some(length);
        Ok(())
    }

    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), String> {
        self.expect_step(Step::DateTime)?;
        is_bookable_date(&date, &today)?;
        self.date = Some(date);
        Ok(())
    }

    pub fn select_time(&mut self, slot: &str) -> Result<(), String> {
        self.expect_step(Step::DateTime)?;
        if self.date.is_none() {
            return Err("Select a date before picking a time".to_string());
        }
        if !is_valid_slot(slot) {
            return Err(format!("{} is not an available slot", slot));
        }
        self.time = Some(slot.to_string());
        Ok(())
    }

    pub fn set_details(&mut self, details: ContactDetails) -> Result<(), String> {
        self.expect_step(Step::Details)?;
        self.details = details;
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Step, String> {
        let next = match self.step {
            Step::Duration => {
                if self.length.is_none() {
                    return Err("Choose a meeting duration first".to_string());
                }
                Step::DateTime
            }
            Step::DateTime => {
                if self.date.is_none() || self.time.is_none() {
                    return Err("Choose a date and a time first".to_string());
                }
                Step::Details
            }
            Step::Details => return Err("Submit the meeting details to finish".to_string()),
            Step::Confirmed => return Err("The meeting is already scheduled".to_string()),
        };

        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<Step, String> {
        let prev = match self.step {
            Step::Duration => return Err("Already at the first step".to_string()),
            Step::DateTime => Step::Duration,
            Step::Details => Step::DateTime,
            Step::Confirmed => return Err("The meeting is already scheduled".to_string()),
        };

        self.step = prev;
        Ok(prev)
    }

    pub fn submit(&mut self, backend: &dyn BookingBackend) -> Result<Booking, String> {
        self.expect_step(Step::Details)?;

        if self.details.name.trim().is_empty() || self.details.email.trim().is_empty() {
            return Err("Name and email are required".to_string());
        }

        let booking = Booking {
            length: self.length.ok_or("Missing meeting duration")?,
            date: self.date.ok_or("Missing meeting date")?,
            time: self.time.clone().ok_or("Missing meeting time")?,
            details: self.details.clone(),
        };

        backend.book(&booking)?;
        self.step = Step::Confirmed;
        Ok(booking)
    }

    fn expect_step(&self, step: Step) -> Result<(), String> {
        if self.step == step {
            Ok(())
        } else {
            Err(format!("Not available on the {:?} step", self.step))
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}
