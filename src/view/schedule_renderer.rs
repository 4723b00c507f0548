use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::scheduler::{Booking, TIME_SLOTS};
use crate::text_utils::format_post_date;

#[derive(ramhorns::Content)]
struct SchedulePage {
    slots: Vec<SlotItem>,
}

#[derive(ramhorns::Content)]
struct SlotItem {
    time: String,
}

#[derive(ramhorns::Content)]
struct ConfirmedPage<'a> {
    minutes: u32,
    date: String,
    time: &'a str,
    name: &'a str,
    email: &'a str,
}

/// The booking form with its fixed slot grid.
pub struct ScheduleRenderer<'a> {
    template: Template<'a>,
}

impl ScheduleRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<ScheduleRenderer> {
        let template = match Template::new(tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing schedule template: {}", e)));
            }
        };

        Ok(ScheduleRenderer {
            template,
        })
    }

    pub fn render(&self) -> String {
        let slots = TIME_SLOTS.iter()
            .map(|slot| SlotItem { time: slot.to_string() })
            .collect();

        self.template.render(&SchedulePage { slots })
    }
}

/// The confirmation screen after a successful booking.
pub struct ConfirmationRenderer<'a> {
    template: Template<'a>,
}

impl ConfirmationRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<ConfirmationRenderer> {
        let template = match Template::new(tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing confirmation template: {}", e)));
            }
        };

        Ok(ConfirmationRenderer {
            template,
        })
    }

    pub fn render(&self, booking: &Booking) -> String {
        self.template.render(&ConfirmedPage {
            minutes: booking.length.minutes(),
            date: format_post_date(&booking.date),
            time: booking.time.as_str(),
            name: booking.details.name.as_str(),
            email: booking.details.email.as_str(),
        })
    }
}
