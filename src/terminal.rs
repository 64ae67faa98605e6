//! Plain-text front-end for the booking view.

use crate::{
    booking_view::{BookingState, NoticeKind},
    calendar::{self, CalendarProjection, CalendarView, EmptyWindowAction},
    types::SlotStatus,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Write;

lazy_static! {
    static ref SELECT: Regex = Regex::new(r"^select\s+(\d+)$").expect("static pattern");
    static ref NAME: Regex = Regex::new(r"^name\s+(.+)$").expect("static pattern");
    static ref EMAIL: Regex = Regex::new(r"^email\s+(\S+)$").expect("static pattern");
    static ref CONTACT: Regex =
        Regex::new(r"^contact\s+(.+?)\s*\|\s*(.+)$").expect("static pattern");
}

pub const HELP: &str = "\
Commands:
  next | prev              move one week forward or back
  week | month             switch the calendar view
  select <n>               pick slot number <n>
  name <full name>         set your name
  email <address>          set your email
  book                     book the selected slot
  contact <subject> | <message>
                           send a message instead of booking
  retry                    reload available slots
  debug                    run diagnostic requests
  dismiss                  hide the current notice
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NextWeek,
    PreviousWeek,
    View(CalendarView),
    Select(usize),
    Name(String),
    Email(String),
    Book,
    Contact { subject: String, message: String },
    Retry,
    Diagnostics,
    Dismiss,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let command = match line {
        "next" => Command::NextWeek,
        "prev" => Command::PreviousWeek,
        "week" => Command::View(CalendarView::Week),
        "month" => Command::View(CalendarView::Month),
        "book" => Command::Book,
        "retry" => Command::Retry,
        "debug" => Command::Diagnostics,
        "dismiss" => Command::Dismiss,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => {
            if let Some(captures) = SELECT.captures(line) {
                let number: usize = captures[1].parse().ok()?;
                Command::Select(number.checked_sub(1)?)
            } else if let Some(captures) = NAME.captures(line) {
                Command::Name(captures[1].to_string())
            } else if let Some(captures) = EMAIL.captures(line) {
                Command::Email(captures[1].to_string())
            } else if let Some(captures) = CONTACT.captures(line) {
                Command::Contact {
                    subject: captures[1].to_string(),
                    message: captures[2].to_string(),
                }
            } else {
                return None;
            }
        }
    };
    Some(command)
}

pub fn render(
    state: &BookingState,
    projection: &CalendarProjection,
    empty_actions: &[EmptyWindowAction],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== {} ===", calendar::title(state.pivot));
    if state.loading {
        let _ = writeln!(out, "Loading available slots...");
    }

    let mut number = 1;
    for day in &projection.days {
        let today = if day.is_today { " (today)" } else { "" };
        let _ = writeln!(out, "{} {}{}", day.weekday, day.day_of_month, today);
        for slot in &day.slots {
            let marker = if state.selection.is_selected(slot) {
                "*"
            } else {
                match slot.status() {
                    SlotStatus::Available => " ",
                    SlotStatus::Booked => "x",
                    SlotStatus::Unavailable => "-",
                }
            };
            let _ = writeln!(out, "  [{number:>2}]{marker} {}", slot.time);
            number += 1;
        }
    }

    if projection.is_empty() && !state.loading {
        let _ = writeln!(out, "No available slots were found for the selected week.");
        let actions: Vec<&str> = empty_actions
            .iter()
            .map(|action| match action {
                EmptyWindowAction::Retry => "retry",
                EmptyWindowAction::ViewMonth => "month",
                EmptyWindowAction::Diagnostics => "debug",
            })
            .collect();
        let _ = writeln!(out, "Try: {}", actions.join(", "));
    }

    if let Some(selected) = state.selection.selected() {
        let _ = writeln!(out, "Selected: {}", selected.display);
        let contact = &state.selection.contact;
        let _ = writeln!(out, "Name: {}  Email: {}", contact.name, contact.email);
    }
    if state.submitting {
        let _ = writeln!(out, "Processing...");
    }

    if let Some(notice) = &state.notice {
        let level = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Warning => "warning",
            NoticeKind::Error | NoticeKind::Timeout => "error",
        };
        let _ = writeln!(out, "[{level}] {}: {}", notice.title, notice.message);
        if notice.offers_retry {
            let _ = writeln!(out, "Type 'retry' to load the slots again.");
        }
    }
    out
}
