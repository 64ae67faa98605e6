use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

lazy_static! {
    static ref CONTAINS_TEXT: Regex = Regex::new(r"\S").expect("static pattern");
}

/// When a slot starts, as written by the booking API.
///
/// Strings with an offset are absolute instants. Offset-less strings are
/// wall-clock times and are read in the viewer's zone. The raw text is kept
/// because the server matches bookings against the exact string it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime {
    raw: String,
    moment: Moment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Moment {
    Absolute(DateTime<FixedOffset>),
    WallClock(NaiveDateTime),
}

impl SlotTime {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let moment = DateTime::parse_from_rfc3339(raw)
            .map(Moment::Absolute)
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(Moment::WallClock)
            })
            .map_err(|err| format!("Invalid slot timestamp '{raw}': {err}"))?;
        Ok(Self {
            raw: raw.to_string(),
            moment,
        })
    }

    /// Wall-clock time of the slot as seen from `zone`.
    pub fn local_in<Tz: TimeZone>(&self, zone: &Tz) -> NaiveDateTime {
        match self.moment {
            Moment::Absolute(instant) => instant.with_timezone(zone).naive_local(),
            Moment::WallClock(naive) => naive,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self.moment {
            Moment::Absolute(instant) => Some(*instant.offset()),
            Moment::WallClock(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for SlotTime {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<SlotTime> for String {
    fn from(time: SlotTime) -> Self {
        time.raw
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub datetime: SlotTime,
    pub date: String,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub day_short: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub booked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Available,
    Booked,
    Unavailable,
}

impl Slot {
    /// A booked slot is never selectable, whatever `available` says.
    pub fn is_selectable(&self) -> bool {
        self.available && !self.booked
    }

    pub fn status(&self) -> SlotStatus {
        if self.booked {
            SlotStatus::Booked
        } else if self.available {
            SlotStatus::Available
        } else {
            SlotStatus::Unavailable
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    #[serde(default)]
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(regex(path = *CONTAINS_TEXT, message = "Please enter your name."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    pub datetime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(regex(path = *CONTAINS_TEXT, message = "Please enter your name."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(regex(path = *CONTAINS_TEXT, message = "Please enter a message."))]
    pub message: String,
}

impl ContactRequest {
    pub fn with_subject(name: String, email: String, subject: &str, body: &str) -> Self {
        Self {
            name,
            email,
            message: format!("Subject: {subject}\n\n{body}"),
        }
    }
}

/// Body of both successful and failed responses of the write endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
