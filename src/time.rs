use chrono::{Local, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

static HHMM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid HH:MM pattern"));

/// A validated minute of the day in `0..=1439`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Parses `H:MM` or `HH:MM`, surrounding whitespace allowed. Anything else is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = HHMM.captures(input.trim())?;
        let hour: u16 = caps[1].parse().ok()?;
        let minute: u16 = caps[2].parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Canonical zero-padded `HH:MM`, or `None` when the input is not a valid time.
pub fn normalize_hhmm(input: &str) -> Option<String> {
    TimeOfDay::parse(input).map(|time| time.to_string())
}

pub fn time_to_minutes(input: &str) -> Option<u16> {
    TimeOfDay::parse(input).map(TimeOfDay::minutes)
}

/// Same as [`time_to_minutes`] for values that may be missing from a record.
pub fn optional_minutes(input: Option<&str>) -> Option<u16> {
    input.and_then(time_to_minutes)
}

pub fn minutes_now() -> u16 {
    let now = Local::now();
    (now.hour() * 60 + now.minute()) as u16
}

pub fn now_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}
