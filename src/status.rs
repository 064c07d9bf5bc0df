//! Status derivation for a single day.
//!
//! Everything here is a pure function of a [`DayRecord`] and the current minute
//! of the day. Missing or malformed times never fail; they just switch the
//! affected comparison off.

use crate::models::{DayRecord, Slot};
use crate::time::{normalize_hhmm, optional_minutes};
use serde::{Deserialize, Serialize};

/// Minutes before a target during which an untaken dose is "due soon".
pub const DUE_SOON_WINDOW: i32 = 30;
/// Minutes after a target before a dose counts as overdue or late.
pub const GRACE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMode {
    Ok,
    Due,
    Late,
}

impl StatusMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusMode::Ok => "ok",
            StatusMode::Due => "due",
            StatusMode::Late => "late",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub mode: StatusMode,
    pub message: String,
}

impl Status {
    fn new(mode: StatusMode, message: impl Into<String>) -> Self {
        Self {
            mode,
            message: message.into(),
        }
    }

    fn on_track() -> Self {
        Self::new(StatusMode::Ok, "On track")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotMark {
    None,
    Done,
    Late,
}

impl SlotMark {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotMark::None => "none",
            SlotMark::Done => "done",
            SlotMark::Late => "late",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub morning: SlotMark,
    pub evening: SlotMark,
}

/// One slot reduced to the numbers the rules compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFacts {
    pub taken: bool,
    pub target: Option<i32>,
    pub taken_at: Option<i32>,
    /// Canonical `HH:MM` of the taken time, when it parses.
    pub taken_hhmm: Option<String>,
}

impl SlotFacts {
    pub fn from_record(record: &DayRecord, slot: Slot) -> Self {
        let med = record.meds.slot(slot);
        let taken_hhmm = med.time.as_deref().and_then(normalize_hhmm);
        Self {
            taken: med.taken,
            target: optional_minutes(record.schedule.target(slot)).map(i32::from),
            taken_at: optional_minutes(taken_hhmm.as_deref()).map(i32::from),
            taken_hhmm,
        }
    }

    /// Minutes between target and taken time, when both are known.
    pub fn late_by(&self) -> Option<i32> {
        Some(self.taken_at? - self.target?)
    }

    fn was_late(&self) -> Option<i32> {
        self.late_by().filter(|diff| *diff > GRACE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFacts {
    pub morning: SlotFacts,
    pub evening: SlotFacts,
    pub now: i32,
}

impl DayFacts {
    pub fn new(record: &DayRecord, now: u16) -> Self {
        Self {
            morning: SlotFacts::from_record(record, Slot::Morning),
            evening: SlotFacts::from_record(record, Slot::Evening),
            now: i32::from(now),
        }
    }
}

pub type Rule = fn(&DayFacts) -> Option<Status>;

/// Headline rules in precedence order. The first rule returning `Some` wins.
pub const RULES: &[(&str, Rule)] = &[
    ("all-done", all_done),
    ("morning-pending", morning_pending),
    ("evening-after-morning", evening_after_morning),
    ("evening-pending", evening_pending),
];

pub fn evaluate(record: &DayRecord, now: u16) -> Status {
    let facts = DayFacts::new(record, now);
    RULES
        .iter()
        .find_map(|(_, rule)| rule(&facts))
        .unwrap_or_else(Status::on_track)
}

pub fn slot_mark(facts: &SlotFacts, now: i32) -> SlotMark {
    if facts.taken {
        return match facts.late_by() {
            Some(diff) if diff > GRACE => SlotMark::Late,
            _ => SlotMark::Done,
        };
    }
    match facts.target {
        Some(target) if now > target + GRACE => SlotMark::Late,
        _ => SlotMark::None,
    }
}

pub fn progress(record: &DayRecord, now: u16) -> Progress {
    let facts = DayFacts::new(record, now);
    Progress {
        morning: slot_mark(&facts.morning, facts.now),
        evening: slot_mark(&facts.evening, facts.now),
    }
}

fn pending(slot: Slot, target: i32, now: i32) -> Status {
    let label = slot.label();
    if now >= target + GRACE {
        Status::new(StatusMode::Late, format!("{label} overdue"))
    } else if now >= target - DUE_SOON_WINDOW {
        Status::new(StatusMode::Due, format!("{label} due soon"))
    } else {
        Status::on_track()
    }
}

/// Both doses taken. Evening lateness is reported ahead of morning lateness.
pub fn all_done(facts: &DayFacts) -> Option<Status> {
    if !(facts.morning.taken && facts.evening.taken) {
        return None;
    }
    if let Some(diff) = facts.evening.was_late() {
        return Some(Status::new(
            StatusMode::Late,
            format!("All done • Evening late by {diff}m"),
        ));
    }
    if let Some(diff) = facts.morning.was_late() {
        return Some(Status::new(
            StatusMode::Late,
            format!("All done • Morning late by {diff}m"),
        ));
    }
    Some(Status::new(StatusMode::Ok, "All done today"))
}

pub fn morning_pending(facts: &DayFacts) -> Option<Status> {
    if facts.morning.taken {
        return None;
    }
    let target = facts.morning.target?;
    Some(pending(Slot::Morning, target, facts.now))
}

/// Morning taken, evening still open. A late morning dose hides the evening
/// state until the evening dose is taken.
pub fn evening_after_morning(facts: &DayFacts) -> Option<Status> {
    if !facts.morning.taken || facts.evening.taken {
        return None;
    }
    if let Some(diff) = facts.morning.was_late() {
        let at = facts.morning.taken_hhmm.as_deref().unwrap_or_default();
        return Some(Status::new(
            StatusMode::Late,
            format!("Morning taken at {at} • Late by {diff}m"),
        ));
    }
    Some(match facts.evening.target {
        Some(target) => pending(Slot::Evening, target, facts.now),
        None => Status::on_track(),
    })
}

pub fn evening_pending(facts: &DayFacts) -> Option<Status> {
    if facts.evening.taken {
        return None;
    }
    let target = facts.evening.target?;
    Some(pending(Slot::Evening, target, facts.now))
}
