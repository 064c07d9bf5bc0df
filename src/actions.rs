//! Mutations on a single day's record, run against any [`DayRepository`].
//!
//! Each action loads (or creates) the record for `date`, applies the change and
//! stores the whole record back. Callers decide when to persist.

use crate::errors::AppError;
use crate::models::{DEFAULT_GLUCOSE_TAG, DayRecord, GlucoseReading, ScheduleRequest, Slot};
use crate::store::DayRepository;
use crate::time::normalize_hhmm;

pub fn toggle_slot(repo: &mut impl DayRepository, date: &str, slot: Slot, now_hhmm: &str) -> DayRecord {
    let mut record = repo.get_or_create(date);
    record.meds.slot_mut(slot).toggle(now_hhmm);
    repo.put(record.clone());
    record
}

pub fn add_glucose(
    repo: &mut impl DayRepository,
    date: &str,
    value: f64,
    tag: Option<&str>,
    note: Option<&str>,
    now_hhmm: &str,
) -> Result<DayRecord, AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::bad_request("glucose value must be a positive number"));
    }

    let tag = tag
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(DEFAULT_GLUCOSE_TAG);
    let note = note.map(str::trim).unwrap_or_default();

    let mut record = repo.get_or_create(date);
    record.glucose.push(GlucoseReading {
        value,
        time: now_hhmm.to_string(),
        tag: tag.to_string(),
        note: note.to_string(),
    });
    repo.put(record.clone());
    Ok(record)
}

pub fn save_notes(repo: &mut impl DayRepository, date: &str, notes: &str) -> DayRecord {
    let mut record = repo.get_or_create(date);
    record.notes = notes.to_string();
    repo.put(record.clone());
    record
}

/// Blank targets keep the current value; a non-blank target that isn't `HH:MM` rejects the whole save.
pub fn save_schedule(
    repo: &mut impl DayRepository,
    date: &str,
    request: &ScheduleRequest,
) -> Result<DayRecord, AppError> {
    let morning = parse_target(
        request.morning_target.as_deref(),
        "Morning target must be HH:MM (ex: 08:00)",
    )?;
    let evening = parse_target(
        request.evening_target.as_deref(),
        "Evening target must be HH:MM (ex: 20:00)",
    )?;

    let mut record = repo.get_or_create(date);
    if let Some(target) = morning {
        record.schedule.morning_target = Some(target);
    }
    if let Some(target) = evening {
        record.schedule.evening_target = Some(target);
    }
    repo.put(record.clone());
    Ok(record)
}

fn parse_target(raw: Option<&str>, message: &str) -> Result<Option<String>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => normalize_hhmm(value)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(message)),
    }
}

pub fn toggle_reminder(repo: &mut impl DayRepository, date: &str, slot: Slot) -> DayRecord {
    let mut record = repo.get_or_create(date);
    let enabled = record.schedule.reminder_mut(slot);
    *enabled = !*enabled;
    repo.put(record.clone());
    record
}
