use crate::models::{MedicationSlot, Slot};
use crate::status::{Progress, progress};
use crate::store::DayRepository;
use crate::time::{MINUTES_PER_DAY, minutes_now};
use chrono::{Local, NaiveDate};
use serde::Serialize;

pub const HISTORY_DAYS: usize = 14;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub date: String,
    pub morning: String,
    pub evening: String,
    pub readings: usize,
    pub notes: String,
    pub progress: Progress,
}

pub fn build_history(data: &impl DayRepository) -> Vec<HistoryEntry> {
    build_history_at(data, Local::now().date_naive(), minutes_now())
}

/// Most recent days first, never past `today`. Days before today are judged as finished.
pub fn build_history_at(data: &impl DayRepository, today: NaiveDate, now: u16) -> Vec<HistoryEntry> {
    let today_key = date_key(today);
    data.dates()
        .into_iter()
        .rev()
        .filter(|date| *date <= today_key)
        .take(HISTORY_DAYS)
        .filter_map(|date| data.get(&date))
        .map(|record| {
            let at = if record.date == today_key {
                now
            } else {
                MINUTES_PER_DAY - 1
            };
            HistoryEntry {
                morning: slot_summary(record.meds.slot(Slot::Morning)),
                evening: slot_summary(record.meds.slot(Slot::Evening)),
                readings: record.glucose.len(),
                progress: progress(&record, at),
                notes: record.notes,
                date: record.date,
            }
        })
        .collect()
}

pub fn slot_summary(slot: &MedicationSlot) -> String {
    if slot.taken {
        format!("✓ {}", slot.time.as_deref().unwrap_or_default())
            .trim()
            .to_string()
    } else {
        "—".to_string()
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppData, DayRecord};
    use crate::status::SlotMark;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
    }

    #[test]
    fn empty_store_has_no_history() {
        assert!(build_history_at(&AppData::default(), today(), 600).is_empty());
    }

    #[test]
    fn caps_at_fourteen_newest_first() {
        let mut data = AppData::default();
        for offset in 0..20 {
            data.put(DayRecord::new(date_key(today() - Duration::days(offset))));
        }
        let history = build_history_at(&data, today(), 600);
        assert_eq!(history.len(), HISTORY_DAYS);
        assert_eq!(history[0].date, "2026-01-20");
        assert_eq!(history[13].date, "2026-01-07");
    }

    #[test]
    fn future_dates_are_skipped() {
        let mut data = AppData::default();
        data.put(DayRecord::new("2026-01-21"));
        data.put(DayRecord::new("2026-01-19"));
        let history = build_history_at(&data, today(), 600);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, "2026-01-19");
    }

    #[test]
    fn summaries_and_markers() {
        let mut data = AppData::default();
        let mut past = DayRecord::new("2026-01-19");
        past.meds.morning.toggle("08:05");
        past.notes = "dizzy".to_string();
        data.put(past);
        data.put(DayRecord::new("2026-01-20"));

        let history = build_history_at(&data, today(), 400);
        let current = &history[0];
        assert_eq!(current.morning, "—");
        assert_eq!(current.progress.morning, SlotMark::None);

        let past = &history[1];
        assert_eq!(past.morning, "✓ 08:05");
        assert_eq!(past.evening, "—");
        assert_eq!(past.notes, "dizzy");
        assert_eq!(past.progress.morning, SlotMark::Done);
        assert_eq!(past.progress.evening, SlotMark::Late);
    }

    #[test]
    fn taken_without_time_is_bare_check() {
        let slot = MedicationSlot {
            taken: true,
            time: None,
        };
        assert_eq!(slot_summary(&slot), "✓");
    }
}
