use crate::models::{DaySchedule, Slot};
use crate::time::{MINUTES_PER_DAY, optional_minutes, time_to_minutes};

pub fn reminder_text(slot: Slot) -> &'static str {
    match slot {
        Slot::Morning => "Time for your morning meds.",
        Slot::Evening => "Time for your evening meds.",
    }
}

/// Minutes from `now` until the next occurrence of `target`, rolling over to tomorrow
/// once today's target has passed. `0` means it fires this minute.
pub fn reminder_delay_minutes(target: &str, now: u16) -> Option<u32> {
    let target = i32::from(time_to_minutes(target)?);
    let mut delta = target - i32::from(now);
    if delta < 0 {
        delta += i32::from(MINUTES_PER_DAY);
    }
    u32::try_from(delta).ok()
}

/// Slots whose enabled reminder target falls in `(last_tick, now]`, wrapping past midnight.
pub fn due_reminders(schedule: &DaySchedule, last_tick: u16, now: u16) -> Vec<Slot> {
    Slot::ALL
        .into_iter()
        .filter(|slot| schedule.reminder(*slot))
        .filter(|slot| {
            optional_minutes(schedule.target(*slot))
                .is_some_and(|target| in_window(target, last_tick, now))
        })
        .collect()
}

fn in_window(target: u16, last_tick: u16, now: u16) -> bool {
    if now >= last_tick {
        target > last_tick && target <= now
    } else {
        target > last_tick || target <= now
    }
}
