use crate::history::date_key;
use crate::models::DayRecord;
use crate::reminders::{due_reminders, reminder_text};
use crate::state::AppState;
use crate::status::{Status, evaluate};
use crate::store::DayRepository;
use crate::time::minutes_now;
use chrono::Local;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// What the previous tick saw, so each tick only reports changes.
#[derive(Debug, Default)]
pub struct TickState {
    last_minute: Option<u16>,
    last_status: Option<Status>,
}

#[derive(Debug, PartialEq)]
pub struct TickOutcome {
    pub status: Status,
    pub status_changed: bool,
    pub reminders: Vec<&'static str>,
}

impl TickState {
    /// Re-derives the status of `data`'s record for `date` at minute `now`.
    pub fn tick(&mut self, data: &impl DayRepository, date: &str, now: u16) -> TickOutcome {
        let record = data.get(date).unwrap_or_else(|| DayRecord::new(date));
        let status = evaluate(&record, now);
        let status_changed = self.last_status.as_ref() != Some(&status);

        let reminders = match self.last_minute {
            Some(last) if last != now => due_reminders(&record.schedule, last, now)
                .into_iter()
                .map(reminder_text)
                .collect(),
            _ => Vec::new(),
        };

        self.last_minute = Some(now);
        self.last_status = Some(status.clone());
        TickOutcome {
            status,
            status_changed,
            reminders,
        }
    }
}

pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        let mut tick_state = TickState::default();
        loop {
            interval.tick().await;
            let date = date_key(Local::now().date_naive());
            let outcome = {
                let data = state.data.lock().await;
                tick_state.tick(&*data, &date, minutes_now())
            };
            if outcome.status_changed {
                info!(
                    %date,
                    mode = outcome.status.mode.as_str(),
                    message = %outcome.status.message,
                    "status"
                );
            }
            for text in outcome.reminders {
                warn!(%date, "reminder: {text}");
            }
        }
    })
}
