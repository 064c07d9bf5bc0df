use crate::history::HistoryEntry;
use crate::status::{Progress, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MORNING_TARGET: &str = "08:00";
pub const DEFAULT_EVENING_TARGET: &str = "20:00";
pub const DEFAULT_GLUCOSE_TAG: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Morning,
    Evening,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Morning, Slot::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Evening => "evening",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Morning => "Morning",
            Slot::Evening => "Evening",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "morning" => Ok(Slot::Morning),
            "evening" => Ok(Slot::Evening),
            other => Err(format!("unknown slot '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaySchedule {
    pub morning_target: Option<String>,
    pub evening_target: Option<String>,
    pub remind_morning: bool,
    pub remind_evening: bool,
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            morning_target: Some(DEFAULT_MORNING_TARGET.to_string()),
            evening_target: Some(DEFAULT_EVENING_TARGET.to_string()),
            remind_morning: false,
            remind_evening: false,
        }
    }
}

impl DaySchedule {
    pub fn target(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Morning => self.morning_target.as_deref(),
            Slot::Evening => self.evening_target.as_deref(),
        }
    }

    pub fn reminder(&self, slot: Slot) -> bool {
        match slot {
            Slot::Morning => self.remind_morning,
            Slot::Evening => self.remind_evening,
        }
    }

    pub fn reminder_mut(&mut self, slot: Slot) -> &mut bool {
        match slot {
            Slot::Morning => &mut self.remind_morning,
            Slot::Evening => &mut self.remind_evening,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationSlot {
    pub taken: bool,
    pub time: Option<String>,
}

impl MedicationSlot {
    /// Flips the slot, stamping `now` when it becomes taken and clearing it otherwise.
    pub fn toggle(&mut self, now: &str) {
        self.taken = !self.taken;
        self.time = self.taken.then(|| now.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meds {
    pub morning: MedicationSlot,
    pub evening: MedicationSlot,
}

impl Meds {
    pub fn slot(&self, slot: Slot) -> &MedicationSlot {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Evening => &self.evening,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut MedicationSlot {
        match slot {
            Slot::Morning => &mut self.morning,
            Slot::Evening => &mut self.evening,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlucoseReading {
    pub value: f64,
    pub time: String,
    pub tag: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayRecord {
    pub date: String,
    pub meds: Meds,
    pub glucose: Vec<GlucoseReading>,
    pub notes: String,
    pub schedule: DaySchedule,
}

impl DayRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub days: BTreeMap<String, DayRecord>,
}

#[derive(Debug, Deserialize)]
pub struct GlucoseRequest {
    pub value: f64,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub morning_target: Option<String>,
    pub evening_target: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub days: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub record: DayRecord,
    pub status: Status,
    pub progress: Progress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderResponse {
    pub slot: Slot,
    pub enabled: bool,
    pub fires_in_minutes: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub days: Vec<HistoryEntry>,
}
