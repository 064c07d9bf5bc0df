use crate::models::{AppData, DayRecord};

/// Date-keyed access to day records. Dates are ISO `YYYY-MM-DD` strings.
pub trait DayRepository {
    /// The record stored under `date`. Its `date` field always equals the key.
    fn get(&self, date: &str) -> Option<DayRecord>;

    fn put(&mut self, record: DayRecord);

    /// All stored dates, oldest first.
    fn dates(&self) -> Vec<String>;

    /// Returns the stored record, creating and storing a default one on first access.
    fn get_or_create(&mut self, date: &str) -> DayRecord {
        if let Some(record) = self.get(date) {
            return record;
        }
        let record = DayRecord::new(date);
        self.put(record.clone());
        record
    }
}

impl DayRepository for AppData {
    fn get(&self, date: &str) -> Option<DayRecord> {
        self.days.get(date).cloned().map(|mut record| {
            record.date = date.to_string();
            record
        })
    }

    fn put(&mut self, record: DayRecord) {
        self.days.insert(record.date.clone(), record);
    }

    fn dates(&self) -> Vec<String> {
        self.days.keys().cloned().collect()
    }
}
