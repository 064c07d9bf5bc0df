use crate::errors::AppError;
use crate::models::{AppData, DayRecord};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

#[derive(Deserialize)]
struct RawStore {
    #[serde(default)]
    days: BTreeMap<String, Value>,
}

/// Records that parsed, plus the dates whose records did not.
#[derive(Debug, Default)]
pub struct ParsedStore {
    pub data: AppData,
    pub dropped: Vec<String>,
}

/// Parses each day on its own so one unreadable record doesn't take the rest down.
/// A record's date always follows the key it is stored under.
pub fn parse_store(bytes: &[u8]) -> Result<ParsedStore, serde_json::Error> {
    let raw: RawStore = serde_json::from_slice(bytes)?;
    let mut parsed = ParsedStore::default();
    for (date, value) in raw.days {
        match serde_json::from_value::<DayRecord>(value) {
            Ok(mut record) => {
                record.date = date.clone();
                parsed.data.days.insert(date, record);
            }
            Err(err) => {
                warn!(%date, "skipping unreadable day record: {err}");
                parsed.dropped.push(date);
            }
        }
    }
    Ok(parsed)
}

/// Sibling path the original file is kept at when it can't be fully loaded.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("steadyday.json"));
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Loads the store. Anything that can't be read back is preserved next to the data
/// file before the first save rewrites it; failing to preserve it is an error.
pub async fn load_data(path: &Path) -> io::Result<AppData> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AppData::default()),
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            return Err(err);
        }
    };

    match parse_store(&bytes) {
        Ok(parsed) if parsed.dropped.is_empty() => Ok(parsed.data),
        Ok(parsed) => {
            let backup = backup_path(path);
            fs::copy(path, &backup).await?;
            error!(
                path = %path.display(),
                backup = %backup.display(),
                dropped = ?parsed.dropped,
                "some day records could not be read; original kept"
            );
            Ok(parsed.data)
        }
        Err(err) => {
            let backup = backup_path(path);
            fs::rename(path, &backup).await?;
            error!(
                path = %path.display(),
                backup = %backup.display(),
                "failed to parse data file, starting empty: {err}"
            );
            Ok(AppData::default())
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DayRepository;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("steady_day_{}_{name}.json", std::process::id()));
        path
    }

    async fn cleanup(path: &Path) {
        let _ = fs::remove_file(path).await;
        let _ = fs::remove_file(backup_path(path)).await;
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let data = load_data(&temp_path("missing")).await.unwrap();
        assert!(data.days.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();

        let data = load_data(&path).await.unwrap();
        assert!(data.days.is_empty());
        assert!(fs::metadata(&path).await.is_err());
        assert_eq!(fs::read(backup_path(&path)).await.unwrap(), b"{not json");
        cleanup(&path).await;
    }

    #[tokio::test]
    async fn reading_without_time_keeps_every_day() {
        let path = temp_path("partial_reading");
        let raw = r#"{"days":{
            "2026-01-04":{"date":"2026-01-04","notes":"good day"},
            "2026-01-05":{"date":"2026-01-05","glucose":[{"value":110}]}
        }}"#;
        fs::write(&path, raw).await.unwrap();

        let data = load_data(&path).await.unwrap();
        assert_eq!(data.days.len(), 2);
        assert_eq!(data.get("2026-01-04").unwrap().notes, "good day");
        assert_eq!(data.get("2026-01-05").unwrap().glucose[0].value, 110.0);
        assert!(fs::metadata(backup_path(&path)).await.is_err());
        cleanup(&path).await;
    }

    #[tokio::test]
    async fn unreadable_day_is_dropped_and_original_kept() {
        let path = temp_path("bad_day");
        let raw = r#"{"days":{
            "2026-01-04":{"notes":"keep me"},
            "2026-01-05":{"meds":{"morning":{"taken":"yes"}}}
        }}"#;
        fs::write(&path, raw).await.unwrap();

        let data = load_data(&path).await.unwrap();
        assert_eq!(data.dates(), ["2026-01-04"]);
        assert_eq!(data.get("2026-01-04").unwrap().date, "2026-01-04");
        assert_eq!(
            fs::read_to_string(backup_path(&path)).await.unwrap(),
            raw
        );
        cleanup(&path).await;
    }

    #[test]
    fn record_date_follows_key() {
        let raw = br#"{"days":{"2026-01-05":{"date":"2026-01-04"}}}"#;
        let parsed = parse_store(raw).unwrap();
        assert_eq!(parsed.data.days["2026-01-05"].date, "2026-01-05");
    }

    #[tokio::test]
    async fn persisted_records_load_back() {
        let path = temp_path("persist");
        let mut data = AppData::default();
        let mut record = DayRecord::new("2026-01-05");
        record.meds.morning.toggle("08:02");
        data.put(record.clone());

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await.unwrap();
        assert_eq!(loaded.get("2026-01-05"), Some(record));
        cleanup(&path).await;
    }
}
