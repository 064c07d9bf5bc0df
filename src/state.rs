use crate::errors::AppError;
use crate::models::{AppData, DayRecord};
use crate::storage::persist_data;
use crate::store::DayRepository;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Copy of the record for `date`, created (and persisted) on first access.
    pub async fn record(&self, date: &str) -> Result<DayRecord, AppError> {
        let mut data = self.data.lock().await;
        if let Some(record) = data.get(date) {
            return Ok(record);
        }
        let record = data.get_or_create(date);
        persist_data(&self.data_path, &data).await?;
        Ok(record)
    }

    /// Runs `apply` under the store lock and persists the whole store before releasing it.
    pub async fn update<T>(
        &self,
        apply: impl FnOnce(&mut AppData) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut data = self.data.lock().await;
        let out = apply(&mut *data)?;
        persist_data(&self.data_path, &data).await?;
        Ok(out)
    }
}
