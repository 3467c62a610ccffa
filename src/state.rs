use crate::models::GymData;
use chrono::{Local, NaiveDate};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<GymData>>,
    /// Fixed "today" for the whole process, when configured.
    pub today_override: Option<NaiveDate>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: GymData, today_override: Option<NaiveDate>) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            today_override,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }
}
