use crate::errors::AppError;
use crate::models::GymData;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> GymData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                GymData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => GymData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            GymData::default()
        }
    }
}

/// Writes a sibling temp file, then renames it over `path`.
pub async fn persist_data(path: &Path, data: &GymData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, payload).await.map_err(AppError::internal)?;
    fs::rename(&tmp_path, path).await.map_err(AppError::internal)?;
    Ok(())
}
