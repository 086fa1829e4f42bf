use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::{ArchiveError, ArchiveResult};

pub async fn exists(path: &Path) -> ArchiveResult<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| ArchiveError::io(path, e))
}

/// Read and parse a JSON file.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> ArchiveResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ArchiveError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Read a JSON file, or `None` when it does not exist yet.
pub async fn read_json_opt<T: DeserializeOwned>(path: &Path) -> ArchiveResult<Option<T>> {
    if !exists(path).await? {
        return Ok(None);
    }
    read_json(path).await.map(Some)
}

/// Write pretty-printed JSON (two-space indent), creating parent directories.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ArchiveResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_bytes(path, json.as_bytes()).await
}

pub async fn write_bytes(path: &Path, bytes: &[u8]) -> ArchiveResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ArchiveError::io(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| ArchiveError::io(path, e))
}
