//! Async JSON file helpers.
//!
//! Whole-object reads and atomic writes used by every JSON-backed store in
//! this crate. Writes go through a temp file plus rename so a crash never
//! leaves a half-written document.

use quill_core::{QuillError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// Reads a JSON document, producing `default()` when the file is missing.
pub async fn read_json_or<T, F>(path: &Path, default: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match fs::read_to_string(path).await {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default()),
        Err(e) => Err(e.into()),
    }
}

/// Writes a JSON document atomically (temp file + rename).
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| QuillError::io(format!("path has no parent: {}", path.display())))?;
    fs::create_dir_all(dir).await?;

    let tmp = path.with_extension("json.tmp");
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, raw).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// Removes a file, treating "already gone" as success.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let value: Vec<String> = read_json_or(&path, Vec::new).await.unwrap();
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        write_json_atomic(&path, &vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let value: Vec<String> = read_json_or(&path, Vec::new).await.unwrap();
        assert_eq!(value, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        remove_file_if_exists(&dir.path().join("gone.json"))
            .await
            .unwrap();
    }
}
