//! Whole-document JSON persistence.
//!
//! Every operation works on a complete document: reads parse the full file,
//! writes replace it. Paths must carry a `.json` extension. There is no
//! cross-process locking; concurrent writers race and the last write wins.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error};

use super::StoreError;

/// Reject any path that does not end in `.json` before touching the disk.
pub fn ensure_json_path(path: &Path) -> Result<(), StoreError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(()),
        _ => Err(StoreError::InvalidPath(path.display().to_string())),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `data` as pretty-printed JSON (2-space indent) and replace the
/// file at `path`, creating parent directories first.
pub async fn save<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    ensure_json_path(path)?;
    let body = serde_json::to_vec_pretty(data)?;
    let res = write_document(path, &body).await;
    match &res {
        Ok(()) => debug!(path = %path.display(), bytes = body.len(), "json document saved"),
        Err(e) => error!(path = %path.display(), error = %e, "error saving json document"),
    }
    res
}

async fn write_document(path: &Path, body: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|e| StoreError::io(parent, e))?;
        }
    }
    // Write beside the target and rename over it so a crash mid-write never
    // leaves a truncated document behind.
    let staging = staging_path(path);
    fs::write(&staging, body).await.map_err(|e| StoreError::io(&staging, e))?;
    if let Err(e) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(StoreError::io(path, e));
    }
    Ok(())
}

/// Load and parse the document at `path`.
///
/// Returns `default` when the file does not exist, and `default` with a
/// logged error when the content is not JSON at all. Valid JSON that does not
/// fit `T` is [`StoreError::Schema`]; any other read failure is
/// [`StoreError::Io`]. Neither case yields a default a caller could write back.
pub async fn load<T: DeserializeOwned>(path: &Path, default: T) -> Result<T, StoreError> {
    ensure_json_path(path)?;
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "json document missing; using default");
            return Ok(default);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "error loading json document");
            return Err(StoreError::io(path, e));
        }
    };
    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            error!(path = %path.display(), error = %e, "malformed json document; using default");
            return Ok(default);
        }
    };
    serde_json::from_value(value).map_err(|e| {
        error!(path = %path.display(), error = %e, "json document does not match the expected shape");
        StoreError::schema(path, e)
    })
}

/// Shallow merge: keys of `updates` override keys of `existing` when both are
/// objects; otherwise `updates` replaces `existing` wholesale.
pub fn merge_shallow(existing: Value, updates: Value) -> Value {
    match (existing, updates) {
        (Value::Object(mut base), Value::Object(changes)) => {
            for (key, value) in changes {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, updates) => updates,
    }
}

/// Load the existing document (default `{}`), merge or replace it with
/// `updates`, save, and return what was written.
pub async fn update(path: &Path, updates: Value, merge: bool) -> Result<Value, StoreError> {
    let data = if merge {
        let existing = load(path, Value::Object(Map::new())).await?;
        merge_shallow(existing, updates)
    } else {
        ensure_json_path(path)?;
        updates
    };
    save(path, &data).await?;
    Ok(data)
}

/// Remove the document; a file that is already gone counts as success.
pub async fn delete(path: &Path) -> Result<(), StoreError> {
    ensure_json_path(path)?;
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            error!(path = %path.display(), error = %e, "error deleting json document");
            Err(StoreError::io(path, e))
        }
    }
}

/// Whether a `.json` document exists at `path`.
pub async fn exists(path: &Path) -> bool {
    ensure_json_path(path).is_ok() && fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
