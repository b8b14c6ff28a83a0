use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::json_file;

/// Application preferences document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub emulator_path: String,
    #[serde(default)]
    pub rom_directory: String,
    #[serde(default = "default_auto_sync_saves")]
    pub auto_sync_saves: bool,
    /// Keys this build does not know about are kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_auto_sync_saves() -> bool { true }

impl Default for Settings {
    fn default() -> Self {
        Self {
            emulator_path: String::new(),
            rom_directory: String::new(),
            auto_sync_saves: default_auto_sync_saves(),
            extra: Map::new(),
        }
    }
}

pub struct SettingsStore {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        json_file::ensure_json_path(&file_path)?;
        Ok(Self { file_path, write_lock: Mutex::new(()) })
    }

    /// Stored settings with defaults filled in for missing keys.
    pub async fn load(&self) -> Result<Settings, ServiceError> {
        Ok(json_file::load(&self.file_path, Settings::default()).await?)
    }

    pub async fn save(&self, settings: &Settings) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        json_file::save(&self.file_path, settings).await?;
        Ok(())
    }

    /// Set one key. The merged document must still read as [`Settings`]
    /// (e.g. `autoSyncSaves` stays a boolean) or nothing is written.
    pub async fn update_setting(&self, key: &str, value: Value) -> Result<Settings, ServiceError> {
        if key.trim().is_empty() {
            return Err(ServiceError::Validation("setting key must not be empty".into()));
        }
        let _guard = self.write_lock.lock().await;
        let current = serde_json::to_value(self.load().await?).map_err(|e| ServiceError::Internal(e.to_string()))?;
        let mut change = Map::new();
        change.insert(key.to_string(), value);
        let merged = json_file::merge_shallow(current, Value::Object(change));

        let settings: Settings = serde_json::from_value(merged)
            .map_err(|e| ServiceError::Validation(format!("invalid value for {key}: {e}")))?;
        json_file::save(&self.file_path, &settings).await?;
        info!(key, "setting_updated");
        Ok(settings)
    }

    /// Point EmuDock at an emulator executable.
    pub async fn configure_emulator(&self, executable_path: &str) -> Result<Settings, ServiceError> {
        let trimmed = executable_path.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::Validation("executable path must be provided".into()));
        }
        self.update_setting("emulatorPath", Value::String(trimmed.to_string())).await
    }

    /// Configured emulator, `None` until one is set.
    pub async fn emulator_path(&self) -> Result<Option<String>, ServiceError> {
        let settings = self.load().await?;
        Ok(Some(settings.emulator_path).filter(|p| !p.is_empty()))
    }
}
