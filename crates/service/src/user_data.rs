//! Free-form user data document, stored as-is.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::errors::ServiceError;
use crate::storage::json_file;

pub struct UserDataStore {
    file_path: PathBuf,
}

impl UserDataStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        json_file::ensure_json_path(&file_path)?;
        Ok(Self { file_path })
    }

    pub async fn save(&self, data: &Value) -> Result<(), ServiceError> {
        Ok(json_file::save(&self.file_path, data).await?)
    }

    /// Stored document, `{}` when none exists yet.
    pub async fn load(&self) -> Result<Value, ServiceError> {
        Ok(json_file::load(&self.file_path, Value::Object(Map::new())).await?)
    }

    /// Shallow-merge `updates` into the stored document.
    pub async fn update(&self, updates: Value) -> Result<Value, ServiceError> {
        Ok(json_file::update(&self.file_path, updates, true).await?)
    }

    pub async fn delete(&self) -> Result<(), ServiceError> {
        Ok(json_file::delete(&self.file_path).await?)
    }

    pub async fn exists(&self) -> bool {
        json_file::exists(&self.file_path).await
    }
}
