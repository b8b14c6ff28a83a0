#![cfg(test)]
use std::path::PathBuf;

use uuid::Uuid;

/// Unique scratch directory under the system temp dir; removed on drop.
pub struct TempDataDir {
    pub path: PathBuf,
}

impl TempDataDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{prefix}_{}", Uuid::new_v4()));
        Self { path }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
