use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Directory name appended to the platform data dir when none is configured.
pub const APP_DIR_NAME: &str = "EmuDock";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8787, worker_threads: Some(2) }
    }
}

/// Location of the application-private data directory and the table files in it.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Empty means "use the platform data directory".
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_library_file")]
    pub library_file: String,
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
    #[serde(default = "default_user_data_file")]
    pub user_data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            users_file: default_users_file(),
            library_file: default_library_file(),
            settings_file: default_settings_file(),
            user_data_file: default_user_data_file(),
        }
    }
}

fn default_users_file() -> String { "users.json".into() }
fn default_library_file() -> String { "games.json".into() }
fn default_settings_file() -> String { "settings.json".into() }
fn default_user_data_file() -> String { "user_data.json".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { format: default_log_format() } }
}

fn default_log_format() -> String { "compact".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(2),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Host-supplied data directory wins over the file; otherwise fall back to
    /// the platform data dir.
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("EMUDOCK_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if self.data_dir.as_os_str().is_empty() {
            self.data_dir = dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from("data"));
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, file) in [
            ("storage.users_file", &self.users_file),
            ("storage.library_file", &self.library_file),
            ("storage.settings_file", &self.settings_file),
            ("storage.user_data_file", &self.user_data_file),
        ] {
            if !file.ends_with(".json") {
                return Err(anyhow!("{name} must end with .json (got {file:?})"));
            }
            if Path::new(file).components().count() != 1 {
                return Err(anyhow!("{name} must be a bare file name (got {file:?})"));
            }
        }
        Ok(())
    }

    pub fn users_path(&self) -> PathBuf { self.data_dir.join(&self.users_file) }
    pub fn library_path(&self) -> PathBuf { self.data_dir.join(&self.library_file) }
    pub fn settings_path(&self) -> PathBuf { self.data_dir.join(&self.settings_file) }
    pub fn user_data_path(&self) -> PathBuf { self.data_dir.join(&self.user_data_file) }
}
