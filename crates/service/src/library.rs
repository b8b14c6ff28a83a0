use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::errors::ServiceError;
use crate::storage::json_file;

/// ROM file extensions the library accepts (lowercase, without the dot).
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["gb", "gbc", "gba", "zip"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Platform {
    #[serde(rename = "GB")]
    GameBoy,
    #[serde(rename = "GBC")]
    GameBoyColor,
    #[serde(rename = "GBA")]
    GameBoyAdvance,
    Unknown,
}

impl Platform {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "gb" => Platform::GameBoy,
            "gbc" => Platform::GameBoyColor,
            "gba" => Platform::GameBoyAdvance,
            _ => Platform::Unknown,
        }
    }
}

/// Entry id. New entries get a UUID; libraries written by earlier releases
/// carry numeric ids, which are kept as they are.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GameId {
    Uuid(Uuid),
    Legacy(Number),
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::Uuid(id) => id.fmt(f),
            GameId::Legacy(n) => n.fmt(f),
        }
    }
}

/// One library entry as stored in the games document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameEntry {
    pub id: GameId,
    pub title: String,
    pub platform: Platform,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
    /// Keys this build does not know about are kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for adding a game; id and date are generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub title: String,
    pub platform: Platform,
    pub file_path: String,
    #[serde(default)]
    pub note: String,
}

impl NewGame {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.title.trim().is_empty() {
            return Err(ServiceError::Validation("title must not be empty".into()));
        }
        if self.file_path.trim().is_empty() {
            return Err(ServiceError::Validation("filePath must not be empty".into()));
        }
        Ok(())
    }

    /// Build an import candidate from a ROM path; `None` for unsupported files.
    pub fn from_rom_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        let title = path.file_stem()?.to_string_lossy().into_owned();
        Some(Self {
            title,
            platform: Platform::from_extension(&ext),
            file_path: path.to_string_lossy().into_owned(),
            note: String::new(),
        })
    }

    fn into_entry(self) -> GameEntry {
        GameEntry {
            id: GameId::Uuid(Uuid::new_v4()),
            title: self.title,
            platform: self.platform,
            file_path: self.file_path,
            note: self.note,
            added_date: Some(Utc::now()),
            extra: Map::new(),
        }
    }
}

/// Game library persisted as a JSON array document.
pub struct GameLibrary {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl GameLibrary {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        json_file::ensure_json_path(&file_path)?;
        Ok(Self { file_path, write_lock: Mutex::new(()) })
    }

    /// All entries; empty when the document is absent or not JSON. A document
    /// that is JSON but not an entry list is an error, so nothing overwrites it.
    pub async fn list(&self) -> Result<Vec<GameEntry>, ServiceError> {
        Ok(json_file::load(&self.file_path, Vec::new()).await?)
    }

    /// Replace the whole library.
    pub async fn save_all(&self, entries: &[GameEntry]) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        json_file::save(&self.file_path, entries).await?;
        Ok(())
    }

    pub async fn add(&self, input: NewGame) -> Result<GameEntry, ServiceError> {
        input.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut games = self.list().await?;
        let entry = input.into_entry();
        games.push(entry.clone());
        json_file::save(&self.file_path, &games).await?;
        info!(id = %entry.id, title = %entry.title, "game_added");
        Ok(entry)
    }

    pub async fn remove(&self, id: &GameId) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut games = self.list().await?;
        let before = games.len();
        games.retain(|g| &g.id != id);
        if games.len() == before {
            return Err(ServiceError::not_found("game"));
        }
        json_file::save(&self.file_path, &games).await?;
        info!(%id, "game_removed");
        Ok(())
    }

    /// Import ROM files by path. Unsupported extensions and paths already in
    /// the library are skipped. Returns the newly added entries.
    #[instrument(skip(self, paths), fields(candidates = paths.len()))]
    pub async fn import_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<GameEntry>, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut games = self.list().await?;
        let mut known: HashSet<String> = games.iter().map(|g| g.file_path.clone()).collect();

        let mut imported = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let Some(candidate) = NewGame::from_rom_path(path) else {
                debug!(path = %path.display(), "skipping unsupported file");
                continue;
            };
            if !known.insert(candidate.file_path.clone()) {
                debug!(path = %path.display(), "already in library");
                continue;
            }
            imported.push(candidate.into_entry());
        }

        if imported.is_empty() {
            info!("no new roms to import");
            return Ok(imported);
        }
        games.extend(imported.iter().cloned());
        json_file::save(&self.file_path, &games).await?;
        info!(count = imported.len(), "roms_imported");
        Ok(imported)
    }

    /// Walk `dir` recursively and import every accepted ROM file.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn scan_directory(&self, dir: &Path) -> Result<Vec<GameEntry>, ServiceError> {
        let files = self.rom_files_in(dir).await?;
        self.import_files(&files).await
    }

    /// Accepted ROM files under `dir`, without importing them.
    pub async fn rom_files_in(&self, dir: &Path) -> Result<Vec<PathBuf>, ServiceError> {
        if !tokio::fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(ServiceError::Validation(format!("{} is not a directory", dir.display())));
        }
        let root = dir.to_path_buf();
        tokio::task::spawn_blocking(move || collect_rom_files(&root))
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

fn collect_rom_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if NewGame::from_rom_path(entry.path()).is_some() {
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "skipping unreadable entry during rom scan"),
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDataDir;

    #[test]
    fn rom_path_mapping() {
        let gba = NewGame::from_rom_path(Path::new("/roms/Metroid Fusion.GBA")).expect("accepted");
        assert_eq!(gba.title, "Metroid Fusion");
        assert_eq!(gba.platform, Platform::GameBoyAdvance);

        let gb = NewGame::from_rom_path(Path::new("tetris.gb")).expect("accepted");
        assert_eq!(gb.platform, Platform::GameBoy);

        let gbc = NewGame::from_rom_path(Path::new("zelda.dx.gbc")).expect("accepted");
        assert_eq!(gbc.title, "zelda.dx");
        assert_eq!(gbc.platform, Platform::GameBoyColor);

        let zip = NewGame::from_rom_path(Path::new("bundle.zip")).expect("accepted");
        assert_eq!(zip.platform, Platform::Unknown);

        assert!(NewGame::from_rom_path(Path::new("readme.txt")).is_none());
        assert!(NewGame::from_rom_path(Path::new("no_extension")).is_none());
    }

    #[test]
    fn platform_serializes_short_names() {
        assert_eq!(serde_json::to_value(Platform::GameBoyColor).unwrap(), serde_json::json!("GBC"));
        assert_eq!(serde_json::to_value(Platform::Unknown).unwrap(), serde_json::json!("Unknown"));
    }

    #[tokio::test]
    async fn library_crud_and_import() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("library_crud");
        let library = GameLibrary::new(dir.file("games.json"))?;
        assert!(library.list().await?.is_empty());

        let added = library
            .add(NewGame { title: "Tetris".into(), platform: Platform::GameBoy, file_path: "/roms/tetris.gb".into(), note: String::new() })
            .await?;

        let imported = library
            .import_files(&["/roms/tetris.gb", "/roms/pokemon.gbc", "/roms/cover.png", "/roms/advance.gba"])
            .await?;
        let titles: Vec<&str> = imported.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["pokemon", "advance"]);
        assert_eq!(library.list().await?.len(), 3);

        library.remove(&added.id).await?;
        assert_eq!(library.list().await?.len(), 2);
        assert!(matches!(library.remove(&added.id).await, Err(ServiceError::NotFound(_))));

        assert!(matches!(
            library.add(NewGame { title: " ".into(), platform: Platform::Unknown, file_path: "x.gb".into(), note: String::new() }).await,
            Err(ServiceError::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn empty_import_does_not_create_file() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("library_empty_import");
        let library = GameLibrary::new(dir.file("games.json"))?;
        let imported = library.import_files(&["notes.txt"]).await?;
        assert!(imported.is_empty());
        assert!(tokio::fs::metadata(dir.file("games.json")).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn scan_directory_finds_nested_roms() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("library_scan");
        let roms = dir.path.join("roms");
        tokio::fs::create_dir_all(roms.join("gba")).await?;
        tokio::fs::write(roms.join("a.gb"), b"rom").await?;
        tokio::fs::write(roms.join("gba").join("b.gba"), b"rom").await?;
        tokio::fs::write(roms.join("gba").join("b.sav"), b"save").await?;

        let library = GameLibrary::new(dir.file("games.json"))?;
        let imported = library.scan_directory(&roms).await?;
        assert_eq!(imported.len(), 2);

        // rescanning adds nothing
        assert!(library.scan_directory(&roms).await?.is_empty());

        assert!(matches!(library.scan_directory(&roms.join("a.gb")).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn save_all_replaces_library() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("library_save_all");
        let library = GameLibrary::new(dir.file("games.json"))?;
        library.import_files(&["one.gb", "two.gb"]).await?;

        let mut games = library.list().await?;
        games.truncate(1);
        library.save_all(&games).await?;
        assert_eq!(library.list().await?, games);
        Ok(())
    }

    #[tokio::test]
    async fn import_keeps_entries_from_earlier_releases() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("library_legacy");
        let path = dir.file("games.json");
        let legacy = serde_json::json!([
            {"id": 1717171717171.42, "title": "Pokemon Red", "platform": "GB",
             "filePath": "/roms/red.gb", "note": "", "addedDate": "2024-06-01T12:00:00.000Z"},
            {"id": 1, "title": "Metroid Fusion", "platform": "GBA", "note": "72% · Sector 5"}
        ]);
        json_file::save(&path, &legacy).await?;

        let library = GameLibrary::new(&path)?;
        assert_eq!(library.list().await?.len(), 2);

        let imported = library.import_files(&["/roms/blue.gb", "/roms/red.gb"]).await?;
        assert_eq!(imported.len(), 1);

        let raw: Value = json_file::load(&path, Value::Null).await?;
        let entries = raw.as_array().cloned().unwrap_or_default();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["id"], legacy[0]["id"]);
        assert_eq!(entries[0]["filePath"], "/roms/red.gb");
        assert_eq!(entries[1]["id"], 1);
        assert_eq!(entries[1]["note"], "72% · Sector 5");
        assert_eq!(entries[2]["title"], "blue");

        library.remove(&GameId::Legacy(Number::from(1u64))).await?;
        assert_eq!(library.list().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unexpected_document_blocks_writes() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("library_unexpected");
        let path = dir.file("games.json");
        let doc = serde_json::json!({"games": [{"title": "Tetris"}]});
        json_file::save(&path, &doc).await?;

        let library = GameLibrary::new(&path)?;
        assert!(matches!(library.list().await, Err(ServiceError::Storage(_))));
        assert!(matches!(library.import_files(&["/roms/blue.gb"]).await, Err(ServiceError::Storage(_))));
        assert_eq!(json_file::load::<Value>(&path, Value::Null).await?, doc);
        Ok(())
    }
}
