use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::core::utils::{app_data_dir, backups_root_in, books_dir_in, ensure_dir, state_file_in};
use crate::domain::book::{ShiftBook, CURRENT_SCHEMA_VERSION};
use crate::errors::{EngineError, Result};
use crate::storage::{BackupInfo, StorageBackend};

use serde::{Deserialize, Serialize};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-per-book JSON persistence under the application data directory.
#[derive(Clone)]
pub struct JsonStorage {
    books_dir: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let base = root.unwrap_or_else(app_data_dir);
        ensure_dir(&base)?;
        let books_dir = books_dir_in(&base);
        let backups_dir = backups_root_in(&base);
        ensure_dir(&books_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            books_dir,
            backups_dir,
            state_file: state_file_in(&base),
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn read_state(&self) -> Result<StoreState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(StoreState::default())
        }
    }

    fn prune_backups(&self, dir: &Path) -> Result<()> {
        let mut backups = list_backup_files(dir)?;
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for stale in backups.iter().skip(self.retention) {
            fs::remove_file(&stale.path)?;
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, book: &ShiftBook, name: &str) -> Result<()> {
        ensure_dir(&self.books_dir)?;
        save_book_to_path(book, &self.book_path(name))
    }

    fn load(&self, name: &str) -> Result<ShiftBook> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(EngineError::Persistence(format!(
                "book `{name}` not found at {}",
                path.display()
            )));
        }
        load_book_from_path(&path)
    }

    fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.json", canonical_name(name)))
    }

    fn backup(&self, book: &ShiftBook, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let mut file_name = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_note(note) {
            file_name.push('_');
            file_name.push_str(&label);
        }
        file_name.push_str(".json");
        let path = dir.join(file_name);
        save_book_to_path(book, &path)?;
        self.prune_backups(&dir)?;
        Ok(path)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut backups = list_backup_files(&dir)?;
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(backups)
    }

    fn restore(&self, name: &str, backup: &Path) -> Result<ShiftBook> {
        let book = load_book_from_path(backup)?;
        self.save(&book, name)?;
        Ok(book)
    }

    fn last_book(&self) -> Result<Option<String>> {
        Ok(self.read_state()?.last_book)
    }

    fn record_last_book(&self, name: Option<&str>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_book = name.map(canonical_name);
        let data = serde_json::to_string_pretty(&state)?;
        write_atomic(&self.state_file, &data)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    last_book: Option<String>,
}

/// Serializes a book to pretty JSON at `path` via a tmp file + rename.
pub fn save_book_to_path(book: &ShiftBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(book)?;
    write_atomic(path, &json)
}

/// Reads a book from `path`, rejecting data written by a newer schema.
pub fn load_book_from_path(path: &Path) -> Result<ShiftBook> {
    let data = fs::read_to_string(path)?;
    let book: ShiftBook = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(EngineError::Persistence(format!(
            "book schema v{} is newer than supported v{}",
            book.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(book)
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let tmp = path.with_extension(TMP_SUFFIX);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn list_backup_files(dir: &Path) -> Result<Vec<BackupInfo>> {
    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        backups.push(BackupInfo {
            path,
            created_at: DateTime::<Utc>::from(modified),
        });
    }
    Ok(backups)
}

fn canonical_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "book".to_string()
    } else {
        cleaned
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let note = note?.trim();
    if note.is_empty() {
        return None;
    }
    let slug: String = note
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
