pub mod json_backend;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::book::ShiftBook;
use crate::errors::Result;

/// Metadata describing one backup snapshot on disk.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Abstraction over persistence backends capable of storing books and
/// snapshots.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &ShiftBook, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<ShiftBook>;
    fn book_path(&self, name: &str) -> PathBuf;
    fn backup(&self, book: &ShiftBook, name: &str, note: Option<&str>) -> Result<PathBuf>;
    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>>;
    fn restore(&self, name: &str, backup: &Path) -> Result<ShiftBook>;
    fn last_book(&self) -> Result<Option<String>>;
    fn record_last_book(&self, name: Option<&str>) -> Result<()>;

    /// Optional helpers for ad-hoc file operations. Default implementations
    /// forward to the JSON codec when not overridden.
    fn save_to_path(&self, book: &ShiftBook, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<ShiftBook> {
        json_backend::load_book_from_path(path)
    }
}

pub use json_backend::JsonStorage;
