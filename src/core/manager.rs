use std::path::{Path, PathBuf};

use crate::domain::book::ShiftBook;
use crate::errors::{EngineError, Result};
use crate::storage::{BackupInfo, StorageBackend};

/// Facade that coordinates book state, persistence, and backups.
pub struct BookManager {
    pub current: Option<ShiftBook>,
    current_name: Option<String>,
    storage: Box<dyn StorageBackend>,
}

impl BookManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn load(&mut self, name: &str) -> Result<()> {
        let book = self.storage.load(name)?;
        self.current = Some(book);
        self.current_name = Some(name.to_string());
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        let name = self
            .current_name
            .clone()
            .ok_or_else(|| EngineError::Persistence("current book is unnamed".into()))?;
        let snapshot = self
            .current
            .clone()
            .ok_or_else(|| EngineError::Persistence("no book loaded".into()))?;
        self.storage.save(&snapshot, &name)
    }

    pub fn save_as(&mut self, name: &str) -> Result<()> {
        let snapshot = self
            .current
            .clone()
            .ok_or_else(|| EngineError::Persistence("no book loaded".into()))?;
        self.storage.save(&snapshot, name)?;
        self.current_name = Some(name.to_string());
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        let name = self
            .current_name
            .as_deref()
            .ok_or_else(|| EngineError::Persistence("current book is unnamed".into()))?;
        let book = self
            .current
            .as_ref()
            .ok_or_else(|| EngineError::Persistence("no book loaded".into()))?;
        self.storage.backup(book, name, note)
    }

    pub fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        self.storage.list_backups(name)
    }

    pub fn restore(&mut self, name: &str, backup: &Path) -> Result<()> {
        let book = self.storage.restore(name, backup)?;
        self.current = Some(book);
        self.current_name = Some(name.to_string());
        Ok(())
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.storage.book_path(name)
    }

    pub fn last_opened(&self) -> Result<Option<String>> {
        self.storage.last_book()
    }

    pub fn record_last_opened(&self, name: Option<&str>) -> Result<()> {
        self.storage.record_last_book(name)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn set_current(&mut self, book: ShiftBook, name: Option<String>) {
        self.current = Some(book);
        self.current_name = name;
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonStorage;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_named_roundtrip() {
        let temp = tempdir().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let mut manager = BookManager::new(Box::new(store));

        manager.set_current(ShiftBook::new("Demo"), None);
        manager.save_as("demo-book").expect("save book");
        assert!(manager.book_path("demo-book").exists());

        manager.clear();
        manager.load("demo-book").expect("load book");
        assert_eq!(manager.current_name(), Some("demo-book"));
        assert_eq!(manager.current.as_ref().unwrap().name, "Demo");
    }

    #[test]
    fn backup_uses_timestamped_names() {
        let temp = tempdir().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let mut manager = BookManager::new(Box::new(store));
        manager.set_current(ShiftBook::new("Club"), None);
        manager.save_as("club-book").unwrap();

        let backup = manager.backup(Some("Quarter Close")).expect("create backup");
        let file_name = backup.file_name().and_then(|name| name.to_str()).unwrap();
        assert!(file_name.starts_with("club-book_"));
        assert!(file_name.ends_with(".json"));
        assert!(file_name.contains("quarter-close"));
    }

    #[test]
    fn save_without_name_fails() {
        let temp = tempdir().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), None).unwrap();
        let mut manager = BookManager::new(Box::new(store));
        manager.set_current(ShiftBook::new("Anon"), None);
        let err = manager.save().expect_err("unnamed save must fail");
        assert!(matches!(err, EngineError::Persistence(_)));
    }
}
