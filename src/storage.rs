//! Report Storage
//!
//! Where rendered summaries are written. The engine only produces text.

use log::info;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistence for rendered reports
pub trait Storage: Send + Sync {
    fn write(&self, path: &Path, text: &str) -> Result<(), StorageError>;
}

/// Filesystem storage; relative paths resolve against an optional base dir
#[derive(Debug, Clone, Default)]
pub struct FileStorage {
    base_dir: Option<PathBuf>,
}

impl FileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Path a report will actually be written to
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Storage for FileStorage {
    fn write(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        let path = self.resolve(path);
        let to_error = |source| StorageError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_error)?;
        }
        std::fs::write(&path, text).map_err(to_error)?;

        info!("Saved report to {:?}", path);
        Ok(())
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, path: &Path) -> Option<String> {
        self.files.read().get(path).cloned()
    }
}

impl Storage for MemoryStorage {
    fn write(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        self.files.write().insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new().with_base_dir(dir.path());

        storage.write(Path::new("reports/france_italy.txt"), "france vs italy\n").unwrap();

        let written = std::fs::read_to_string(dir.path().join("reports/france_italy.txt")).unwrap();
        assert_eq!(written, "france vs italy\n");
    }

    #[test]
    fn test_absolute_paths_ignore_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("summary.txt");
        let storage = FileStorage::new().with_base_dir("/somewhere/else");
        assert_eq!(storage.resolve(&absolute), absolute);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.write(Path::new("a.txt"), "hello").unwrap();
        assert_eq!(storage.read(Path::new("a.txt")).as_deref(), Some("hello"));
        assert!(storage.read(Path::new("b.txt")).is_none());
    }
}
