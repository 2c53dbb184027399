//! Test double for `ConfigFilesystem`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::ports::ConfigFilesystem;

/// In-memory configuration files keyed by absolute path.
#[derive(Debug, Default)]
pub struct MemoryConfigFilesystem {
    files: RefCell<BTreeMap<PathBuf, String>>,
    read_only: bool,
}

impl MemoryConfigFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write with a permission error.
    pub fn read_only(self) -> Self {
        Self { read_only: true, ..self }
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: &str) {
        self.files.borrow_mut().insert(path.into(), content.to_string());
    }
}

impl ConfigFilesystem for MemoryConfigFilesystem {
    fn read_file(&self, path: &Path) -> Result<String, AppError> {
        self.files.borrow().get(path).cloned().ok_or_else(|| {
            AppError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "Mock file not found"))
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), AppError> {
        if self.read_only {
            return Err(AppError::from(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "Mock filesystem is read-only",
            )));
        }
        self.insert(path, content);
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn list_yaml_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter(|path| {
                matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml" | "yml"))
            })
            .cloned()
            .collect())
    }
}
