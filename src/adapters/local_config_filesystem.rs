use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::ports::ConfigFilesystem;

/// Configuration filesystem backed by the local disk.
#[derive(Debug, Clone, Default)]
pub struct LocalConfigFilesystem;

impl LocalConfigFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigFilesystem for LocalConfigFilesystem {
    fn read_file(&self, path: &Path) -> Result<String, AppError> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_yaml_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if is_yaml && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
