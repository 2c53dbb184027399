//! Filesystem access for the jobqueue configuration search path.
//!
//! Paths are absolute; the port owns no layout knowledge beyond reading,
//! writing and listing files.

use std::path::{Path, PathBuf};

use crate::domain::AppError;

/// Port for configuration file I/O.
pub trait ConfigFilesystem {
    /// Read a file as UTF-8 text.
    fn read_file(&self, path: &Path) -> Result<String, AppError>;

    /// Write UTF-8 content to a file, creating parent directories as needed.
    fn write_file(&self, path: &Path, content: &str) -> Result<(), AppError>;

    /// Check whether a file exists.
    fn file_exists(&self, path: &Path) -> bool;

    /// List `*.yaml` and `*.yml` files directly inside `dir`, sorted by name.
    /// A missing directory yields an empty list.
    fn list_yaml_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError>;
}
