use std::path::{Path, PathBuf};

/// Packaged default settings file name.
pub const CONFIG_FILE: &str = "jobqueue-cern.yaml";

/// System-wide configuration directory, read before the user directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/dask";

/// User configuration directory: `$DASK_CONFIG` when set, else `~/.config/dask`.
pub fn user_config_dir(dask_config: Option<&str>, home: Option<&str>) -> Option<PathBuf> {
    if let Some(dir) = dask_config.filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    home.filter(|home| !home.is_empty()).map(|home| Path::new(home).join(".config").join("dask"))
}

/// `<user config dir>/jobqueue-cern.yaml`
pub fn user_config_file(user_dir: &Path) -> PathBuf {
    user_dir.join(CONFIG_FILE)
}

/// Directories searched for YAML configuration, lowest precedence first.
pub fn search_path(user_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(SYSTEM_CONFIG_DIR)];
    if let Some(user_dir) = user_dir
        && user_dir != Path::new(SYSTEM_CONFIG_DIR)
    {
        dirs.push(user_dir.to_path_buf());
    }
    dirs
}
