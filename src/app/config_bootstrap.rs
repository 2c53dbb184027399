//! Two-phase jobqueue configuration setup: ensure the packaged defaults file
//! exists in the user directory, then load the search path and merge the
//! packaged defaults underneath it.

use std::path::PathBuf;
use std::sync::OnceLock;

use serde_yaml::Value;

use crate::adapters::LocalConfigFilesystem;
use crate::adapters::assets;
use crate::domain::config::paths;
use crate::domain::{AppError, ConfigStore, Priority};
use crate::ports::ConfigFilesystem;

static GLOBAL_CONFIG: OnceLock<ConfigStore> = OnceLock::new();

/// Environment inputs to configuration loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    /// `$DASK_CONFIG`
    pub dask_config: Option<String>,
    /// `$HOME`
    pub home: Option<String>,
    /// Every other `DASK_*` variable, used as dotted-path overrides.
    pub overrides: Vec<(String, String)>,
}

impl ConfigEnv {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I: IntoIterator<Item = (String, String)>>(vars: I) -> Self {
        let mut env = ConfigEnv::default();
        for (name, value) in vars {
            match name.as_str() {
                "DASK_CONFIG" => env.dask_config = Some(value),
                "HOME" => env.home = Some(value),
                "DASK_ROOT_CONFIG" => {}
                _ if name.starts_with("DASK_") => env.overrides.push((name, value)),
                _ => {}
            }
        }
        env.overrides.sort();
        env
    }

    pub fn user_config_dir(&self) -> Option<PathBuf> {
        paths::user_config_dir(self.dask_config.as_deref(), self.home.as_deref())
    }
}

/// Write the packaged `jobqueue-cern.yaml` into the user directory unless a
/// file is already there. Returns the path when a file was written.
///
/// Write failures are logged and swallowed; a read-only home must not stop
/// clusters from being built.
pub fn ensure_user_config_file<F: ConfigFilesystem>(
    fs: &F,
    env: &ConfigEnv,
) -> Result<Option<PathBuf>, AppError> {
    let Some(user_dir) = env.user_config_dir() else {
        tracing::debug!("no user config directory; skipping packaged config file");
        return Ok(None);
    };
    let path = paths::user_config_file(&user_dir);
    if fs.file_exists(&path) {
        return Ok(None);
    }

    match fs.write_file(&path, assets::default_config()?) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "wrote packaged jobqueue config");
            Ok(Some(path))
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "could not write packaged config");
            Ok(None)
        }
    }
}

/// Load YAML files from the search path and apply `DASK_*` overrides.
pub fn load_config<F: ConfigFilesystem>(fs: &F, env: &ConfigEnv) -> Result<ConfigStore, AppError> {
    let user_dir = env.user_config_dir();
    let mut store = ConfigStore::new();

    for dir in paths::search_path(user_dir.as_deref()) {
        for file in fs.list_yaml_files(&dir)? {
            let content = fs.read_file(&file)?;
            let layer = ConfigStore::from_yaml_str(&content).map_err(|err| AppError::ParseError {
                what: file.display().to_string(),
                details: err.to_string(),
            })?;
            tracing::debug!(path = %file.display(), "loaded jobqueue config");
            store.update_from(&layer, Priority::New);
        }
    }

    apply_env_overrides(&mut store, &env.overrides);
    Ok(store)
}

/// `DASK_JOBQUEUE__CERN__CORES=8` sets `jobqueue.cern.cores` to `8`.
pub fn apply_env_overrides(store: &mut ConfigStore, overrides: &[(String, String)]) {
    for (name, raw) in overrides {
        let Some(rest) = name.strip_prefix("DASK_") else {
            continue;
        };
        let path = rest.to_lowercase().split("__").collect::<Vec<_>>().join(".");
        if path.is_empty() {
            continue;
        }
        let value = match serde_yaml::from_str::<Value>(raw) {
            Ok(value) if !raw.trim().is_empty() => value,
            _ => Value::String(raw.clone()),
        };
        store.set(&path, value);
    }
}

/// Ensure, load and merge the packaged defaults with the given priority.
pub fn bootstrap<F: ConfigFilesystem>(
    fs: &F,
    env: &ConfigEnv,
    priority: Priority,
) -> Result<ConfigStore, AppError> {
    ensure_user_config_file(fs, env)?;
    let mut store = load_config(fs, env)?;
    store.update_from(&assets::default_config_store()?, priority);
    Ok(store)
}

/// Process-wide configuration, initialized on first call and read-only after.
///
/// Later calls return the existing store regardless of `priority`.
pub fn setup(priority: Priority) -> Result<&'static ConfigStore, AppError> {
    if let Some(store) = GLOBAL_CONFIG.get() {
        return Ok(store);
    }
    let store = bootstrap(&LocalConfigFilesystem::new(), &ConfigEnv::from_process(), priority)?;
    Ok(GLOBAL_CONFIG.get_or_init(|| store))
}
