//! Files embedded in the binary: packaged jobqueue defaults and the submit template.

use include_dir::{Dir, include_dir};

use crate::domain::config::paths::CONFIG_FILE;
use crate::domain::{AppError, ConfigStore};

static ASSETS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets");

const JOB_TEMPLATE: &str = "condor_job.sub.j2";

pub fn asset_content(path: &str) -> Result<&'static str, AppError> {
    ASSETS_DIR
        .get_file(path)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| AppError::config_error(format!("Missing packaged asset: {}", path)))
}

/// Text of the packaged `jobqueue-cern.yaml`.
pub fn default_config() -> Result<&'static str, AppError> {
    asset_content(CONFIG_FILE)
}

/// Packaged defaults parsed into a store.
pub fn default_config_store() -> Result<ConfigStore, AppError> {
    ConfigStore::from_yaml_str(default_config()?)
}

/// minijinja source of the HTCondor submit description.
pub fn job_template() -> Result<&'static str, AppError> {
    asset_content(JOB_TEMPLATE)
}
