//! Inspect and initialize the jobqueue configuration.

use std::path::PathBuf;

use serde_yaml::Value;

use crate::app::AppContext;
use crate::app::config_bootstrap;
use crate::domain::config::paths;
use crate::domain::{AppError, PROFILE};
use crate::ports::{ConfigFilesystem, JobSubmitter};

/// Result of ensuring the user config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created(PathBuf),
    AlreadyPresent(PathBuf),
    /// No writable user directory could be determined.
    Unavailable,
}

/// Location of the user `jobqueue-cern.yaml`.
pub fn path<F, S>(ctx: &AppContext<F, S>) -> Option<PathBuf>
where
    F: ConfigFilesystem,
    S: JobSubmitter,
{
    ctx.env().user_config_dir().map(|dir| paths::user_config_file(&dir))
}

pub fn ensure<F, S>(ctx: &AppContext<F, S>) -> Result<EnsureOutcome, AppError>
where
    F: ConfigFilesystem,
    S: JobSubmitter,
{
    let Some(target) = path(ctx) else {
        return Ok(EnsureOutcome::Unavailable);
    };
    if ctx.filesystem().file_exists(&target) {
        return Ok(EnsureOutcome::AlreadyPresent(target));
    }
    match config_bootstrap::ensure_user_config_file(ctx.filesystem(), ctx.env())? {
        Some(written) => Ok(EnsureOutcome::Created(written)),
        None => Ok(EnsureOutcome::Unavailable),
    }
}

/// The effective `jobqueue.cern` section after bootstrap.
pub fn show<F, S>(ctx: &AppContext<F, S>) -> Result<Value, AppError>
where
    F: ConfigFilesystem,
    S: JobSubmitter,
{
    let config = ctx.load_config()?;
    Ok(config.get(&format!("jobqueue.{}", PROFILE)).cloned().unwrap_or(Value::Null))
}
