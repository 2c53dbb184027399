//! API Facade for the application.
//!
//! This module exposes high-level functions that glue together context creation
//! and command execution against the local filesystem and `condor_submit`.

use std::path::PathBuf;

use serde_yaml::Value;

use crate::adapters::{CondorSubmitCommand, LocalConfigFilesystem};
use crate::app::config_bootstrap::ConfigEnv;
use crate::app::{
    AppContext,
    commands::{config, job_script, kwargs, submit},
};

pub use crate::app::commands::config::EnsureOutcome;
pub use crate::domain::{AppError, ClusterOptions, JobKwargs};

/// Create an `AppContext` from the process environment.
fn create_context() -> AppContext<LocalConfigFilesystem, CondorSubmitCommand> {
    AppContext::new(
        LocalConfigFilesystem::new(),
        CondorSubmitCommand::default(),
        ConfigEnv::from_process(),
    )
}

/// Render the HTCondor submit description for one worker job.
pub fn job_script(options: &ClusterOptions) -> Result<String, AppError> {
    job_script::execute(&create_context(), options)
}

/// Derive the keyword set the job builder receives.
pub fn kwargs(options: &ClusterOptions) -> Result<JobKwargs, AppError> {
    kwargs::execute(&create_context(), options)
}

/// Submit `jobs` worker jobs with `condor_submit`, returning their ids.
pub fn submit(options: &ClusterOptions, jobs: u32) -> Result<Vec<String>, AppError> {
    submit::execute(&create_context(), options, jobs)
}

// =============================================================================
// Config Command API
// =============================================================================

pub fn config_path() -> Option<PathBuf> {
    config::path(&create_context())
}

pub fn config_ensure() -> Result<EnsureOutcome, AppError> {
    config::ensure(&create_context())
}

/// Effective `jobqueue.cern` settings.
pub fn config_show() -> Result<Value, AppError> {
    config::show(&create_context())
}
