use crate::app::config_bootstrap::{self, ConfigEnv};
use crate::domain::{AppError, ConfigStore, Priority};
use crate::ports::{ConfigFilesystem, JobSubmitter};

/// Application context holding dependencies for command execution.
pub struct AppContext<F: ConfigFilesystem, S: JobSubmitter> {
    filesystem: F,
    submitter: S,
    env: ConfigEnv,
}

impl<F: ConfigFilesystem, S: JobSubmitter> AppContext<F, S> {
    /// Create a new application context.
    pub fn new(filesystem: F, submitter: S, env: ConfigEnv) -> Self {
        Self { filesystem, submitter, env }
    }

    /// Get a reference to the configuration filesystem.
    pub fn filesystem(&self) -> &F {
        &self.filesystem
    }

    /// Get a reference to the job submitter.
    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn env(&self) -> &ConfigEnv {
        &self.env
    }

    /// Bootstrap the jobqueue configuration visible to this context.
    pub fn load_config(&self) -> Result<ConfigStore, AppError> {
        config_bootstrap::bootstrap(&self.filesystem, &self.env, Priority::Old)
    }
}
