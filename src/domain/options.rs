//! Keyword set handed to the HTCondor job builder, and the CERN-level options
//! that are translated into it.

use serde::{Deserialize, Serialize};

use crate::domain::{ContainerRuntime, Directives};

/// Job keywords in the shape the HTCondor job builder consumes.
///
/// Every field is optional; unset fields fall back to the jobqueue config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobKwargs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Interpreter the worker runs under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_directory: Option<String>,
    /// Raw submit directives; these override everything the job builder derives.
    #[serde(default, alias = "job_extra", skip_serializing_if = "Option::is_none")]
    pub job_extra_directives: Option<Directives>,
    /// Extra flags passed to `condor_submit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_command_extra: Option<Vec<String>>,
    #[serde(default, alias = "extra", skip_serializing_if = "Option::is_none")]
    pub worker_extra_args: Option<Vec<String>>,
    /// Shell lines run before the worker starts.
    #[serde(default, alias = "env_extra", skip_serializing_if = "Option::is_none")]
    pub job_script_prologue: Option<Vec<String>>,
}

impl JobKwargs {
    /// Log directory, treating an empty string as unset.
    pub fn log_directory(&self) -> Option<&str> {
        self.log_directory.as_deref().filter(|dir| !dir.is_empty())
    }
}

/// CERN-specific cluster options layered on top of [`JobKwargs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterOptions {
    pub worker_image: Option<String>,
    /// Deprecated synonym for `container_runtime`.
    pub image_type: Option<ContainerRuntime>,
    pub container_runtime: Option<ContainerRuntime>,
    pub gpus: Option<u32>,
    pub batch_name: Option<String>,
    /// Run client and workers in the same LCG software environment from CVMFS.
    pub lcg: bool,
    /// `(NAME, VALUE)` pairs exported in the prologue unless already exported there.
    pub exports: Vec<(String, String)>,
    pub kwargs: JobKwargs,
}
