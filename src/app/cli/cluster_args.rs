//! Cluster flags shared by `job-script`, `kwargs` and `submit`.

use clap::Args;

use crate::domain::{
    AppError, ClusterOptions, ContainerRuntime, DirectiveValue, Directives, JobKwargs,
};

#[derive(Args, Debug, Default, Clone)]
pub struct ClusterArgs {
    /// Cores per worker job
    #[arg(long)]
    pub cores: Option<u32>,
    /// Memory per worker job, e.g. 4GB
    #[arg(long)]
    pub memory: Option<String>,
    /// Scratch disk per worker job (default: 20 GB per core)
    #[arg(long)]
    pub disk: Option<String>,
    /// Worker processes per job
    #[arg(long)]
    pub processes: Option<u32>,
    /// Worker name prefix
    #[arg(long)]
    pub name: Option<String>,
    /// Python interpreter the workers run
    #[arg(long)]
    pub python: Option<String>,
    /// Address of the Dask scheduler, e.g. tcp://10.0.0.1:8786
    #[arg(long = "scheduler")]
    pub scheduler_address: Option<String>,
    #[arg(long)]
    pub death_timeout: Option<u32>,
    /// Directory for worker logs; EOS user paths are written back over XRootD
    #[arg(long)]
    pub log_directory: Option<String>,
    /// docker, singularity or none
    #[arg(long)]
    pub container_runtime: Option<ContainerRuntime>,
    #[arg(long, hide = true)]
    pub image_type: Option<ContainerRuntime>,
    /// Container image for the workers
    #[arg(long)]
    pub worker_image: Option<String>,
    /// GPUs requested per worker job
    #[arg(long)]
    pub gpus: Option<u32>,
    /// HTCondor batch name shown by condor_q
    #[arg(long)]
    pub batch_name: Option<String>,
    /// Run workers in the same LCG view as this process
    #[arg(long)]
    pub lcg: bool,
    /// Raw submit directive, overriding derived ones (repeatable)
    #[arg(long = "directive", value_name = "KEY=VALUE")]
    pub directives: Vec<String>,
    /// Extra condor_submit flag (repeatable)
    #[arg(long = "submit-extra", value_name = "FLAG", allow_hyphen_values = true)]
    pub submit_extra: Vec<String>,
    /// Extra dask worker argument (repeatable)
    #[arg(long = "worker-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub worker_args: Vec<String>,
    /// Shell line run before the worker starts (repeatable)
    #[arg(long = "prologue", value_name = "LINE")]
    pub prologue: Vec<String>,
    /// Export a variable in the worker prologue unless already exported (repeatable)
    #[arg(long = "export", value_name = "NAME=VALUE")]
    pub exports: Vec<String>,
}

impl ClusterArgs {
    pub fn into_options(self) -> Result<ClusterOptions, AppError> {
        let directives = self
            .directives
            .iter()
            .map(|raw| parse_directive(raw))
            .collect::<Result<Directives, AppError>>()?;

        let exports = self
            .exports
            .iter()
            .map(|export| {
                split_assignment(export)
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .ok_or_else(|| {
                        AppError::config_error(format!(
                            "Invalid export '{}': expected NAME=VALUE",
                            export
                        ))
                    })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(ClusterOptions {
            worker_image: self.worker_image,
            image_type: self.image_type,
            container_runtime: self.container_runtime,
            gpus: self.gpus,
            batch_name: self.batch_name,
            lcg: self.lcg,
            exports,
            kwargs: JobKwargs {
                cores: self.cores,
                memory: self.memory,
                disk: self.disk,
                processes: self.processes,
                name: self.name,
                python: self.python,
                scheduler_address: self.scheduler_address,
                death_timeout: self.death_timeout,
                log_directory: self.log_directory,
                job_extra_directives: non_empty(directives),
                submit_command_extra: non_empty_vec(self.submit_extra),
                worker_extra_args: non_empty_vec(self.worker_args),
                job_script_prologue: non_empty_vec(self.prologue),
            },
        })
    }
}

fn parse_directive(raw: &str) -> Result<(String, DirectiveValue), AppError> {
    split_assignment(raw)
        .map(|(key, value)| (key.to_string(), DirectiveValue::str(value)))
        .ok_or_else(|| AppError::InvalidDirective(raw.to_string()))
}

/// Split `KEY=VALUE` at the first `=`; the key must be non-empty.
fn split_assignment(raw: &str) -> Option<(&str, &str)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() { None } else { Some((key, value.trim())) }
}

fn non_empty(directives: Directives) -> Option<Directives> {
    (!directives.is_empty()).then_some(directives)
}

fn non_empty_vec(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}
