//! HTCondor worker job description: submit header, worker command and the
//! rendered submit file handed to `condor_submit`.

pub mod bytes;
pub mod quoting;

use minijinja::{Environment, UndefinedBehavior, context};
use url::Url;

use crate::domain::config::ProfileSettings;
use crate::domain::derivation::worker_interpreter;
use crate::domain::{AppError, DirectiveValue, Directives, JobKwargs};

pub use bytes::{format_bytes, parse_bytes};

/// Shell every worker job runs under.
pub const EXECUTABLE: &str = "/bin/sh";

const DEFAULT_NAME: &str = "dask-worker";
const DEFAULT_DEATH_TIMEOUT: u32 = 60;
const DEFAULT_SHEBANG: &str = "#!/usr/bin/env condor_submit";

/// A fully resolved HTCondor job for one Dask worker process group.
#[derive(Debug, Clone, PartialEq)]
pub struct HtCondorJob {
    header: Directives,
    cores: u32,
    processes: u32,
    memory: u64,
    disk: u64,
    name: String,
    python: String,
    scheduler_address: Option<String>,
    death_timeout: u32,
    log_directory: Option<String>,
    worker_extra_args: Vec<String>,
    prologue: Vec<String>,
    submit_command_extra: Vec<String>,
    shebang: String,
}

impl HtCondorJob {
    /// Build a job from keywords, filling gaps from the profile configuration.
    pub fn new(kwargs: &JobKwargs, profile: &ProfileSettings<'_>) -> Result<Self, AppError> {
        let cores = match kwargs.cores {
            Some(cores) => cores,
            None => profile.u32("cores")?.ok_or_else(|| AppError::MissingSetting("cores".into()))?,
        };
        if cores == 0 {
            return Err(AppError::InvalidSetting {
                key: "cores".to_string(),
                expected: "a positive integer",
            });
        }

        let memory = required_string(kwargs.memory.as_deref(), profile, "memory")?;
        let memory = parse_bytes(&memory)?;
        let disk = required_string(kwargs.disk.as_deref(), profile, "disk")?;
        let disk = parse_bytes(&disk)?;

        let processes = match kwargs.processes {
            Some(processes) => processes,
            None => profile.u32("processes")?.unwrap_or_else(|| default_processes(cores)),
        };
        if processes == 0 || processes > cores {
            return Err(AppError::InvalidSetting {
                key: "processes".to_string(),
                expected: "between 1 and the number of cores",
            });
        }

        let name = match kwargs.name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => profile.string("name")?.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        };
        let death_timeout = match kwargs.death_timeout {
            Some(timeout) => timeout,
            None => profile.u32("death-timeout")?.unwrap_or(DEFAULT_DEATH_TIMEOUT),
        };
        let scheduler_address = match kwargs.scheduler_address.as_deref() {
            Some(address) => Some(address.to_string()),
            None => profile.string("scheduler-address")?,
        };
        if let Some(address) = &scheduler_address {
            Url::parse(address)?;
        }
        let log_directory = match kwargs.log_directory() {
            Some(dir) => Some(dir.to_string()),
            None => profile.log_directory()?.filter(|dir| !dir.is_empty()),
        };
        let job_extra_directives = match &kwargs.job_extra_directives {
            Some(directives) => directives.clone(),
            None => profile.job_extra_directives()?,
        };
        let worker_extra_args = match &kwargs.worker_extra_args {
            Some(args) => args.clone(),
            None => profile.worker_extra_args()?,
        };
        let prologue = match &kwargs.job_script_prologue {
            Some(lines) => lines.clone(),
            None => profile.job_script_prologue()?,
        };
        let submit_command_extra = match &kwargs.submit_command_extra {
            Some(flags) => flags.clone(),
            None => profile.submit_command_extra()?,
        };
        let shebang = profile.string("shebang")?.unwrap_or_else(|| DEFAULT_SHEBANG.to_string());

        let mut header: Directives = [
            ("MY.DaskWorkerName", "\"htcondor--$F(MY.JobId)--\"".to_string()),
            ("RequestCpus", "MY.DaskWorkerCores".to_string()),
            ("RequestMemory", "floor(MY.DaskWorkerMemory / 1048576)".to_string()),
            ("RequestDisk", "floor(MY.DaskWorkerDisk / 1024)".to_string()),
            ("MY.JobId", "\"$(ClusterId).$(ProcId)\"".to_string()),
            ("MY.DaskWorkerCores", cores.to_string()),
            ("MY.DaskWorkerMemory", memory.to_string()),
            ("MY.DaskWorkerDisk", disk.to_string()),
        ]
        .into_iter()
        .collect();

        if let Some(dir) = &log_directory {
            header.insert("LogDirectory", dir.as_str());
            header.insert("Output", "$(LogDirectory)/worker-$F(MY.JobId).out");
            header.insert("Error", "$(LogDirectory)/worker-$F(MY.JobId).err");
            header.insert("Log", "$(LogDirectory)/worker-$(ClusterId).log");
            // workers are killed to stop them, so output is only visible if streamed
            header.insert("Stream_Output", true);
            header.insert("Stream_Error", true);
        }
        header.extend_overriding(&job_extra_directives);

        Ok(Self {
            header,
            cores,
            processes,
            memory,
            disk,
            name,
            python: worker_interpreter(kwargs, profile)?,
            scheduler_address,
            death_timeout,
            log_directory,
            worker_extra_args,
            prologue,
            submit_command_extra,
            shebang,
        })
    }

    pub fn header(&self) -> &Directives {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Directives {
        &mut self.header
    }

    pub fn cores(&self) -> u32 {
        self.cores
    }

    pub fn processes(&self) -> u32 {
        self.processes
    }

    pub fn threads_per_process(&self) -> u32 {
        self.cores / self.processes
    }

    pub fn memory(&self) -> u64 {
        self.memory
    }

    pub fn disk(&self) -> u64 {
        self.disk
    }

    pub fn log_directory(&self) -> Option<&str> {
        self.log_directory.as_deref()
    }

    pub fn submit_command_extra(&self) -> &[String] {
        &self.submit_command_extra
    }

    /// The `dask_worker` invocation, without the prologue.
    pub fn worker_command(&self) -> String {
        let mut parts = vec![self.python.clone(), "-m distributed.cli.dask_worker".to_string()];
        if let Some(address) = &self.scheduler_address {
            parts.push(address.clone());
        }
        parts.push(format!("--nthreads {}", self.threads_per_process()));
        if self.processes > 1 {
            parts.push(format!("--nworkers {}", self.processes));
        }
        parts.push(format!(
            "--memory-limit {}",
            format_bytes(self.memory / u64::from(self.processes))
        ));
        parts.push(format!("--name {}--${{JOB_ID}}--", self.name));
        parts.push("--nanny".to_string());
        parts.push(format!("--death-timeout {}", self.death_timeout));
        parts.extend(self.worker_extra_args.iter().cloned());
        parts.join(" ")
    }

    /// Prologue lines followed by the worker command, as run by `/bin/sh -c`.
    pub fn shell_command(&self) -> String {
        let mut lines = self.prologue.clone();
        lines.push(self.worker_command());
        lines.join("; ")
    }

    /// Render the submit description with the given minijinja template source.
    pub fn render(&self, template: &str) -> Result<String, AppError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let header: Vec<String> =
            self.header.iter().map(|(key, value)| header_line(key, value)).collect();
        let rendered = env.render_str(
            template,
            context! {
                shebang => self.shebang.as_str(),
                header => header,
                environment => quoting::quote_environment(&[("JOB_ID", "$F(MY.JobId)")]),
                arguments => quoting::quote_arguments(&["-c".to_string(), self.shell_command()]),
                executable => EXECUTABLE,
            },
        )?;
        Ok(rendered)
    }
}

fn header_line(key: &str, value: &DirectiveValue) -> String {
    format!("{} = {}", key, value)
}

fn required_string(
    explicit: Option<&str>,
    profile: &ProfileSettings<'_>,
    setting: &str,
) -> Result<String, AppError> {
    if let Some(value) = explicit.filter(|value| !value.is_empty()) {
        return Ok(value.to_string());
    }
    profile.string(setting)?.ok_or_else(|| AppError::MissingSetting(setting.to_string()))
}

/// Split cores into worker processes: one per core up to four cores, otherwise
/// the smallest factor of `cores` that is at least its square root.
pub fn default_processes(cores: u32) -> u32 {
    if cores <= 4 {
        return cores;
    }
    let root = f64::from(cores).sqrt();
    (1..=cores).find(|f| cores % f == 0 && f64::from(*f) >= root).unwrap_or(cores)
}
