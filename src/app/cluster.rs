//! CERN cluster façade: derive the job keywords, build the worker job and hand
//! its submit description to a [`JobSubmitter`].

use crate::adapters::assets;
use crate::domain::derivation;
use crate::domain::{AppError, ClusterOptions, HtCondorJob, JobKwargs, ProfileSettings};
use crate::ports::JobSubmitter;

/// Scratch disk requested per core when no disk size is given, in GB.
pub const DISK_GB_PER_CORE: u32 = 20;

/// HTCondor job tuned for the CERN pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CernJob {
    job: HtCondorJob,
}

impl CernJob {
    pub fn new(kwargs: &JobKwargs, profile: &ProfileSettings<'_>) -> Result<Self, AppError> {
        let mut kwargs = kwargs.clone();
        if kwargs.disk.as_deref().is_none_or(str::is_empty) && profile.string("disk")?.is_none() {
            let cores = match kwargs.cores {
                Some(cores) => cores,
                None => profile.u32("cores")?.unwrap_or(1),
            };
            let disk_gb = cores.checked_mul(DISK_GB_PER_CORE).ok_or_else(|| {
                AppError::InvalidSetting {
                    key: "cores".to_string(),
                    expected: "a core count small enough to size the default disk",
                }
            })?;
            kwargs.disk = Some(format!("{} GB", disk_gb));
        }

        let mut job = HtCondorJob::new(&kwargs, profile)?;
        if job.log_directory().is_some() {
            // worker logs go to output_destination, never streamed through the schedd
            job.header_mut().remove("Stream_Output");
            job.header_mut().remove("Stream_Error");
        }
        Ok(Self { job })
    }

    pub fn job(&self) -> &HtCondorJob {
        &self.job
    }

    /// Render the submit description from the packaged template.
    pub fn job_script(&self) -> Result<String, AppError> {
        self.job.render(assets::job_template()?)
    }
}

/// A Dask cluster of HTCondor workers on the CERN batch pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CernCluster {
    kwargs: JobKwargs,
    job: CernJob,
}

impl CernCluster {
    /// Derive the job keywords from `options` and build the worker job.
    pub fn new(options: &ClusterOptions, profile: &ProfileSettings<'_>) -> Result<Self, AppError> {
        let kwargs = derivation::derive(options, profile)?;
        let job = CernJob::new(&kwargs, profile)?;
        tracing::debug!(
            cores = job.job().cores(),
            processes = job.job().processes(),
            "built CERN worker job"
        );
        Ok(Self { kwargs, job })
    }

    /// The keyword set handed to the job builder.
    pub fn kwargs(&self) -> &JobKwargs {
        &self.kwargs
    }

    pub fn job(&self) -> &CernJob {
        &self.job
    }

    pub fn job_script(&self) -> Result<String, AppError> {
        self.job.job_script()
    }

    /// Submit `jobs` workers. Submitter errors are returned unchanged.
    pub fn submit<S: JobSubmitter>(&self, submitter: &S, jobs: u32) -> Result<Vec<String>, AppError> {
        let script = self.job_script()?;
        submitter.submit(&script, jobs, self.job.job().submit_command_extra())
    }
}
