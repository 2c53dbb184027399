//! Render the worker submit description.

use crate::app::AppContext;
use crate::app::cluster::CernCluster;
use crate::domain::{AppError, ClusterOptions, ProfileSettings};
use crate::ports::{ConfigFilesystem, JobSubmitter};

pub fn execute<F, S>(ctx: &AppContext<F, S>, options: &ClusterOptions) -> Result<String, AppError>
where
    F: ConfigFilesystem,
    S: JobSubmitter,
{
    let config = ctx.load_config()?;
    CernCluster::new(options, &ProfileSettings::cern(&config))?.job_script()
}
