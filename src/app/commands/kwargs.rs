//! Derive the keyword set handed to the HTCondor job builder.

use crate::app::AppContext;
use crate::domain::derivation;
use crate::domain::{AppError, ClusterOptions, JobKwargs, ProfileSettings};
use crate::ports::{ConfigFilesystem, JobSubmitter};

pub fn execute<F, S>(ctx: &AppContext<F, S>, options: &ClusterOptions) -> Result<JobKwargs, AppError>
where
    F: ConfigFilesystem,
    S: JobSubmitter,
{
    let config = ctx.load_config()?;
    derivation::derive(options, &ProfileSettings::cern(&config))
}
