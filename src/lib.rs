//! lxdask: Dask worker jobs for the CERN HTCondor pool.
//!
//! Derives the submit directives, flags and worker arguments a CERN Dask
//! cluster needs, renders the HTCondor submit description and submits it.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use adapters::{CondorSubmitCommand, LocalConfigFilesystem};
pub use app::cluster::{CernCluster, CernJob};
pub use app::config_bootstrap::{ConfigEnv, bootstrap, setup as setup_config};
pub use domain::derivation::derive;
pub use domain::prologue::is_set;
pub use domain::storage_path::resolve as resolve_xroot_url;
pub use domain::{
    AppError, ClusterOptions, ConfigStore, ContainerRuntime, DirectiveValue, Directives,
    JobKwargs, PROFILE, Priority, ProfileSettings, merge,
};
pub use ports::{ConfigFilesystem, JobSubmitter};

/// Build a cluster from `options` against the process-wide configuration,
/// setting it up on first use.
pub fn cluster(options: &ClusterOptions) -> Result<CernCluster, AppError> {
    let config = setup_config(Priority::Old)?;
    CernCluster::new(options, &ProfileSettings::cern(config))
}
