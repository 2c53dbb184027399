pub mod config;
pub mod container_runtime;
pub mod derivation;
pub mod directives;
pub mod error;
pub mod job;
pub mod options;
pub mod prologue;
pub mod storage_path;

pub use config::{ConfigStore, PROFILE, Priority, ProfileSettings};
pub use container_runtime::ContainerRuntime;
pub use directives::{DirectiveValue, Directives, merge};
pub use error::AppError;
pub use job::HtCondorJob;
pub use options::{ClusterOptions, JobKwargs};
