mod config_filesystem;
mod job_submitter;

pub use config_filesystem::ConfigFilesystem;
pub use job_submitter::JobSubmitter;
