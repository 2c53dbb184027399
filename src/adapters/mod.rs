pub mod assets;
pub mod condor_submit_command;
pub mod local_config_filesystem;

pub use condor_submit_command::CondorSubmitCommand;
pub use local_config_filesystem::LocalConfigFilesystem;
