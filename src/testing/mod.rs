mod memory_config_filesystem;
mod recording_submitter;

pub use memory_config_filesystem::MemoryConfigFilesystem;
pub use recording_submitter::RecordingSubmitter;
