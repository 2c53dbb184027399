pub mod config;
pub mod job_script;
pub mod kwargs;
pub mod submit;
