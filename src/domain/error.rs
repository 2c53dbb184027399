use std::io;

use thiserror::Error;

/// Library-wide error type for lxdask operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// The shared LCG environment was requested from an interpreter outside CVMFS.
    #[error(
        "You need to have loaded the LCG environment before running the python interpreter. Current interpreter: {interpreter}"
    )]
    UntrustedInterpreter { interpreter: String },

    /// Container runtime name is not one of docker, singularity or none.
    #[error("Invalid container runtime '{0}': must be one of docker, singularity, none")]
    InvalidContainerRuntime(String),

    /// A configuration key holds a value of the wrong shape.
    #[error("Invalid value for '{key}': expected {expected}")]
    InvalidSetting { key: String, expected: &'static str },

    /// A setting required to build a worker job is absent everywhere.
    #[error("Missing required setting '{0}': pass it explicitly or set it in the jobqueue config")]
    MissingSetting(String),

    /// Byte size string could not be parsed.
    #[error("Invalid byte size '{0}'")]
    InvalidByteSize(String),

    /// Directive override not of the form KEY=VALUE.
    #[error("Invalid directive '{0}': expected KEY=VALUE")]
    InvalidDirective(String),

    /// Submission command failed.
    #[error("Submit error running '{command}': {details}")]
    SubmitError { command: String, details: String },

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    /// Job template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Scheduler address is not a valid URL.
    #[error("Invalid scheduler address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}
