use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

/// Container runtime the Dask workers are started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    Docker,
    Singularity,
    None,
}

impl ContainerRuntime {
    pub fn label(&self) -> &'static str {
        match self {
            ContainerRuntime::Docker => "docker",
            ContainerRuntime::Singularity => "singularity",
            ContainerRuntime::None => "none",
        }
    }

    /// HTCondor universe for jobs using this runtime.
    pub fn universe(&self) -> &'static str {
        match self {
            ContainerRuntime::Docker => "docker",
            ContainerRuntime::Singularity | ContainerRuntime::None => "vanilla",
        }
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContainerRuntime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docker" => Ok(ContainerRuntime::Docker),
            "singularity" => Ok(ContainerRuntime::Singularity),
            "none" | "" => Ok(ContainerRuntime::None),
            _ => Err(AppError::InvalidContainerRuntime(s.to_string())),
        }
    }
}
