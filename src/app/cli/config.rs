//! Config command implementation.

use clap::Subcommand;

use crate::app::api::{self, EnsureOutcome};
use crate::domain::AppError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the user jobqueue-cern.yaml path
    Path,
    /// Write the packaged jobqueue-cern.yaml unless one exists
    Ensure,
    /// Print the effective jobqueue.cern settings
    Show {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

pub fn run_config(command: ConfigCommands) -> Result<(), AppError> {
    match command {
        ConfigCommands::Path => match api::config_path() {
            Some(path) => println!("{}", path.display()),
            None => {
                return Err(AppError::config_error(
                    "Neither DASK_CONFIG nor HOME is set; no user config directory",
                ));
            }
        },
        ConfigCommands::Ensure => match api::config_ensure()? {
            EnsureOutcome::Created(path) => println!("✅ Created {}", path.display()),
            EnsureOutcome::AlreadyPresent(path) => {
                println!("ℹ️ Keeping existing {}", path.display())
            }
            EnsureOutcome::Unavailable => {
                println!("⚠️ No writable user config directory; using packaged defaults")
            }
        },
        ConfigCommands::Show { json } => {
            let section = api::config_show()?;
            let rendered = if json {
                serde_json::to_string_pretty(&section).map_err(|e| {
                    AppError::InternalError(format!("Failed to serialize config: {}", e))
                })?
            } else {
                serde_yaml::to_string(&section)?
            };
            println!("{}", rendered.trim_end());
        }
    }
    Ok(())
}
