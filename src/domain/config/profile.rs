//! Typed read-only view over `jobqueue.<profile>.*` settings.

use serde_yaml::Value;

use crate::domain::{AppError, ContainerRuntime, Directives};

use super::ConfigStore;

/// Facility profile used for the CERN HTCondor pool.
pub const PROFILE: &str = "cern";

#[derive(Debug, Clone, Copy)]
pub struct ProfileSettings<'a> {
    store: &'a ConfigStore,
    profile: &'a str,
}

impl<'a> ProfileSettings<'a> {
    pub fn new(store: &'a ConfigStore, profile: &'a str) -> Self {
        Self { store, profile }
    }

    pub fn cern(store: &'a ConfigStore) -> Self {
        Self::new(store, PROFILE)
    }

    pub fn key(&self, setting: &str) -> String {
        format!("jobqueue.{}.{}", self.profile, setting)
    }

    /// Raw value of a setting; YAML `null` counts as unset.
    pub fn value(&self, setting: &str) -> Option<&'a Value> {
        self.store.get(&self.key(setting)).filter(|value| !value.is_null())
    }

    pub fn string(&self, setting: &str) -> Result<Option<String>, AppError> {
        match self.value(setting) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(self.invalid(setting, "a string")),
        }
    }

    pub fn u32(&self, setting: &str) -> Result<Option<u32>, AppError> {
        match self.value(setting) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(setting, "a non-negative integer")),
        }
    }

    pub fn string_list(&self, setting: &str) -> Result<Option<Vec<String>>, AppError> {
        match self.value(setting) {
            None => Ok(None),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err(self.invalid(setting, "a list of strings")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(self.invalid(setting, "a list of strings")),
        }
    }

    pub fn directives(&self, setting: &str) -> Result<Option<Directives>, AppError> {
        match self.value(setting) {
            None => Ok(None),
            Some(value @ Value::Mapping(_)) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|_| self.invalid(setting, "a mapping of directives")),
            Some(_) => Err(self.invalid(setting, "a mapping of directives")),
        }
    }

    pub fn container_runtime(&self) -> Result<Option<ContainerRuntime>, AppError> {
        self.string("container-runtime")?.map(|name| name.parse()).transpose()
    }

    pub fn worker_image(&self) -> Result<Option<String>, AppError> {
        self.string("worker-image")
    }

    pub fn batch_name(&self) -> Result<Option<String>, AppError> {
        self.string("batch-name")
    }

    pub fn log_directory(&self) -> Result<Option<String>, AppError> {
        self.string("log-directory")
    }

    pub fn python(&self) -> Result<Option<String>, AppError> {
        self.string("python")
    }

    /// Raw directive defaults; the legacy `job-extra` key is read when the
    /// current key is unset.
    pub fn job_extra_directives(&self) -> Result<Directives, AppError> {
        Ok(match self.directives("job_extra_directives")? {
            Some(directives) => directives,
            None => self.directives("job-extra")?.unwrap_or_default(),
        })
    }

    /// Extra worker arguments; falls back to the legacy `extra` key.
    pub fn worker_extra_args(&self) -> Result<Vec<String>, AppError> {
        Ok(match self.string_list("worker_extra_args")? {
            Some(args) => args,
            None => self.string_list("extra")?.unwrap_or_default(),
        })
    }

    pub fn submit_command_extra(&self) -> Result<Vec<String>, AppError> {
        Ok(self.string_list("submit_command_extra")?.unwrap_or_default())
    }

    /// Prologue lines; falls back to the legacy `env-extra` key.
    pub fn job_script_prologue(&self) -> Result<Vec<String>, AppError> {
        Ok(match self.string_list("job_script_prologue")? {
            Some(lines) => lines,
            None => self.string_list("env-extra")?.unwrap_or_default(),
        })
    }

    fn invalid(&self, setting: &str, expected: &'static str) -> AppError {
        AppError::InvalidSetting { key: self.key(setting), expected }
    }
}
