//! Nested jobqueue configuration store with dask-style precedence merging.

pub mod paths;
pub mod profile;

use std::str::FromStr;

use serde_yaml::{Mapping, Value};

use crate::domain::AppError;

pub use profile::{PROFILE, ProfileSettings};

/// Which side wins when two configuration layers define the same leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Values already in the store are kept.
    #[default]
    Old,
    /// Incoming values overwrite the store.
    New,
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "old" => Ok(Priority::Old),
            "new" => Ok(Priority::New),
            other => Err(AppError::config_error(format!(
                "Invalid priority '{}': must be 'old' or 'new'",
                other
            ))),
        }
    }
}

/// Key-value configuration tree addressed by dotted paths such as
/// `jobqueue.cern.worker-image`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    root: Mapping,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document. An empty document yields an empty store.
    pub fn from_yaml_str(content: &str) -> Result<Self, AppError> {
        match serde_yaml::from_str::<Value>(content)? {
            Value::Null => Ok(Self::new()),
            Value::Mapping(root) => Ok(Self { root }),
            _ => Err(AppError::ParseError {
                what: "configuration".to_string(),
                details: "top level must be a mapping".to_string(),
            }),
        }
    }

    /// Look up a dotted path. `-` and `_` are interchangeable in every segment.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = lookup(&self.root, segments.next()?)?;
        for segment in segments {
            current = lookup(current.as_mapping()?, segment)?;
        }
        Some(current)
    }

    /// Set a dotted path, creating intermediate mappings as needed.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let mut patch = value;
        for segment in segments.iter().rev() {
            let mut mapping = Mapping::new();
            mapping.insert(Value::String((*segment).to_string()), patch);
            patch = Value::Mapping(mapping);
        }
        if let Value::Mapping(patch) = patch {
            update_mapping(&mut self.root, &patch, Priority::New);
        }
    }

    /// Merge `other` into this store. Nested mappings merge key by key; for
    /// leaves `priority` decides which side survives.
    pub fn update(&mut self, other: &Mapping, priority: Priority) {
        update_mapping(&mut self.root, other, priority);
    }

    pub fn update_from(&mut self, other: &ConfigStore, priority: Priority) {
        self.update(&other.root, priority);
    }
}

fn lookup<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping
        .get(key)
        .or_else(|| canonical_alternative(key).and_then(|alt| mapping.get(alt.as_str())))
}

fn canonical_alternative(key: &str) -> Option<String> {
    if key.contains('_') {
        Some(key.replace('_', "-"))
    } else if key.contains('-') {
        Some(key.replace('-', "_"))
    } else {
        None
    }
}

fn update_mapping(old: &mut Mapping, new: &Mapping, priority: Priority) {
    for (key, incoming) in new {
        let key = existing_key(old, key);
        if let Some(current) = old.get_mut(&key) {
            match (current, incoming) {
                (Value::Mapping(current), Value::Mapping(incoming)) => {
                    update_mapping(current, incoming, priority);
                }
                (current, _) => {
                    if priority == Priority::New {
                        *current = incoming.clone();
                    }
                }
            }
        } else {
            old.insert(key, incoming.clone());
        }
    }
}

/// Resolve `key` to the spelling already present in `mapping`, if any.
fn existing_key(mapping: &Mapping, key: &Value) -> Value {
    if mapping.contains_key(key) {
        return key.clone();
    }
    if let Some(alt) = key.as_str().and_then(canonical_alternative) {
        let alt = Value::String(alt);
        if mapping.contains_key(&alt) {
            return alt;
        }
    }
    key.clone()
}
