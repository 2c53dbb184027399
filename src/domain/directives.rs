//! Ordered HTCondor submit directives and the first-wins precedence merge.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value of a single submit directive.
///
/// Strings are embedded verbatim into the submit description, so any quoting the
/// scheduler needs must already be part of the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    Str(String),
    Bool(bool),
}

impl DirectiveValue {
    pub fn str<S: Into<String>>(value: S) -> Self {
        DirectiveValue::Str(value.into())
    }

    /// Wrap a value in double quotes for use as a ClassAd string literal.
    pub fn quoted(value: &str) -> Self {
        DirectiveValue::Str(format!("\"{}\"", value))
    }
}

impl fmt::Display for DirectiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveValue::Str(value) => f.write_str(value),
            DirectiveValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for DirectiveValue {
    fn from(value: &str) -> Self {
        DirectiveValue::Str(value.to_string())
    }
}

impl From<String> for DirectiveValue {
    fn from(value: String) -> Self {
        DirectiveValue::Str(value)
    }
}

impl From<bool> for DirectiveValue {
    fn from(value: bool) -> Self {
        DirectiveValue::Bool(value)
    }
}

impl Serialize for DirectiveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DirectiveValue::Str(value) => serializer.serialize_str(value),
            DirectiveValue::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

impl<'de> Deserialize<'de> for DirectiveValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Numbers in YAML (`request_gpus: 1`) are directives too; keep their text.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
            Float(f64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(value) => DirectiveValue::Bool(value),
            Raw::Int(value) => DirectiveValue::Str(value.to_string()),
            Raw::Float(value) => DirectiveValue::Str(value.to_string()),
            Raw::Str(value) => DirectiveValue::Str(value),
        })
    }
}

/// Insertion-ordered directive mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    entries: Vec<(String, DirectiveValue)>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping holding exactly one directive.
    pub fn single<K: Into<String>, V: Into<DirectiveValue>>(key: K, value: V) -> Self {
        Self { entries: vec![(key.into(), value.into())] }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&DirectiveValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Set `key`, replacing an existing value in place (last write wins).
    pub fn insert<K: Into<String>, V: Into<DirectiveValue>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Apply every entry of `other` with [`Directives::insert`].
    pub fn extend_overriding(&mut self, other: &Directives) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<DirectiveValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for Directives {
    type Item = (String, DirectiveValue);
    type IntoIter = std::vec::IntoIter<(String, DirectiveValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<DirectiveValue>> FromIterator<(K, V)> for Directives {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directives = Directives::new();
        for (key, value) in iter {
            directives.insert(key, value);
        }
        directives
    }
}

impl Serialize for Directives {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Directives {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectivesVisitor;

        impl<'de> Visitor<'de> for DirectivesVisitor {
            type Value = Directives;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of directive names to values")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Directives, E> {
                Ok(Directives::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Directives, A::Error> {
                let mut directives = Directives::new();
                while let Some((key, value)) = access.next_entry::<String, DirectiveValue>()? {
                    directives.insert(key, value);
                }
                Ok(directives)
            }
        }

        deserializer.deserialize_any(DirectivesVisitor)
    }
}

/// Merge candidate mappings so that the first candidate defining a key wins.
///
/// Absent candidates contribute nothing. Later candidates can only add keys that
/// no earlier candidate set, which is how caller overrides listed ahead of
/// computed defaults take precedence over them.
pub fn merge<I>(candidates: I) -> Directives
where
    I: IntoIterator<Item = Option<Directives>>,
{
    candidates.into_iter().flatten().fold(Directives::new(), |mut merged, candidate| {
        for (key, value) in candidate {
            if !merged.contains_key(&key) {
                merged.entries.push((key, value));
            }
        }
        merged
    })
}
