//! Raw entity snapshots returned by the service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DtError, Result};

/// Identifier field carried by every Dependency-Track instance.
pub const UUID_FIELD: &str = "uuid";

/// Unvalidated key/value data of one resource instance.
///
/// Mirrors the JSON object the service returned. Lookups of absent keys
/// through [`Entity::field`] fail with [`DtError::MissingKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedPayload` for arrays and scalars.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DtError::UnexpectedPayload(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value for `key`, failing when the key is absent.
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.0
            .get(key)
            .ok_or_else(|| DtError::MissingKey(key.to_string()))
    }

    /// String value for `key`, `None` when absent, null or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// The `uuid` of this instance, if the service assigned one.
    pub fn uuid(&self) -> Option<&str> {
        self.str_field(UUID_FIELD)
    }

    /// Drop every key outside `fields`.
    pub fn retain_fields(&mut self, fields: &[&str]) {
        self.0.retain(|k, _| fields.contains(&k.as_str()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a Entity {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Narrow every item to the allowlisted keys. `None` keeps items untouched.
pub fn filter_fields(items: Vec<Entity>, fields: Option<&[&str]>) -> Vec<Entity> {
    match fields {
        Some(fields) => items
            .into_iter()
            .map(|mut item| {
                item.retain_fields(fields);
                item
            })
            .collect(),
        None => items,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
