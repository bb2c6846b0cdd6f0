//! Attribute value representation.
//!
//! `Value` is what a model keeps in its attribute bag. It covers every JSON
//! shape and additionally holds nested [`Object`]s (entities, plain models,
//! or external values that know how to serialize themselves).

use crate::object::Object;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Number;
use uuid::Uuid;

/// A single attribute value.
///
/// Mappings keep insertion order so that serialized output follows the
/// order in which keys were read or assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Null / unset value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Numeric value, kept as a JSON number to stay lossless
    Number(Number),

    /// String value
    String(String),

    /// Ordered sequence of values
    List(Vec<Value>),

    /// String-keyed mapping of values
    Map(IndexMap<String, Value>),

    /// Nested object (entity, model, or external value)
    Object(Box<dyn Object>),
}

impl Value {
    /// Wrap an object as a value.
    pub fn object(object: impl Object) -> Self {
        Self::Object(Box::new(object))
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value is "empty".
    ///
    /// Empty means null, the empty string, an empty list or an empty map.
    /// Numeric zero, `false` and `"0"` are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Bool(_) | Self::Number(_) | Self::Object(_) => false,
        }
    }

    /// Check if this value is a JSON scalar (bool, number or string).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::String(_))
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value as a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get this value as a nested object.
    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Self::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Try to get this value as a mutable nested object.
    pub fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        match self {
            Self::Object(object) => Some(object.as_mut()),
            _ => None,
        }
    }

    /// Downcast a nested object to a concrete type.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_object()
            .and_then(|object| object.as_any().downcast_ref::<T>())
    }
}

// ============================================================================
// Conversions from JSON
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Self::from(json.clone())
    }
}

// ============================================================================
// Conversions from Rust values
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Number(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Number(i.into())
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::Number(u.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become null.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Box<dyn Object>> for Value {
    fn from(object: Box<dyn Object>) -> Self {
        Self::Object(object)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::object(dt)
    }
}

impl From<Uuid> for Value {
    fn from(uuid: Uuid) -> Self {
        Self::object(uuid)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// Tests
// ============================================================================
