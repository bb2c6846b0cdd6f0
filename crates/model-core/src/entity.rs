//! The entity contract: how a model maps onto a JSON document.
//!
//! An [`Entity`] declares
//!
//! - which JSON field each attribute is read from and written to
//!   ([`Entity::attribute_fields`]),
//! - which attributes hold nested entities ([`Entity::attribute_entities`]),
//! - custom per-attribute converters in both directions.
//!
//! The conversion itself lives in the `entity-json` crate.

use crate::model::Model;
use crate::values::Value;
use convert_case::{Boundary, Case, Casing};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Attribute name → JSON field name.
///
/// A mapped value of `None` or `Some("")` excludes the attribute from JSON
/// in both directions.
pub type FieldMap = IndexMap<String, Option<String>>;

/// Attribute name → nested entity class declaration.
pub type EntityMap = IndexMap<String, ClassSpec>;

/// Check whether a field map entry excludes its attribute.
pub fn is_excluded(field: &Option<String>) -> bool {
    !matches!(field.as_deref(), Some(f) if !f.is_empty())
}

// ============================================================================
// Class specification
// ============================================================================

/// Declared class of a nested-entity attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassSpec {
    /// The attribute holds one instance of the class
    One(String),
    /// The attribute holds an ordered list of instances of the class
    Many(String),
}

impl ClassSpec {
    /// Single nested instance of `class`.
    pub fn one(class: impl Into<String>) -> Self {
        Self::One(class.into())
    }

    /// List of nested instances of `class`.
    pub fn many(class: impl Into<String>) -> Self {
        Self::Many(class.into())
    }

    /// The class name, regardless of arity.
    pub fn class(&self) -> &str {
        match self {
            Self::One(class) | Self::Many(class) => class,
        }
    }

    /// Check whether this declares a list.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl fmt::Display for ClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(class) => write!(f, "{class}"),
            Self::Many(class) => write!(f, "[{class}]"),
        }
    }
}

// ============================================================================
// Custom converters
// ============================================================================

/// Signature of a to-JSON converter function: `(value, attribute, entity)`.
pub type ToJsonFn =
    dyn Fn(&Value, &str, &dyn Entity) -> anyhow::Result<serde_json::Value> + Send + Sync;

/// Signature of a from-JSON converter function: `(json, attribute, entity)`.
pub type FromJsonFn =
    dyn Fn(&serde_json::Value, &str, &dyn Entity) -> anyhow::Result<Value> + Send + Sync;

/// Attribute name → custom to-JSON converter.
pub type ToJsonMap = IndexMap<String, ToJson>;

/// Attribute name → custom from-JSON converter.
pub type FromJsonMap = IndexMap<String, FromJson>;

/// Custom conversion of an attribute value to JSON.
#[derive(Clone)]
pub enum ToJson {
    /// Computed from the attribute value
    Function(Arc<ToJsonFn>),
    /// Written verbatim
    Literal(serde_json::Value),
}

impl ToJson {
    /// Converter backed by a function.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, &str, &dyn Entity) -> anyhow::Result<serde_json::Value>
            + Send
            + Sync
            + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Converter that always writes `value`.
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        Self::Literal(value.into())
    }
}

impl fmt::Debug for ToJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("ToJson::Function(..)"),
            Self::Literal(value) => f.debug_tuple("ToJson::Literal").field(value).finish(),
        }
    }
}

/// Custom conversion of a JSON field value to an attribute value.
#[derive(Clone)]
pub enum FromJson {
    /// Computed from the JSON field value
    Function(Arc<FromJsonFn>),
    /// Assigned verbatim
    Literal(Value),
}

impl FromJson {
    /// Converter backed by a function.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&serde_json::Value, &str, &dyn Entity) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Converter that always assigns `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }
}

impl fmt::Debug for FromJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("FromJson::Function(..)"),
            Self::Literal(value) => f.debug_tuple("FromJson::Literal").field(value).finish(),
        }
    }
}

// ============================================================================
// Entity trait
// ============================================================================

/// A model that converts to and from JSON documents.
pub trait Entity: Model {
    /// Attribute → JSON field map.
    ///
    /// Only attributes whose field name differs from the attribute name need
    /// an entry. The default derives snake_case field names from camelCase
    /// attribute names; override to merge fixed entries on top of it.
    fn attribute_fields(&self) -> FieldMap {
        default_attribute_fields(self.class_name(), || self.attributes())
            .as_ref()
            .clone()
    }

    /// Attributes holding nested entities.
    fn attribute_entities(&self) -> EntityMap {
        EntityMap::new()
    }

    /// Custom attribute → JSON converters.
    fn attributes_to_json(&self) -> ToJsonMap {
        ToJsonMap::new()
    }

    /// Custom JSON → attribute converters.
    fn attributes_from_json(&self) -> FromJsonMap {
        FromJsonMap::new()
    }
}

// ============================================================================
// Default field map cache
// ============================================================================

/// Map every camelCase attribute to its snake_case field name.
///
/// Words only break before an uppercase letter that follows a lowercase
/// letter or a digit, so `address2` stays as is and `line2Text` becomes
/// `line2_text`. Attributes without such a break are left out.
pub fn snake_case_fields(attributes: impl IntoIterator<Item = String>) -> FieldMap {
    attributes
        .into_iter()
        .filter_map(|attribute| {
            let field = attribute
                .set_boundaries(&[Boundary::LowerUpper, Boundary::DigitUpper])
                .to_case(Case::Snake);
            (field != attribute).then(|| (attribute, Some(field)))
        })
        .collect()
}

// Keyed by class name, so only for classes whose name is unique in the
// process (Rust types). Entries are computed once and never invalidated; a
// racing first access computes the same map twice and keeps the first.
static FIELD_MAPS: OnceLock<RwLock<HashMap<String, Arc<FieldMap>>>> = OnceLock::new();

/// Default attribute → field map of a class.
///
/// Every attribute whose snake_case form differs from its name is mapped to
/// that form (see [`snake_case_fields`]). The result is cached per class
/// name; `attributes` is only called on the first request for a class.
/// Classes defined at runtime keep their map on the definition instead
/// ([`crate::ClassDef::default_fields`]).
pub fn default_attribute_fields<F>(class: &str, attributes: F) -> Arc<FieldMap>
where
    F: FnOnce() -> Vec<String>,
{
    let cache = FIELD_MAPS.get_or_init(Default::default);

    if let Some(map) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(class)
    {
        return Arc::clone(map);
    }

    let map = snake_case_fields(attributes());

    tracing::debug!("Computed attribute field map for class '{}': {:?}", class, map);

    let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        cache
            .entry(class.to_string())
            .or_insert_with(|| Arc::new(map)),
    )
}
