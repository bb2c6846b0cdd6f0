//! Object capability traits.
//!
//! Any value stored in [`Value::Object`] implements [`Object`]. Instead of
//! probing types at runtime, callers ask an object for the capabilities it
//! supports (`as_model`, `as_entity`, `as_json_serializable`) and dispatch on
//! the answer.

use crate::entity::Entity;
use crate::model::Model;
use crate::values::Value;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// A value that knows how to produce its own JSON representation.
pub trait JsonSerializable {
    /// Produce the JSON representation of this value.
    fn json_serialize(&self) -> serde_json::Value;
}

/// Base trait for nested values held in an attribute bag.
///
/// # Example
///
/// ```rust
/// use model_core::{object_eq, Object, Value};
/// use std::any::Any;
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Point {
///     x: Value,
///     y: Value,
/// }
///
/// impl Object for Point {
///     fn class_name(&self) -> &str {
///         "Point"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn clone_object(&self) -> Box<dyn Object> {
///         Box::new(self.clone())
///     }
///
///     fn eq_object(&self, other: &dyn Object) -> bool {
///         object_eq(self, other)
///     }
///
///     fn set_field(&mut self, name: &str, value: Value) -> bool {
///         match name {
///             "x" => self.x = value,
///             "y" => self.y = value,
///             _ => return false,
///         }
///         true
///     }
/// }
/// ```
pub trait Object: Any + fmt::Debug + Send + Sync {
    /// Name of the class this object is an instance of.
    fn class_name(&self) -> &str;

    /// Check whether this object is an instance of `class`.
    ///
    /// The default compares class names; implementors standing in for a
    /// family of classes may accept more than one name.
    fn is_a(&self, class: &str) -> bool {
        self.class_name() == class
    }

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Clone into a new boxed object.
    fn clone_object(&self) -> Box<dyn Object>;

    /// Structural equality against another object.
    fn eq_object(&self, other: &dyn Object) -> bool;

    /// Set a like-named field directly.
    ///
    /// Used as the last-resort initializer for classes that are neither
    /// models nor entities. Returns `false` when the field does not exist.
    fn set_field(&mut self, name: &str, value: Value) -> bool {
        let _ = (name, value);
        false
    }

    /// Model capability (attribute bag, validation rules).
    fn as_model(&self) -> Option<&dyn Model> {
        None
    }

    /// Mutable model capability.
    fn as_model_mut(&mut self) -> Option<&mut dyn Model> {
        None
    }

    /// Entity capability (JSON field mapping, nested entity declarations).
    fn as_entity(&self) -> Option<&dyn Entity> {
        None
    }

    /// Mutable entity capability.
    fn as_entity_mut(&mut self) -> Option<&mut dyn Entity> {
        None
    }

    /// Self-serialization capability.
    fn as_json_serializable(&self) -> Option<&dyn JsonSerializable> {
        None
    }
}

/// Equality helper for [`Object::eq_object`] implementations.
pub fn object_eq<T: Object + PartialEq>(this: &T, other: &dyn Object) -> bool {
    other
        .as_any()
        .downcast_ref::<T>()
        .is_some_and(|other| this == other)
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

impl PartialEq for dyn Object {
    fn eq(&self, other: &Self) -> bool {
        self.eq_object(other)
    }
}

// Works around rust-lang/rust#31740: without a second impl, `Box<dyn Object> ==
// Box<dyn Object>` tries to move the right-hand side.
impl PartialEq<&Self> for Box<dyn Object> {
    fn eq(&self, other: &&Self) -> bool {
        self.eq_object(&***other)
    }
}

// ============================================================================
// External JSON-serializable values
// ============================================================================

impl Object for DateTime<Utc> {
    fn class_name(&self) -> &str {
        "DateTime"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(*self)
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        object_eq(self, other)
    }

    fn as_json_serializable(&self) -> Option<&dyn JsonSerializable> {
        Some(self)
    }
}

impl JsonSerializable for DateTime<Utc> {
    /// RFC 3339, like every other date/time written to JSON.
    fn json_serialize(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_rfc3339())
    }
}

impl Object for Uuid {
    fn class_name(&self) -> &str {
        "Uuid"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(*self)
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        object_eq(self, other)
    }

    fn as_json_serializable(&self) -> Option<&dyn JsonSerializable> {
        Some(self)
    }
}

impl JsonSerializable for Uuid {
    fn json_serialize(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}
