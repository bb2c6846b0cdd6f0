//! Core model types for json-entity.
//!
//! This crate provides the host model framework that the JSON entity
//! converter builds on:
//!
//! - [`Value`] - Attribute values (JSON shapes plus nested objects)
//! - [`Object`], [`Model`], [`Entity`] - Capability traits for values, attribute
//!   bags and JSON-mapped entities
//! - [`registry`] - Process-wide class registry used to instantiate classes by name
//! - [`validate()`] - Rule dispatch collecting per-attribute errors
//! - [`Record`] - Schema-driven dynamic entity
//! - [`Schema`] - Entity class declarations loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! model-core (this crate)
//!    │
//!    └─── entity-json   (to_json / from_json engine, EntityValidator)
//!            │
//!            └─── json-entity   (facade, schema loading)
//! ```
//!
//! # Example
//!
//! ```rust
//! use model_core::{ClassDef, Model, Record, Value};
//!
//! let class = ClassDef::builder("Contact")
//!     .attributes(["name", "phoneNumber"])
//!     .build();
//!
//! let mut contact = Record::new(class);
//! contact.set_attribute("name", Value::from("Ann")).unwrap();
//! assert_eq!(contact.attribute("name"), Some(&Value::from("Ann")));
//! ```

pub mod entity;
pub mod error;
pub mod model;
pub mod object;
pub mod record;
pub mod registry;
pub mod schema;
pub mod validate;
pub mod values;

// Re-exports for convenience
pub use entity::{
    default_attribute_fields, is_excluded, snake_case_fields, ClassSpec, Entity, EntityMap,
    FieldMap, FromJson, FromJsonMap, ToJson, ToJsonMap,
};
pub use error::{AttributeError, ModelError, RuleError, ValidationErrors};
pub use model::{Assignment, Model};
pub use object::{object_eq, JsonSerializable, Object};
pub use record::{register_class, ClassDef, ClassDefBuilder, Record};
pub use registry::{instantiate, is_registered, register, register_factory};
pub use schema::{
    ClassSchema, RawClassSpec, RuleSchema, Schema, SchemaError, ValidatorFactory, ValidatorTable,
};
pub use validate::{validate, Required, Rule, Validator};
pub use values::Value;
