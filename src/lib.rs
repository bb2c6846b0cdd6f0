//! json-entity
//!
//! Models that map onto JSON documents.
//!
//! # Features
//!
//! - Field remapping: attributes are read from and written to JSON fields by
//!   name, with camelCase → snake_case mapping by default
//! - Nested entities: single children and lists, instantiated by class name
//! - Custom converters per attribute, in both directions
//! - Empty-value suppression on output, unknown-field policy on input
//! - Nested validation through [`EntityValidator`]
//! - Entity classes declared in code or in YAML schema files
//!
//! # Crates
//!
//! - `model_core` - value model, capability traits, class registry, rules and schema
//! - `entity_json` - JSON ↔ entity conversion and the entity validator
//!
//! # Example
//!
//! ```no_run
//! use json_entity::{create, load_schema, EntityJson};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! load_schema("classes.yaml")?;
//!
//! let doc = json!({"number": "A-1", "customer": {"name": "Ann"}});
//! let order = create("Order", doc.as_object().unwrap())?;
//! let order = order.as_entity().unwrap();
//! println!("{}", serde_json::Value::Object(order.json()?));
//! # Ok(())
//! # }
//! ```

pub mod schema;

pub use entity_json::{
    build_child, create, from_json, from_json_str, standard_validators, to_json, to_json_string,
    EntityError, EntityJson, EntityValidator, JsonMap,
};
pub use model_core::{
    default_attribute_fields, instantiate, object_eq, register, register_class, validate,
    Assignment, AttributeError, ClassDef, ClassSpec, Entity, EntityMap, FieldMap, FromJson,
    FromJsonMap, JsonSerializable, Model, ModelError, Object, Record, Required, Rule, Schema,
    ToJson, ToJsonMap, ValidationErrors, Value,
};
pub use schema::{load_schema, load_schema_str};
