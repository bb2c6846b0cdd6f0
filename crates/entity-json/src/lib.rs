//! JSON conversion for model-core entities.
//!
//! This crate converts between JSON documents and [`Entity`] instances,
//! honouring each entity's field map, nested entity declarations and custom
//! converters, and provides a validator for nested entity attributes.
//!
//! # Modules
//!
//! - [`forward`] - entity → JSON document
//! - [`reverse`] - JSON document → entity, child construction
//! - [`validator`] - nested entity validation
//!
//! # Example
//!
//! ```
//! use entity_json::EntityJson;
//! use model_core::{ClassDef, Model, Record, Value};
//! use serde_json::json;
//!
//! let class = ClassDef::builder("Article")
//!     .attributes(["title", "authorName"])
//!     .build();
//!
//! let mut article = Record::new(class);
//! let doc = json!({"title": "Hello", "author_name": "Ann"});
//! article.set_json(doc.as_object().unwrap()).unwrap();
//!
//! assert_eq!(article.attribute("authorName"), Some(&Value::from("Ann")));
//! assert_eq!(serde_json::Value::Object(article.json().unwrap()), doc);
//! ```

pub mod error;
pub mod forward;
pub mod reverse;
pub mod validator;

#[cfg(test)]
mod fixtures;

pub use error::EntityError;
pub use forward::{to_json, to_json_string, value_to_json};
pub use reverse::{build_child, create, from_json, from_json_str};
pub use validator::{entity_validator, standard_validators, EntityValidator};

use model_core::Entity;

/// A JSON object.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// JSON accessors for entities.
pub trait EntityJson {
    /// The entity as a JSON document.
    fn json(&self) -> Result<JsonMap, EntityError>;

    /// Populate from a JSON document, skipping unknown fields.
    fn set_json(&mut self, json: &JsonMap) -> Result<(), EntityError>;

    /// Populate from a JSON document, rejecting unknown fields.
    fn set_json_strict(&mut self, json: &JsonMap) -> Result<(), EntityError>;
}

impl<T: Entity> EntityJson for T {
    fn json(&self) -> Result<JsonMap, EntityError> {
        to_json(self)
    }

    fn set_json(&mut self, json: &JsonMap) -> Result<(), EntityError> {
        from_json(self, json, true)
    }

    fn set_json_strict(&mut self, json: &JsonMap) -> Result<(), EntityError> {
        from_json(self, json, false)
    }
}

impl EntityJson for dyn Entity {
    fn json(&self) -> Result<JsonMap, EntityError> {
        to_json(self)
    }

    fn set_json(&mut self, json: &JsonMap) -> Result<(), EntityError> {
        from_json(self, json, true)
    }

    fn set_json_strict(&mut self, json: &JsonMap) -> Result<(), EntityError> {
        from_json(self, json, false)
    }
}
