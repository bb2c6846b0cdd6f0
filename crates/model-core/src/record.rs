//! Schema-driven dynamic entities.
//!
//! A [`Record`] is an [`Entity`] whose shape is described at runtime by a
//! [`ClassDef`]: attribute list, field overrides, nested entity declarations,
//! converters and rules. Class definitions are built in code with
//! [`ClassDef::builder`] or loaded from YAML through [`crate::schema::Schema`].

use crate::entity::{
    snake_case_fields, ClassSpec, Entity, EntityMap, FieldMap, FromJson, FromJsonMap,
    ToJson, ToJsonMap,
};
use crate::error::ModelError;
use crate::model::Model;
use crate::object::Object;
use crate::registry;
use crate::validate::Rule;
use crate::values::Value;
use indexmap::IndexMap;
use std::any::Any;
use std::sync::{Arc, OnceLock};

static NULL: Value = Value::Null;

/// Runtime description of an entity class.
#[derive(Debug)]
pub struct ClassDef {
    /// Class name (class identity)
    pub name: String,

    /// Declared attributes, in order
    pub attributes: Vec<String>,

    /// Attributes assignable from untrusted input (`None` = all)
    pub safe: Option<Vec<String>>,

    /// Field overrides merged onto the default camelCase → snake_case map
    pub fields: FieldMap,

    /// Nested entity declarations
    pub entities: EntityMap,

    /// Custom attribute → JSON converters
    pub to_json: ToJsonMap,

    /// Custom JSON → attribute converters
    pub from_json: FromJsonMap,

    /// Validation rules
    pub rules: Vec<Rule>,

    // Derived from `attributes` on first use.
    default_fields: OnceLock<Arc<FieldMap>>,
}

impl Clone for ClassDef {
    /// The copy starts with an empty default field map.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            safe: self.safe.clone(),
            fields: self.fields.clone(),
            entities: self.entities.clone(),
            to_json: self.to_json.clone(),
            from_json: self.from_json.clone(),
            rules: self.rules.clone(),
            default_fields: OnceLock::new(),
        }
    }
}

impl ClassDef {
    /// Start building a class definition.
    pub fn builder(name: impl Into<String>) -> ClassDefBuilder {
        ClassDefBuilder {
            def: ClassDef {
                name: name.into(),
                attributes: Vec::new(),
                safe: None,
                fields: FieldMap::new(),
                entities: EntityMap::new(),
                to_json: ToJsonMap::new(),
                from_json: FromJsonMap::new(),
                rules: Vec::new(),
                default_fields: OnceLock::new(),
            },
        }
    }

    /// Check whether an attribute is declared.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Default camelCase → snake_case field map of the declared attributes.
    ///
    /// Computed once per definition. Two definitions sharing a name keep
    /// separate maps.
    pub fn default_fields(&self) -> Arc<FieldMap> {
        let map = self.default_fields.get_or_init(|| {
            let map = snake_case_fields(self.attributes.iter().cloned());
            tracing::debug!(
                "Computed attribute field map for class '{}': {:?}",
                self.name,
                map
            );
            Arc::new(map)
        });
        Arc::clone(map)
    }
}

/// Builder for [`ClassDef`].
#[derive(Debug)]
pub struct ClassDefBuilder {
    def: ClassDef,
}

impl ClassDefBuilder {
    /// Append declared attributes.
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def
            .attributes
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Restrict untrusted assignment to these attributes.
    pub fn safe<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def.safe = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Map an attribute to a JSON field name.
    pub fn field(mut self, attribute: impl Into<String>, field: impl Into<String>) -> Self {
        self.def
            .fields
            .insert(attribute.into(), Some(field.into()));
        self
    }

    /// Exclude an attribute from JSON in both directions.
    pub fn exclude(mut self, attribute: impl Into<String>) -> Self {
        self.def.fields.insert(attribute.into(), None);
        self
    }

    /// Declare a nested entity attribute.
    pub fn entity(mut self, attribute: impl Into<String>, spec: ClassSpec) -> Self {
        self.def.entities.insert(attribute.into(), spec);
        self
    }

    /// Register a custom to-JSON converter.
    pub fn to_json(mut self, attribute: impl Into<String>, converter: ToJson) -> Self {
        self.def.to_json.insert(attribute.into(), converter);
        self
    }

    /// Register a custom from-JSON converter.
    pub fn from_json(mut self, attribute: impl Into<String>, converter: FromJson) -> Self {
        self.def.from_json.insert(attribute.into(), converter);
        self
    }

    /// Attach a validation rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.def.rules.push(rule);
        self
    }

    /// Finish the definition.
    pub fn build(self) -> Arc<ClassDef> {
        Arc::new(self.def)
    }
}

/// Register a class definition so it can be instantiated by name.
pub fn register_class(def: Arc<ClassDef>) -> Result<(), ModelError> {
    let name = def.name.clone();
    registry::register_factory(name, move || Box::new(Record::new(Arc::clone(&def))))
}

// ============================================================================
// Record
// ============================================================================

/// Dynamic entity instance of a [`ClassDef`].
#[derive(Debug, Clone)]
pub struct Record {
    class: Arc<ClassDef>,
    values: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty instance.
    pub fn new(class: Arc<ClassDef>) -> Self {
        Self {
            class,
            values: IndexMap::new(),
        }
    }

    /// Builder-style assignment of a declared attribute.
    ///
    /// Undeclared attributes are ignored.
    pub fn with(mut self, attribute: &str, value: impl Into<Value>) -> Self {
        if self.class.has_attribute(attribute) {
            self.values.insert(attribute.to_string(), value.into());
        } else {
            tracing::debug!(
                "Ignoring undeclared attribute '{}' of class '{}'",
                attribute,
                self.class.name
            );
        }
        self
    }

    /// The class definition of this record.
    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }
}

impl PartialEq for Record {
    /// Records are equal when they share a class name and every declared
    /// attribute holds the same value (unset counts as null).
    fn eq(&self, other: &Self) -> bool {
        self.class.name == other.class.name
            && self.class.attributes.iter().all(|attribute| {
                self.attribute(attribute).unwrap_or(&Value::Null)
                    == other.attribute(attribute).unwrap_or(&Value::Null)
            })
    }
}

impl Object for Record {
    fn class_name(&self) -> &str {
        &self.class.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        crate::object::object_eq(self, other)
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        self.set_attribute(name, value).is_ok()
    }

    fn as_model(&self) -> Option<&dyn Model> {
        Some(self)
    }

    fn as_model_mut(&mut self) -> Option<&mut dyn Model> {
        Some(self)
    }

    fn as_entity(&self) -> Option<&dyn Entity> {
        Some(self)
    }

    fn as_entity_mut(&mut self) -> Option<&mut dyn Entity> {
        Some(self)
    }
}

impl Model for Record {
    fn attributes(&self) -> Vec<String> {
        self.class.attributes.clone()
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        if !self.class.has_attribute(name) {
            return None;
        }
        Some(self.values.get(name).unwrap_or(&NULL))
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        if !self.class.has_attribute(name) {
            return Err(ModelError::UnknownAttribute {
                class: self.class.name.clone(),
                attribute: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    fn safe_attributes(&self) -> Vec<String> {
        self.class
            .safe
            .clone()
            .unwrap_or_else(|| self.class.attributes.clone())
    }

    fn rules(&self) -> Vec<Rule> {
        self.class.rules.clone()
    }
}

impl Entity for Record {
    fn attribute_fields(&self) -> FieldMap {
        let mut fields = self.class.default_fields().as_ref().clone();
        fields.extend(self.class.fields.clone());
        fields
    }

    fn attribute_entities(&self) -> EntityMap {
        self.class.entities.clone()
    }

    fn attributes_to_json(&self) -> ToJsonMap {
        self.class.to_json.clone()
    }

    fn attributes_from_json(&self) -> FromJsonMap {
        self.class.from_json.clone()
    }
}
