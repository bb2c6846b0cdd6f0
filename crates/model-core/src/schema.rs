//! Entity class declarations loaded from YAML.
//!
//! A schema file lists entity classes the same way they would be built with
//! [`ClassDef::builder`]:
//!
//! ```yaml
//! classes:
//!   - name: Order
//!     attributes: [id, myName, secret, customer, lines]
//!     fields:
//!       myName: name      # JSON field "name"
//!       secret: null      # never read from or written to JSON
//!     entities:
//!       customer: Customer
//!       lines: [OrderLine]
//!     rules:
//!       - attributes: [id]
//!         validator: required
//!       - attributes: [customer, lines]
//!         validator: entity
//! ```
//!
//! Validator names are resolved through a [`ValidatorTable`], so crates that
//! provide validators (such as the entity validator) plug in without this
//! crate knowing about them.

use crate::entity::ClassSpec;
use crate::error::ModelError;
use crate::record::{register_class, ClassDef};
use crate::registry::is_registered;
use crate::validate::{Required, Rule, Validator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Nested entity declaration is neither a class name nor a one-class list
    #[error("Invalid entity declaration for attribute '{attribute}' of class '{class}': {spec}")]
    InvalidEntitySpec {
        class: String,
        attribute: String,
        spec: String,
    },

    /// Attribute referenced by fields/entities/rules is not declared
    #[error("Attribute '{attribute}' is not declared by class '{class}'")]
    UnknownAttribute { class: String, attribute: String },

    /// Rule names a validator missing from the validator table
    #[error("Unknown validator '{validator}' in class '{class}'")]
    UnknownValidator { class: String, validator: String },

    /// Validator factory rejected the rule configuration
    #[error("Invalid rule in class '{class}': {message}")]
    InvalidRule { class: String, message: String },

    /// Class registration failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

// ============================================================================
// Schema Types
// ============================================================================

/// Nested entity declaration as written in YAML.
///
/// Valid shapes are a class name (`Customer`) or a list holding exactly one
/// class name (`[OrderLine]`). Anything else is kept verbatim so that the
/// error can show what was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawClassSpec(pub serde_yaml::Value);

impl RawClassSpec {
    /// Interpret the declaration, or `None` if it is malformed.
    pub fn resolve(&self) -> Option<ClassSpec> {
        match &self.0 {
            serde_yaml::Value::String(class) if !class.is_empty() => {
                Some(ClassSpec::One(class.clone()))
            }
            serde_yaml::Value::Sequence(items) => match items.as_slice() {
                [serde_yaml::Value::String(class)] if !class.is_empty() => {
                    Some(ClassSpec::Many(class.clone()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Render the declaration for error messages.
    pub fn describe(&self) -> String {
        serde_yaml::to_string(&self.0)
            .map(|s| s.trim().replace('\n', " "))
            .unwrap_or_else(|_| format!("{:?}", self.0))
    }
}

impl From<&ClassSpec> for RawClassSpec {
    fn from(spec: &ClassSpec) -> Self {
        let class = serde_yaml::Value::String(spec.class().to_string());
        match spec {
            ClassSpec::One(_) => Self(class),
            ClassSpec::Many(_) => Self(serde_yaml::Value::Sequence(vec![class])),
        }
    }
}

/// A validation rule as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSchema {
    /// Attributes checked by the rule
    pub attributes: Vec<String>,

    /// Validator name, resolved through a [`ValidatorTable`]
    pub validator: String,

    /// Optional class for validators that need one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<RawClassSpec>,
}

/// An entity class as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Class name
    pub name: String,

    /// Declared attributes, in order
    pub attributes: Vec<String>,

    /// Attributes assignable from untrusted input (default: all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<Vec<String>>,

    /// Field overrides; `null` or `""` excludes the attribute from JSON
    #[serde(default)]
    pub fields: IndexMap<String, Option<String>>,

    /// Nested entity declarations
    #[serde(default)]
    pub entities: IndexMap<String, RawClassSpec>,

    /// Validation rules
    #[serde(default)]
    pub rules: Vec<RuleSchema>,
}

impl ClassSchema {
    fn check_attribute(&self, attribute: &str) -> Result<(), SchemaError> {
        if self.attributes.iter().any(|a| a == attribute) {
            Ok(())
        } else {
            Err(SchemaError::UnknownAttribute {
                class: self.name.clone(),
                attribute: attribute.to_string(),
            })
        }
    }

    /// Build the runtime class definition.
    pub fn to_class_def(
        &self,
        validators: &ValidatorTable,
    ) -> Result<Arc<ClassDef>, SchemaError> {
        let mut builder =
            ClassDef::builder(&self.name).attributes(self.attributes.iter().cloned());

        if let Some(safe) = &self.safe {
            for attribute in safe {
                self.check_attribute(attribute)?;
            }
            builder = builder.safe(safe.iter().cloned());
        }

        for (attribute, field) in &self.fields {
            self.check_attribute(attribute)?;
            builder = match field {
                Some(field) => builder.field(attribute, field),
                None => builder.exclude(attribute),
            };
        }

        for (attribute, raw) in &self.entities {
            self.check_attribute(attribute)?;
            let spec = raw.resolve().ok_or_else(|| SchemaError::InvalidEntitySpec {
                class: self.name.clone(),
                attribute: attribute.clone(),
                spec: raw.describe(),
            })?;
            builder = builder.entity(attribute, spec);
        }

        for rule in &self.rules {
            for attribute in &rule.attributes {
                self.check_attribute(attribute)?;
            }
            let factory =
                validators
                    .get(&rule.validator)
                    .ok_or_else(|| SchemaError::UnknownValidator {
                        class: self.name.clone(),
                        validator: rule.validator.clone(),
                    })?;
            let validator = factory(rule).map_err(|message| SchemaError::InvalidRule {
                class: self.name.clone(),
                message,
            })?;
            builder = builder.rule(Rule {
                attributes: rule.attributes.clone(),
                validator,
            });
        }

        Ok(builder.build())
    }
}

fn default_version() -> u32 {
    1
}

/// Full schema: a list of entity classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Class declarations
    pub classes: Vec<ClassSchema>,
}

impl Schema {
    /// Load schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse schema from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Get a class declaration by name.
    pub fn get_class(&self, name: &str) -> Option<&ClassSchema> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Get all class names in the schema.
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }

    /// Build runtime class definitions for every class.
    pub fn class_defs(
        &self,
        validators: &ValidatorTable,
    ) -> Result<Vec<Arc<ClassDef>>, SchemaError> {
        self.classes
            .iter()
            .map(|class| class.to_class_def(validators))
            .collect()
    }

    /// Build every class and register it in the class registry.
    ///
    /// All definitions are built and their names checked against the
    /// registry and each other before the first registration, so a malformed
    /// or duplicate class leaves the registry untouched. A class registered
    /// concurrently by another thread can still fail the batch halfway.
    pub fn register(
        &self,
        validators: &ValidatorTable,
    ) -> Result<Vec<Arc<ClassDef>>, SchemaError> {
        let defs = self.class_defs(validators)?;

        let mut names = HashSet::new();
        for def in &defs {
            if is_registered(&def.name) || !names.insert(def.name.as_str()) {
                return Err(ModelError::DuplicateClass(def.name.clone()).into());
            }
        }

        for def in &defs {
            register_class(Arc::clone(def))?;
        }
        Ok(defs)
    }
}

// ============================================================================
// Validator Table
// ============================================================================

/// Builds a validator from its YAML rule; errors are reported as messages.
pub type ValidatorFactory = fn(&RuleSchema) -> Result<Arc<dyn Validator>, String>;

/// Named validator factories used to resolve `validator:` in rules.
#[derive(Clone, Default)]
pub struct ValidatorTable {
    factories: HashMap<String, ValidatorFactory>,
}

impl fmt::Debug for ValidatorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl ValidatorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the validators provided by this crate (`required`).
    pub fn core() -> Self {
        Self::new().with("required", |_| Ok(Arc::new(Required)))
    }

    /// Add (or replace) a named validator.
    pub fn with(mut self, name: impl Into<String>, factory: ValidatorFactory) -> Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Look up a validator factory by name.
    pub fn get(&self, name: &str) -> Option<ValidatorFactory> {
        self.factories.get(name).copied()
    }

    /// Registered validator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ============================================================================
// Tests
// ============================================================================
