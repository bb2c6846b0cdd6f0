//! Attribute validator for nested entities.
//!
//! [`EntityValidator`] checks that an attribute holds an instance (or a list
//! of instances) of a declared class. Raw maps are first turned into
//! instances, and nested models are validated in turn.

use crate::error::EntityError;
use crate::forward::map_to_json;
use crate::reverse::create;
use model_core::{
    validate, AttributeError, ClassSpec, Model, ModelError, Object, RuleError, RuleSchema,
    Validator, ValidatorTable, Value,
};
use std::sync::Arc;

/// Validates that an attribute holds entities of a class.
///
/// Without an explicit class, the class is looked up in the host entity's
/// [`attribute_entities`](model_core::Entity::attribute_entities) each time
/// the rule runs.
#[derive(Debug, Clone, Default)]
pub struct EntityValidator {
    class: Option<ClassSpec>,
}

impl EntityValidator {
    /// Validator inferring its class from the host entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with an explicit class.
    pub fn with_class(class: ClassSpec) -> Self {
        Self { class: Some(class) }
    }

    /// The explicitly configured class, if any.
    pub fn class(&self) -> Option<&ClassSpec> {
        self.class.as_ref()
    }

    fn resolve_class(&self, model: &dyn Model, attribute: &str) -> Result<ClassSpec, RuleError> {
        if let Some(class) = &self.class {
            return Ok(class.clone());
        }

        let inferred = model
            .as_entity()
            .and_then(|entity| entity.attribute_entities().get(attribute).cloned());

        match inferred {
            Some(class) => {
                tracing::debug!(
                    "Inferred class {} for attribute '{}' of class '{}'",
                    class,
                    attribute,
                    model.class_name()
                );
                Ok(class)
            }
            None => Err(RuleError::InvalidConfig(format!(
                "no entity class configured for attribute '{}' of class '{}'",
                attribute,
                model.class_name()
            ))),
        }
    }
}

impl Validator for EntityValidator {
    fn validate_attribute(
        &self,
        model: &mut dyn Model,
        attribute: &str,
    ) -> Result<(), RuleError> {
        let class = self.resolve_class(model, attribute)?;
        let value = model.attribute(attribute).cloned().unwrap_or_default();

        if value.is_empty() {
            model.set_attribute(attribute, Value::Null)?;
            return Ok(());
        }

        let value = match &class {
            ClassSpec::One(class) => coerce(attribute, value, class)?,
            ClassSpec::Many(class) => {
                let Value::List(items) = value else {
                    return Err(AttributeError::NotAList.into());
                };
                let items = items
                    .into_iter()
                    .map(|item| coerce(attribute, item, class))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::List(items)
            }
        };

        model.set_attribute(attribute, value)?;
        Ok(())
    }
}

fn coerce(attribute: &str, value: Value, class: &str) -> Result<Value, RuleError> {
    let mut object = match value {
        Value::Map(map) => {
            let json = map_to_json(attribute, &map).map_err(build_error)?;
            create(class, &json).map_err(build_error)?
        }
        Value::Object(object) => object,
        _ => return Err(type_mismatch(class)),
    };

    if !object.is_a(class) {
        return Err(type_mismatch(class));
    }

    validate_nested(object.as_mut())?;
    Ok(Value::Object(object))
}

fn validate_nested(object: &mut dyn Object) -> Result<(), RuleError> {
    let Some(model) = object.as_model_mut() else {
        return Ok(());
    };

    match validate(model) {
        Ok(()) => Ok(()),
        Err(ModelError::ValidationFailed(errors)) => Err(AttributeError::Nested(errors).into()),
        Err(error) => Err(error.into()),
    }
}

fn type_mismatch(class: &str) -> RuleError {
    AttributeError::TypeMismatch {
        expected: class.to_string(),
    }
    .into()
}

/// Registry and configuration failures abort validation; anything else is a
/// bad value for this attribute.
fn build_error(error: EntityError) -> RuleError {
    match error {
        EntityError::Model(error) => RuleError::Model(error),
        other => AttributeError::Message(other.to_string()).into(),
    }
}

// ============================================================================
// Schema integration
// ============================================================================

/// Build an [`EntityValidator`] from a schema rule's optional `class`.
pub fn entity_validator(rule: &RuleSchema) -> Result<Arc<dyn Validator>, String> {
    let validator = match &rule.class {
        None => EntityValidator::new(),
        Some(raw) => match raw.resolve() {
            Some(class) => EntityValidator::with_class(class),
            None => return Err(format!("invalid entity class {}", raw.describe())),
        },
    };
    Ok(Arc::new(validator))
}

/// Validators available to schema files: `required` and `entity`.
pub fn standard_validators() -> ValidatorTable {
    ValidatorTable::core().with("entity", entity_validator)
}
