//! Validation rule dispatch.
//!
//! A model lists its [`Rule`]s; [`validate`] routes every attribute named by
//! a rule to the rule's [`Validator`] and collects the per-attribute failures.

use crate::error::{AttributeError, ModelError, RuleError, ValidationErrors};
use crate::model::Model;
use std::fmt;
use std::sync::Arc;

/// A validation rule for a single attribute.
pub trait Validator: fmt::Debug + Send + Sync {
    /// Validate (and possibly normalize) `attribute` of `model`.
    fn validate_attribute(&self, model: &mut dyn Model, attribute: &str)
        -> Result<(), RuleError>;
}

/// A validator bound to the attributes it checks.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Attributes checked by this rule, in order
    pub attributes: Vec<String>,
    /// The validator applied to each attribute
    pub validator: Arc<dyn Validator>,
}

impl Rule {
    /// Create a rule applying `validator` to `attributes`.
    pub fn new<I, S>(attributes: I, validator: impl Validator + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            validator: Arc::new(validator),
        }
    }
}

/// Run every rule of a model, collecting validation failures by attribute.
///
/// An attribute that already failed is not checked by later rules.
/// Configuration errors abort immediately.
pub fn validate(model: &mut dyn Model) -> Result<(), ModelError> {
    let mut errors = ValidationErrors::new();

    for rule in model.rules() {
        for attribute in &rule.attributes {
            if errors.has(attribute) {
                continue;
            }

            match rule.validator.validate_attribute(model, attribute) {
                Ok(()) => {}
                Err(RuleError::Invalid(error)) => {
                    tracing::debug!(
                        "Attribute '{}' of class '{}' failed validation: {}",
                        attribute,
                        model.class_name(),
                        error
                    );
                    errors.add(attribute.as_str(), error);
                }
                Err(RuleError::InvalidConfig(message)) => {
                    return Err(ModelError::InvalidConfig(message));
                }
                Err(RuleError::Model(error)) => return Err(error),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ModelError::ValidationFailed(errors))
    }
}

// ============================================================================
// Built-in validators
// ============================================================================

/// Fails when the attribute is null, an empty string, or an empty collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator for Required {
    fn validate_attribute(
        &self,
        model: &mut dyn Model,
        attribute: &str,
    ) -> Result<(), RuleError> {
        match model.attribute(attribute) {
            Some(value) if !value.is_empty() => Ok(()),
            _ => Err(AttributeError::Blank.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ClassDef, Record};
    use crate::values::Value;

    #[derive(Debug)]
    struct Misconfigured;

    impl Validator for Misconfigured {
        fn validate_attribute(&self, _: &mut dyn Model, _: &str) -> Result<(), RuleError> {
            Err(RuleError::InvalidConfig("missing class".to_string()))
        }
    }

    #[derive(Debug)]
    struct AlwaysInvalid;

    impl Validator for AlwaysInvalid {
        fn validate_attribute(&self, _: &mut dyn Model, _: &str) -> Result<(), RuleError> {
            Err(AttributeError::Message("nope".to_string()).into())
        }
    }

    #[test]
    fn test_required_collects_errors_per_attribute() {
        let class = ClassDef::builder("ValidateTests.Required")
            .attributes(["name", "title", "count"])
            .rule(Rule::new(["name", "title", "count"], Required))
            .build();

        let mut record = Record::new(class);
        record.set_attribute("name", Value::from("set")).unwrap();
        record.set_attribute("count", Value::from(0)).unwrap();

        let err = validate(&mut record).unwrap_err();
        let ModelError::ValidationFailed(errors) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("title"), Some(&[AttributeError::Blank][..]));
    }

    #[test]
    fn test_failed_attribute_skips_later_rules() {
        let class = ClassDef::builder("ValidateTests.Skip")
            .attributes(["name"])
            .rule(Rule::new(["name"], Required))
            .rule(Rule::new(["name"], AlwaysInvalid))
            .build();

        let mut record = Record::new(class);
        let Err(ModelError::ValidationFailed(errors)) = validate(&mut record) else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get("name"), Some(&[AttributeError::Blank][..]));
    }

    #[test]
    fn test_configuration_error_aborts() {
        let class = ClassDef::builder("ValidateTests.Config")
            .attributes(["name", "child"])
            .rule(Rule::new(["child"], Misconfigured))
            .rule(Rule::new(["name"], Required))
            .build();

        let mut record = Record::new(class);
        assert_eq!(
            validate(&mut record),
            Err(ModelError::InvalidConfig("missing class".to_string()))
        );
    }

    #[test]
    fn test_valid_model_passes() {
        let class = ClassDef::builder("ValidateTests.Valid")
            .attributes(["name"])
            .rule(Rule::new(["name"], Required))
            .build();

        let mut record = Record::new(class);
        record.set_attribute("name", Value::from("x")).unwrap();
        assert!(validate(&mut record).is_ok());
    }
}
