//! Error types for model operations and validation.

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Validation-level errors
// ============================================================================

/// Validation failure for a single attribute.
///
/// These are reported back through [`ValidationErrors`]; they never abort
/// validation of the remaining attributes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    /// Value is not an instance of the declared class
    #[error("must be an instance of {expected}")]
    TypeMismatch { expected: String },

    /// Attribute declared as a list of entities holds something else
    #[error("must be a list")]
    NotAList,

    /// Required attribute is empty
    #[error("cannot be blank")]
    Blank,

    /// Nested object failed its own validation
    #[error("invalid nested value ({0})")]
    Nested(ValidationErrors),

    /// Free-form message from a custom validator
    #[error("{0}")]
    Message(String),
}

/// Validation errors collected per attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<String, Vec<AttributeError>>);

impl ValidationErrors {
    /// Create an empty error collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for an attribute.
    pub fn add(&mut self, attribute: impl Into<String>, error: AttributeError) {
        self.0.entry(attribute.into()).or_default().push(error);
    }

    /// Errors recorded for an attribute.
    pub fn get(&self, attribute: &str) -> Option<&[AttributeError]> {
        self.0.get(attribute).map(Vec::as_slice)
    }

    /// Check whether an attribute has any errors.
    pub fn has(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// Check whether no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of attributes with errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over attributes and their errors.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AttributeError])> {
        self.0
            .iter()
            .map(|(attribute, errors)| (attribute.as_str(), errors.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (attribute, errors) in self.iter() {
            for error in errors {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{attribute}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Model errors
// ============================================================================

/// Error type for model, registry and validation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Attribute is not declared by the class
    #[error("Unknown attribute '{attribute}' for class '{class}'")]
    UnknownAttribute { class: String, attribute: String },

    /// Class name is not registered
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Class name is already registered
    #[error("Class already registered: {0}")]
    DuplicateClass(String),

    /// Programmer error in class or validator configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// One or more attributes failed validation
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),
}

/// Error returned by a single validation rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// Attribute value is invalid; reported, validation continues
    #[error(transparent)]
    Invalid(#[from] AttributeError),

    /// Rule cannot run; aborts validation
    #[error("Invalid validator configuration: {0}")]
    InvalidConfig(String),

    /// Model operation failed while applying the rule; aborts validation
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add("name", AttributeError::Blank);
        errors.add(
            "child",
            AttributeError::TypeMismatch {
                expected: "Child".to_string(),
            },
        );

        assert_eq!(errors.len(), 2);
        assert!(errors.has("name"));
        assert_eq!(
            errors.to_string(),
            "child: must be an instance of Child; name: cannot be blank"
        );
    }

    #[test]
    fn test_nested_error_message_includes_inner_errors() {
        let mut inner = ValidationErrors::new();
        inner.add("title", AttributeError::Blank);

        let error = AttributeError::Nested(inner);
        assert_eq!(error.to_string(), "invalid nested value (title: cannot be blank)");
    }
}
