//! The model contract: an ordered attribute bag with validation rules.

use crate::error::ModelError;
use crate::object::Object;
use crate::validate::Rule;
use crate::values::Value;
use indexmap::IndexMap;

/// How a bulk assignment treats attributes that are not marked safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Caller already listed known attributes; every one of them is set.
    Trusted,
    /// External input; attributes outside [`Model::safe_attributes`] are dropped.
    Untrusted,
}

/// A typed object with a fixed, ordered set of named attributes.
pub trait Model: Object {
    /// Declared attribute names, in declaration order.
    fn attributes(&self) -> Vec<String>;

    /// Current value of a declared attribute.
    ///
    /// Returns `None` for undeclared attributes. Declared attributes that
    /// were never assigned may return `None` or `Some(&Value::Null)`.
    fn attribute(&self, name: &str) -> Option<&Value>;

    /// Set a single declared attribute.
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError>;

    /// Attributes that may be set from untrusted input.
    fn safe_attributes(&self) -> Vec<String> {
        self.attributes()
    }

    /// Validation rules attached to this model.
    fn rules(&self) -> Vec<Rule> {
        Vec::new()
    }

    /// Bulk read of every declared attribute, in declaration order.
    ///
    /// Unassigned attributes are reported as [`Value::Null`].
    fn attribute_values(&self) -> IndexMap<String, Value> {
        self.attributes()
            .into_iter()
            .map(|name| {
                let value = self.attribute(&name).cloned().unwrap_or_default();
                (name, value)
            })
            .collect()
    }

    /// Bulk assignment.
    ///
    /// With [`Assignment::Trusted`] every entry is set and an undeclared
    /// attribute is an error. With [`Assignment::Untrusted`] entries outside
    /// [`Model::safe_attributes`] are skipped.
    fn assign(
        &mut self,
        values: IndexMap<String, Value>,
        mode: Assignment,
    ) -> Result<(), ModelError> {
        let safe = match mode {
            Assignment::Trusted => None,
            Assignment::Untrusted => Some(self.safe_attributes()),
        };

        for (name, value) in values {
            if let Some(safe) = &safe {
                if !safe.contains(&name) {
                    tracing::debug!(
                        "Skipping unsafe attribute '{}' of class '{}'",
                        name,
                        self.class_name()
                    );
                    continue;
                }
            }
            self.set_attribute(&name, value)?;
        }

        Ok(())
    }
}
