//! Error type for entity conversion.

use model_core::ModelError;

/// Error type for JSON ↔ entity conversion.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// Field resolves to an attribute the class does not declare
    #[error("Unknown attribute '{attribute}' for class '{class}'")]
    UnknownAttribute { class: String, attribute: String },

    /// Attribute declared as a list of entities received a non-array value
    #[error("Attribute '{attribute}' of class '{class}' expects a list of {expected}")]
    NotAList {
        class: String,
        attribute: String,
        expected: String,
    },

    /// Custom converter returned an error
    #[error("Converter for attribute '{attribute}' failed: {source}")]
    Converter {
        attribute: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Attribute holds an object with no JSON representation
    #[error("Attribute '{attribute}' holds a '{class}' object that cannot be converted to JSON")]
    Unserializable { attribute: String, class: String },

    /// Registry or model operation failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// JSON text could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EntityError {
    pub(crate) fn converter(attribute: &str, error: anyhow::Error) -> Self {
        Self::Converter {
            attribute: attribute.to_string(),
            source: error.into(),
        }
    }
}
