//! Loading entity classes from YAML schema files.

use anyhow::Context;
use entity_json::standard_validators;
use model_core::{ClassDef, Schema};
use std::path::Path;
use std::sync::Arc;

/// Load a schema file and register every class it declares.
///
/// Rules may use the `required` and `entity` validators. Classes are only
/// registered once all of them have been built.
pub fn load_schema(path: impl AsRef<Path>) -> anyhow::Result<Vec<Arc<ClassDef>>> {
    let path = path.as_ref();
    let schema = Schema::from_file(path)
        .with_context(|| format!("Failed to load entity schema from {path:?}"))?;
    register(&schema).with_context(|| format!("Failed to register classes from {path:?}"))
}

/// Parse a YAML schema and register every class it declares.
pub fn load_schema_str(yaml: &str) -> anyhow::Result<Vec<Arc<ClassDef>>> {
    let schema = Schema::from_yaml(yaml).context("Failed to parse entity schema")?;
    register(&schema).context("Failed to register entity classes")
}

fn register(schema: &Schema) -> anyhow::Result<Vec<Arc<ClassDef>>> {
    let defs = schema.register(&standard_validators())?;
    tracing::debug!(
        "Registered {} entity classes: {:?}",
        defs.len(),
        schema.class_names()
    );
    Ok(defs)
}
