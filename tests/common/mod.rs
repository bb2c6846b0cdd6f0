//! Helpers shared by the integration tests.

#![allow(dead_code)]

use json_entity::JsonMap;

/// Install a test subscriber; later calls are no-ops.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("json_entity=debug,entity_json=trace,model_core=debug")
        .with_test_writer()
        .try_init()
        .ok(); // Ignore if already initialized
}

/// Unwrap a `json!` literal into a JSON object.
pub fn document(json: serde_json::Value) -> JsonMap {
    match json {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
