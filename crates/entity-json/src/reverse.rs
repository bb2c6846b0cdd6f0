//! Reverse conversion: JSON document → entity.
//!
//! Fields are resolved to attributes through the entity's field map, nested
//! entity declarations are instantiated through the class registry, and the
//! resulting values are assigned in a single batch.

use crate::error::EntityError;
use crate::forward::is_blank;
use crate::JsonMap;
use indexmap::IndexMap;
use model_core::{
    instantiate, is_excluded, Assignment, ClassSpec, Entity, EntityMap, FieldMap, FromJson,
    Object, Value,
};
use serde_json::Value as Json;

/// Populate an entity from a JSON document.
///
/// Fields that resolve to undeclared attributes are skipped when
/// `skip_unknown` is set and rejected otherwise. On error the entity is
/// left unchanged.
pub fn from_json(
    entity: &mut dyn Entity,
    json: &JsonMap,
    skip_unknown: bool,
) -> Result<(), EntityError> {
    let batch = convert_fields(entity, json, skip_unknown)?;

    if !batch.is_empty() {
        entity.assign(batch, Assignment::Trusted)?;
    }

    Ok(())
}

/// Populate an entity from JSON text.
///
/// The text must hold a JSON object.
pub fn from_json_str(
    entity: &mut dyn Entity,
    text: &str,
    skip_unknown: bool,
) -> Result<(), EntityError> {
    let json: JsonMap = serde_json::from_str(text)?;
    from_json(entity, &json, skip_unknown)
}

fn convert_fields(
    entity: &dyn Entity,
    json: &JsonMap,
    skip_unknown: bool,
) -> Result<IndexMap<String, Value>, EntityError> {
    let fields = entity.attribute_fields();
    let attributes = entity.attributes();
    let converters = entity.attributes_from_json();
    let entities = entity.attribute_entities();
    let mut batch = IndexMap::new();

    for (field, data) in json {
        let Some(attribute) = resolve_attribute(&fields, field) else {
            tracing::trace!(
                "Skipping excluded field '{}' of class '{}'",
                field,
                entity.class_name()
            );
            continue;
        };

        if !attributes.contains(&attribute) {
            if skip_unknown {
                tracing::trace!(
                    "Skipping unknown field '{}' of class '{}'",
                    field,
                    entity.class_name()
                );
                continue;
            }
            return Err(EntityError::UnknownAttribute {
                class: entity.class_name().to_string(),
                attribute,
            });
        }

        let value = match converters.get(&attribute) {
            Some(FromJson::Function(convert)) => convert(data, &attribute, entity)
                .map_err(|e| EntityError::converter(&attribute, e))?,
            Some(FromJson::Literal(literal)) => literal.clone(),
            None => json_to_value(entity.class_name(), &entities, &attribute, data)?,
        };

        batch.insert(attribute, value);
    }

    Ok(batch)
}

/// Resolve the attribute a JSON field is read into.
///
/// The first attribute mapped to `field` wins. A field that names an
/// excluded attribute resolves to nothing; any other field is taken as the
/// attribute name itself.
fn resolve_attribute(fields: &FieldMap, field: &str) -> Option<String> {
    let mapped = fields
        .iter()
        .find(|(_, mapped)| !is_excluded(mapped) && mapped.as_deref() == Some(field));
    if let Some((attribute, _)) = mapped {
        return Some(attribute.clone());
    }

    if fields.get(field).is_some_and(is_excluded) {
        return None;
    }

    Some(field.to_string())
}

fn json_to_value(
    class: &str,
    entities: &EntityMap,
    attribute: &str,
    data: &Json,
) -> Result<Value, EntityError> {
    if !(data.is_array() || data.is_object()) || is_blank(data) {
        return Ok(Value::from(data));
    }

    match entities.get(attribute) {
        None => Ok(Value::from(data)),
        Some(ClassSpec::One(child)) => build_child(child, data).map(Value::Object),
        Some(ClassSpec::Many(child)) => {
            let Json::Array(items) = data else {
                return Err(EntityError::NotAList {
                    class: class.to_string(),
                    attribute: attribute.to_string(),
                    expected: child.clone(),
                });
            };

            items
                .iter()
                .map(|item| build_child(child, item).map(Value::Object))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
    }
}

// ============================================================================
// Child construction
// ============================================================================

/// Build an instance of `class` from arbitrary JSON data.
///
/// Non-object data is first coerced to an object: arrays are keyed by
/// position (`"0"`, `"1"`, ...) and any other value becomes `{"0": value}`.
/// Entities are populated with [`from_json`] (unknown fields skipped),
/// other models through untrusted bulk assignment, and plain objects field
/// by field. The instance is not validated.
pub fn build_child(class: &str, data: &Json) -> Result<Box<dyn Object>, EntityError> {
    create(class, &coerce_mapping(data))
}

/// Create an instance of `class` populated from a JSON document.
pub fn create(class: &str, json: &JsonMap) -> Result<Box<dyn Object>, EntityError> {
    let mut object = instantiate(class)?;
    tracing::trace!("Building '{}' from {} fields", class, json.len());

    if let Some(entity) = object.as_entity_mut() {
        from_json(entity, json, true)?;
    } else if let Some(model) = object.as_model_mut() {
        let values = json
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect();
        model.assign(values, Assignment::Untrusted)?;
    } else {
        for (key, value) in json {
            if !object.set_field(key, Value::from(value)) {
                tracing::debug!("Class '{}' has no field '{}'", class, key);
            }
        }
    }

    Ok(object)
}

fn coerce_mapping(data: &Json) -> JsonMap {
    match data {
        Json::Object(map) => map.clone(),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item.clone()))
            .collect(),
        Json::Null => JsonMap::new(),
        scalar => [("0".to_string(), scalar.clone())].into_iter().collect(),
    }
}
