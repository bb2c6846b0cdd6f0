//! Forward conversion: entity → JSON document.
//!
//! Attributes are written in declaration order under their mapped field
//! names. Empty results (`null`, `""`, `[]`, `{}`) are left out of the
//! document.

use crate::error::EntityError;
use crate::JsonMap;
use indexmap::IndexMap;
use model_core::{is_excluded, Entity, Object, ToJson, ToJsonMap, Value};
use serde_json::Value as Json;

/// Convert an entity to a JSON document.
pub fn to_json(entity: &dyn Entity) -> Result<JsonMap, EntityError> {
    let fields = entity.attribute_fields();
    let converters = entity.attributes_to_json();
    let mut json = JsonMap::new();

    for (attribute, value) in entity.attribute_values() {
        let field = match fields.get(&attribute) {
            Some(field) if is_excluded(field) => continue,
            Some(Some(field)) => field.clone(),
            _ => attribute.clone(),
        };

        let data = attribute_to_json(entity, &converters, &attribute, &value)?;
        if is_blank(&data) {
            tracing::trace!(
                "Omitting empty attribute '{}' of class '{}'",
                attribute,
                entity.class_name()
            );
            continue;
        }

        json.insert(field, data);
    }

    Ok(json)
}

/// Convert an entity to JSON text.
pub fn to_json_string(entity: &dyn Entity) -> Result<String, EntityError> {
    Ok(serde_json::to_string(&to_json(entity)?)?)
}

/// Check whether a JSON value is omitted from output.
pub(crate) fn is_blank(json: &Json) -> bool {
    match json {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        Json::Array(items) => items.is_empty(),
        Json::Object(map) => map.is_empty(),
        Json::Bool(_) | Json::Number(_) => false,
    }
}

fn attribute_to_json(
    entity: &dyn Entity,
    converters: &ToJsonMap,
    attribute: &str,
    value: &Value,
) -> Result<Json, EntityError> {
    match converters.get(attribute) {
        Some(ToJson::Function(convert)) => {
            convert(value, attribute, entity).map_err(|e| EntityError::converter(attribute, e))
        }
        Some(ToJson::Literal(literal)) => Ok(literal.clone()),
        None => value_to_json(attribute, value),
    }
}

/// Structural conversion of an attribute value to JSON.
///
/// Custom converters are not consulted. Inside lists and maps, elements
/// that convert to `null` are dropped.
pub fn value_to_json(attribute: &str, value: &Value) -> Result<Json, EntityError> {
    match value {
        Value::Null => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Number(n) => Ok(Json::Number(n.clone())),
        Value::String(s) => Ok(Json::String(s.clone())),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let json = value_to_json(attribute, item)?;
                if !json.is_null() {
                    out.push(json);
                }
            }
            Ok(Json::Array(out))
        }
        Value::Map(map) => map_to_json(attribute, map).map(Json::Object),
        Value::Object(object) => object_to_json(attribute, object.as_ref()),
    }
}

pub(crate) fn map_to_json(
    attribute: &str,
    map: &IndexMap<String, Value>,
) -> Result<JsonMap, EntityError> {
    let mut out = JsonMap::new();
    for (key, item) in map {
        let json = value_to_json(attribute, item)?;
        if !json.is_null() {
            out.insert(key.clone(), json);
        }
    }
    Ok(out)
}

fn object_to_json(attribute: &str, object: &dyn Object) -> Result<Json, EntityError> {
    if let Some(entity) = object.as_entity() {
        return to_json(entity).map(Json::Object);
    }

    if let Some(serializable) = object.as_json_serializable() {
        return Ok(serializable.json_serialize());
    }

    if let Some(model) = object.as_model() {
        return map_to_json(attribute, &model.attribute_values()).map(Json::Object);
    }

    Err(EntityError::Unserializable {
        attribute: attribute.to_string(),
        class: object.class_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Contact, Point};
    use chrono::{TimeZone, Utc};
    use model_core::{ClassDef, Record};
    use serde_json::json;
    use uuid::Uuid;

    fn sample() -> Record {
        fixtures::init();
        fixtures::sample()
    }

    #[test]
    fn test_scalars_and_field_names() {
        let entity = sample()
            .with("id", 7)
            .with("my_name", "Ann")
            .with("entityTitle", "Boss");

        let json = to_json(&entity).unwrap();
        assert_eq!(
            Json::Object(json),
            json!({"id": 7, "name": "Ann", "entity_title": "Boss"})
        );
    }

    #[test]
    fn test_output_follows_declaration_order() {
        let entity = sample()
            .with("entityTitle", "Boss")
            .with("my_name", "Ann")
            .with("id", 1);

        let keys: Vec<String> = to_json(&entity).unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "name", "entity_title"]);
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let entity = sample()
            .with("id", Value::Null)
            .with("my_name", "")
            .with("ids", Value::List(vec![]))
            .with("entityTitle", Value::Map(IndexMap::new()));

        assert!(to_json(&entity).unwrap().is_empty());
    }

    #[test]
    fn test_falsy_scalars_are_kept() {
        let entity = sample()
            .with("id", 0)
            .with("my_name", "0")
            .with("entityTitle", false);

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({"id": 0, "name": "0", "entity_title": false})
        );
    }

    #[test]
    fn test_nested_entities() {
        let child = sample().with("id", 2).with("my_name", "Kid");
        let item = sample().with("id", 3);
        let entity = sample()
            .with("id", 1)
            .with("child", Value::object(child))
            .with("list", Value::List(vec![Value::object(item)]));

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({
                "id": 1,
                "child": {"id": 2, "name": "Kid"},
                "list": [{"id": 3}]
            })
        );
    }

    #[test]
    fn test_nested_empty_entity_is_omitted() {
        let entity = sample().with("id", 1).with("child", Value::object(sample()));
        assert_eq!(Json::Object(to_json(&entity).unwrap()), json!({"id": 1}));
    }

    #[test]
    fn test_list_drops_null_elements() {
        let entity = sample().with(
            "ids",
            Value::List(vec![Value::from(1), Value::Null, Value::from(3)]),
        );

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({"ids": [1, 3]})
        );
    }

    #[test]
    fn test_list_of_nulls_is_omitted() {
        let entity = sample().with("ids", Value::List(vec![Value::Null, Value::Null]));
        assert!(to_json(&entity).unwrap().is_empty());
    }

    #[test]
    fn test_map_values_keep_keys_and_drop_nulls() {
        let map: IndexMap<String, Value> = [
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::Null),
            ("c".to_string(), Value::List(vec![Value::from("x")])),
        ]
        .into_iter()
        .collect();
        let entity = sample().with("ids", Value::Map(map));

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({"ids": {"a": 1, "c": ["x"]}})
        );
    }

    #[test]
    fn test_json_serializable_values() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let token = Uuid::nil();
        let entity = sample()
            .with("id", token)
            .with("entityTitle", created);

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "entity_title": "2024-01-02T03:04:05+00:00"
            })
        );
    }

    #[test]
    fn test_plain_model_is_converted_without_remapping() {
        let contact = Contact {
            name: Value::from("Ann"),
            email: Value::Null,
            home_phone: Value::from("555"),
        };
        let entity = sample().with("child", Value::object(contact));

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({"child": {"name": "Ann", "home_phone": "555"}})
        );
    }

    #[test]
    fn test_plain_object_is_unserializable() {
        let entity = sample().with(
            "ids",
            Value::List(vec![Value::object(Point::default())]),
        );

        match to_json(&entity) {
            Err(EntityError::Unserializable { attribute, class }) => {
                assert_eq!(attribute, "ids");
                assert_eq!(class, "Point");
            }
            other => panic!("expected unserializable error, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_converters_and_exclusion() {
        let class = ClassDef::builder("ForwardTests.Converters")
            .attributes(["title", "status", "secret", "tags"])
            .exclude("secret")
            .to_json(
                "title",
                ToJson::function(|value, _, _| {
                    Ok(json!(value.as_str().unwrap_or_default().to_uppercase()))
                }),
            )
            .to_json("status", ToJson::literal("fixed"))
            .to_json("tags", ToJson::literal(json!([])))
            .build();

        let entity = Record::new(class)
            .with("title", "hello")
            .with("secret", "hunter2")
            .with("tags", Value::List(vec![Value::from("x")]));

        assert_eq!(
            Json::Object(to_json(&entity).unwrap()),
            json!({"title": "HELLO", "status": "fixed"})
        );
    }

    #[test]
    fn test_converter_receives_attribute_and_entity() {
        let class = ClassDef::builder("ForwardTests.ConverterArgs")
            .attributes(["label"])
            .to_json(
                "label",
                ToJson::function(|_, attribute, entity| {
                    Ok(json!(format!("{}.{}", entity.class_name(), attribute)))
                }),
            )
            .build();

        let json = to_json(&Record::new(class)).unwrap();
        assert_eq!(json["label"], json!("ForwardTests.ConverterArgs.label"));
    }

    #[test]
    fn test_converter_error_names_attribute() {
        let class = ClassDef::builder("ForwardTests.Failing")
            .attributes(["total"])
            .to_json(
                "total",
                ToJson::function(|_, _, _| Err(anyhow::anyhow!("overflow"))),
            )
            .build();

        let err = to_json(&Record::new(class)).unwrap_err();
        assert!(matches!(&err, EntityError::Converter { attribute, .. } if attribute == "total"));
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_empty_field_override_excludes() {
        let class = ClassDef::builder("ForwardTests.EmptyField")
            .attributes(["name", "nickName"])
            .field("nickName", "")
            .build();

        let entity = Record::new(class)
            .with("name", "Ann")
            .with("nickName", "A");

        assert_eq!(Json::Object(to_json(&entity).unwrap()), json!({"name": "Ann"}));
    }

    #[test]
    fn test_to_json_string() {
        let entity = sample().with("id", 1).with("my_name", "Ann");
        assert_eq!(to_json_string(&entity).unwrap(), r#"{"id":1,"name":"Ann"}"#);
    }
}
