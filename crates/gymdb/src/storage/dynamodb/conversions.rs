//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and store items.
//! Nested JSON maps and lists become native `M` and `L` attributes so rows stay
//! readable by any DynamoDB document client.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use gymdb_core::storage::{Item, ItemKey, StoreError};
use serde_json::{Map, Number, Value};

/// Partition key attribute name.
pub const PK: &str = "PK";
/// Sort key attribute name.
pub const SK: &str = "SK";

// ============================================================================
// Item conversions
// ============================================================================

/// Convert an Item to a DynamoDB item.
pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    let mut attributes = key_to_attributes(&item.key);

    for (name, value) in &item.attributes {
        attributes.insert(name.clone(), value_to_attribute(value));
    }

    attributes
}

/// Convert a DynamoDB item to an Item.
pub fn attributes_to_item(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<Item, StoreError> {
    let key = ItemKey::new(get_string(attributes, PK)?, get_string(attributes, SK)?);
    let mut item = Item::new(key);

    for (name, value) in attributes {
        if name == PK || name == SK {
            continue;
        }
        item.attributes
            .insert(name.clone(), attribute_to_value(value)?);
    }

    Ok(item)
}

/// Convert an ItemKey to the DynamoDB key map.
pub fn key_to_attributes(key: &ItemKey) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (PK.to_string(), AttributeValue::S(key.pk.clone())),
        (SK.to_string(), AttributeValue::S(key.sk.clone())),
    ])
}

// ============================================================================
// Value conversions
// ============================================================================

/// Convert a JSON value to an AttributeValue.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Convert an AttributeValue to a JSON value.
///
/// String and number sets become arrays. Binary attributes are not part of
/// any row this crate writes and are rejected.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, StoreError> {
    match attribute {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(values) => values
            .iter()
            .map(attribute_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => map
            .iter()
            .map(|(k, v)| attribute_to_value(v).map(|v| (k.clone(), v)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        AttributeValue::Ss(values) => Ok(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(values) => values
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(StoreError::Serialization(format!(
            "Unsupported attribute type: {:?}",
            other
        ))),
    }
}

/// Parse a DynamoDB number, preferring integers.
fn parse_number(n: &str) -> Result<Number, StoreError> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Number::from(u));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| StoreError::Serialization(format!("Invalid number: {}", n)))
}

/// Get a required string attribute.
fn get_string(
    attributes: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<String, StoreError> {
    attributes
        .get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| StoreError::Serialization(format!("Missing or invalid field: {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> Item {
        Item::new(ItemKey::new("USER#alice", "WORKOUT#alice#a#b")).with_attribute(
            "workout",
            json!({
                "description": "",
                "exercises": [{
                    "id": "SQUAT",
                    "parts": [{
                        "sets": 3,
                        "reps": {"unit": "reps", "value": 10},
                        "weight": {"unit": "kg", "value": 62.5}
                    }]
                }],
                "iat": 123456789
            }),
        )
    }

    #[test]
    fn test_item_round_trip() {
        let item = sample_item();
        let attributes = item_to_attributes(&item);
        let parsed = attributes_to_item(&attributes).unwrap();

        assert_eq!(parsed, item);
    }

    #[test]
    fn test_item_has_key_attributes() {
        let attributes = item_to_attributes(&sample_item());

        assert_eq!(attributes.get("PK").unwrap().as_s().unwrap(), "USER#alice");
        assert_eq!(
            attributes.get("SK").unwrap().as_s().unwrap(),
            "WORKOUT#alice#a#b"
        );
        assert!(attributes.get("workout").unwrap().as_m().is_ok());
    }

    #[test]
    fn test_nested_values_use_native_types() {
        let attribute = value_to_attribute(&json!({"ips": [{"iat": 1, "ip": "::1"}], "ok": true}));
        let map = attribute.as_m().unwrap();

        let ips = map.get("ips").unwrap().as_l().unwrap();
        let first = ips[0].as_m().unwrap();
        assert_eq!(first.get("iat").unwrap().as_n().unwrap(), "1");
        assert_eq!(first.get("ip").unwrap().as_s().unwrap(), "::1");
        assert_eq!(*map.get("ok").unwrap().as_bool().unwrap(), true);
    }

    #[test]
    fn test_numbers_prefer_integers() {
        assert_eq!(
            attribute_to_value(&AttributeValue::N("10".to_string())).unwrap(),
            json!(10)
        );
        assert_eq!(
            attribute_to_value(&AttributeValue::N("-3".to_string())).unwrap(),
            json!(-3)
        );
        assert_eq!(
            attribute_to_value(&AttributeValue::N("62.5".to_string())).unwrap(),
            json!(62.5)
        );
        assert!(attribute_to_value(&AttributeValue::N("abc".to_string())).is_err());
    }

    #[test]
    fn test_sets_become_arrays() {
        assert_eq!(
            attribute_to_value(&AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]))
                .unwrap(),
            json!(["a", "b"])
        );
        assert_eq!(
            attribute_to_value(&AttributeValue::Ns(vec!["1".to_string()])).unwrap(),
            json!([1])
        );
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut attributes = item_to_attributes(&sample_item());
        attributes.remove("SK");

        assert!(matches!(
            attributes_to_item(&attributes),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_email_reservation_has_only_keys() {
        let item = Item::new(ItemKey::new("USER#alice@example.com", "#USER#alice"));
        let attributes = item_to_attributes(&item);

        assert_eq!(attributes.len(), 2);
    }
}
