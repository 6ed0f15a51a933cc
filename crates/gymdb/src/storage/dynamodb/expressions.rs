//! DynamoDB expression builders (Functional Core - pure data).

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use gymdb_core::storage::{Condition, SortKeyCondition, Update};
use serde_json::Value;

use super::conversions::value_to_attribute;

/// Condition expression enforcing a `Condition`, if any.
pub fn condition_expression(condition: Condition) -> Option<&'static str> {
    match condition {
        Condition::None => None,
        Condition::NotExists => Some("attribute_not_exists(PK)"),
        Condition::Exists => Some("attribute_exists(PK)"),
    }
}

/// A key condition with its placeholder values.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConditionExpression {
    pub expression: &'static str,
    pub values: HashMap<String, AttributeValue>,
}

/// Key condition for a single-partition range query.
pub fn key_condition_expression(pk: &str, sk: &SortKeyCondition) -> KeyConditionExpression {
    let mut values = HashMap::from([(":pk".to_string(), AttributeValue::S(pk.to_string()))]);

    let expression = match sk {
        SortKeyCondition::Between { start, end } => {
            values.insert(":start".to_string(), AttributeValue::S(start.clone()));
            values.insert(":end".to_string(), AttributeValue::S(end.clone()));
            "PK = :pk AND SK BETWEEN :start AND :end"
        }
        SortKeyCondition::BeginsWith(prefix) => {
            values.insert(":prefix".to_string(), AttributeValue::S(prefix.clone()));
            "PK = :pk AND begins_with(SK, :prefix)"
        }
    };

    KeyConditionExpression { expression, values }
}

/// An update expression with its placeholder names and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    /// Placeholder path for a (possibly nested) attribute, e.g. `#n0.#n1`.
    /// Every segment goes through a name placeholder since `user` is reserved.
    fn path(&mut self, segments: &[String]) -> String {
        segments
            .iter()
            .map(|segment| {
                let existing = self
                    .names
                    .iter()
                    .find(|(_, name)| *name == segment)
                    .map(|(placeholder, _)| placeholder.clone());
                existing.unwrap_or_else(|| {
                    let placeholder = format!("#n{}", self.names.len());
                    self.names.insert(placeholder.clone(), segment.clone());
                    placeholder
                })
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn value(&mut self, value: AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value);
        placeholder
    }
}

/// Build the `SET` expression applying an `Update`.
pub fn update_expression(update: &Update) -> UpdateExpression {
    let mut built = UpdateExpression::default();
    let mut clauses = Vec::with_capacity(update.set.len() + update.append.len());

    for (path, value) in &update.set {
        let path = built.path(path);
        let value = built.value(value_to_attribute(value));
        clauses.push(format!("{path} = {value}"));
    }

    for (path, values) in &update.append {
        let path = built.path(path);
        let value = built.value(value_to_attribute(&Value::Array(values.clone())));
        clauses.push(format!("{path} = list_append({path}, {value})"));
    }

    built.expression = format!("SET {}", clauses.join(", "));
    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_expressions() {
        assert_eq!(condition_expression(Condition::None), None);
        assert_eq!(
            condition_expression(Condition::NotExists),
            Some("attribute_not_exists(PK)")
        );
        assert_eq!(
            condition_expression(Condition::Exists),
            Some("attribute_exists(PK)")
        );
    }

    #[test]
    fn test_between_key_condition() {
        let built = key_condition_expression(
            "USER#alice",
            &SortKeyCondition::Between {
                start: "#METADATA".to_string(),
                end: "WORKOUT#alice$".to_string(),
            },
        );

        assert_eq!(built.expression, "PK = :pk AND SK BETWEEN :start AND :end");
        assert_eq!(built.values[":pk"].as_s().unwrap(), "USER#alice");
        assert_eq!(built.values[":start"].as_s().unwrap(), "#METADATA");
        assert_eq!(built.values[":end"].as_s().unwrap(), "WORKOUT#alice$");
    }

    #[test]
    fn test_begins_with_key_condition() {
        let built = key_condition_expression(
            "USER#alice",
            &SortKeyCondition::BeginsWith("WORKOUT#alice#".to_string()),
        );

        assert_eq!(built.expression, "PK = :pk AND begins_with(SK, :prefix)");
        assert_eq!(built.values[":prefix"].as_s().unwrap(), "WORKOUT#alice#");
    }

    #[test]
    fn test_set_expression() {
        let built = update_expression(&Update::new().set(["workout"], json!({"iat": 1})));

        assert_eq!(built.expression, "SET #n0 = :v0");
        assert_eq!(built.names["#n0"], "workout");
        assert!(built.values[":v0"].as_m().is_ok());
    }

    #[test]
    fn test_append_expression_reuses_name_placeholders() {
        let built = update_expression(
            &Update::new().append(["user", "ips"], vec![json!({"iat": 2, "ip": "::1"})]),
        );

        assert_eq!(
            built.expression,
            "SET #n0.#n1 = list_append(#n0.#n1, :v0)"
        );
        assert_eq!(built.names["#n0"], "user");
        assert_eq!(built.names["#n1"], "ips");
        assert_eq!(built.values[":v0"].as_l().unwrap().len(), 1);
    }

    #[test]
    fn test_set_and_append_together() {
        let built = update_expression(
            &Update::new()
                .set(["user", "bio"], json!("lifter"))
                .append(["user", "ips"], vec![json!({"iat": 2, "ip": "::1"})]),
        );

        assert_eq!(
            built.expression,
            "SET #n0.#n1 = :v0, #n0.#n2 = list_append(#n0.#n2, :v1)"
        );
        assert_eq!(built.names.len(), 3);
    }
}
