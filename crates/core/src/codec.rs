//! Item conversion functions.
//!
//! Pure functions for converting between store items and domain types.
//! These are testable in isolation without store access.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DataError, Result};
use crate::keys;
use crate::models::{LoginRecord, UserMetadata, WorkoutPayload, WorkoutSummary};
use crate::storage::{Item, ItemKey};

// ============================================================================
// Attribute names
// ============================================================================

/// Map attribute holding a user's metadata.
pub const USER_ATTRIBUTE: &str = "user";
/// List attribute inside [`USER_ATTRIBUTE`] holding the login history.
pub const LOGIN_HISTORY_ATTRIBUTE: &str = "ips";
/// String attribute of an email claim naming the owning user.
pub const OWNER_ATTRIBUTE: &str = "username";
/// Map attribute holding a workout's description, exercises and timestamp.
pub const WORKOUT_ATTRIBUTE: &str = "workout";

// ============================================================================
// Keys
// ============================================================================

/// Address of a user's metadata row.
pub fn metadata_key(username: &str) -> ItemKey {
    ItemKey::new(keys::user_pk(username), keys::metadata_sk())
}

/// Address of an email reservation row.
pub fn email_reservation_key(email: &str, username: &str) -> ItemKey {
    ItemKey::new(keys::email_pk(email), keys::email_reservation_sk(username))
}

/// Address of the row that makes an email unique.
pub fn email_claim_key(email: &str) -> ItemKey {
    ItemKey::new(keys::email_pk(email), keys::email_claim_sk())
}

/// Address of a workout row.
pub fn workout_key(username: &str, name: &str) -> ItemKey {
    ItemKey::new(keys::user_pk(username), keys::workout_sk(username, name))
}

// ============================================================================
// User conversions
// ============================================================================

/// Convert a UserMetadata to its metadata row.
pub fn user_metadata_to_item(metadata: &UserMetadata) -> Result<Item> {
    Ok(Item::new(metadata_key(&metadata.username))
        .with_attribute(USER_ATTRIBUTE, to_value(metadata)?))
}

/// The email reservation row. Its existence is the whole payload.
pub fn email_reservation_item(email: &str, username: &str) -> Item {
    Item::new(email_reservation_key(email, username))
}

/// The email claim row, naming the user that holds the email.
pub fn email_claim_item(email: &str, username: &str) -> Item {
    Item::new(email_claim_key(email)).with_attribute(OWNER_ATTRIBUTE, Value::from(username))
}

/// Convert a metadata row to UserMetadata. The username comes from the partition key.
pub fn item_to_user_metadata(item: &Item) -> Result<UserMetadata> {
    if !is_metadata(item) {
        return Err(DataError::MalformedKey {
            key: item.key.sk.clone(),
            reason: format!("expected `{}`", keys::metadata_sk()),
        });
    }

    let username = keys::username_from_pk(&item.key.pk)?;
    let mut metadata: UserMetadata = get_attribute(item, USER_ATTRIBUTE)?;
    metadata.username = username.to_string();

    Ok(metadata)
}

/// A login history entry as stored in the `ips` list.
pub fn login_record_value(record: &LoginRecord) -> Result<Value> {
    to_value(record)
}

// ============================================================================
// Workout conversions
// ============================================================================

/// Convert a workout to its row.
pub fn workout_to_item(username: &str, name: &str, payload: &WorkoutPayload) -> Result<Item> {
    Ok(Item::new(workout_key(username, name))
        .with_attribute(WORKOUT_ATTRIBUTE, workout_value(payload)?))
}

/// The `workout` attribute value of a row.
pub fn workout_value(payload: &WorkoutPayload) -> Result<Value> {
    to_value(payload)
}

/// Convert a workout row to a WorkoutSummary, decoding the name from the sort key.
pub fn item_to_workout(item: &Item, username: &str) -> Result<WorkoutSummary> {
    let name = keys::workout_name_from_sk(&item.key.sk, username)?;
    let payload: WorkoutPayload = get_attribute(item, WORKOUT_ATTRIBUTE)?;

    Ok(payload.into_summary(name))
}

// ============================================================================
// Row classification
// ============================================================================

/// Whether the row is a metadata row.
pub fn is_metadata(item: &Item) -> bool {
    item.key.sk == keys::metadata_sk()
}

/// Whether the row is one of `username`'s workouts.
pub fn is_workout_of(item: &Item, username: &str) -> bool {
    item.key.sk.starts_with(&keys::workout_sk_prefix(username))
}

// ============================================================================
// Helper functions
// ============================================================================

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| DataError::MalformedItem(e.to_string()))
}

/// Get and decode a required attribute.
fn get_attribute<T: DeserializeOwned>(item: &Item, name: &str) -> Result<T> {
    let value = item.attributes.get(name).ok_or_else(|| {
        DataError::MalformedItem(format!("{}: missing attribute `{}`", item.key, name))
    })?;

    serde_json::from_value(value.clone())
        .map_err(|e| DataError::MalformedItem(format!("{}: invalid `{}`: {}", item.key, name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Exercise, ExercisePart, Location, NewUser, RepUnit, Reps, Weight, WeightUnit,
    };
    use serde_json::json;

    fn sample_metadata() -> UserMetadata {
        NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            location: Location::new("Palo Alto", "CA", "USA"),
            hash: "86dfa4dd".to_string(),
            salt: "1a2b3c4d".to_string(),
            source_ip: "192.168.1.1".to_string(),
            iat: 12345678,
        }
        .to_metadata()
    }

    fn sample_payload() -> WorkoutPayload {
        WorkoutPayload::new(
            "heavy",
            vec![Exercise::new(
                "SQUAT",
                vec![ExercisePart::new(
                    3.0,
                    Reps {
                        unit: RepUnit::Reps,
                        value: 10.0,
                    },
                    Weight {
                        unit: WeightUnit::Kg,
                        value: 60.0,
                    },
                )],
            )],
            123456789,
        )
    }

    #[test]
    fn test_metadata_item_layout() {
        let item = user_metadata_to_item(&sample_metadata()).unwrap();

        assert_eq!(item.key, ItemKey::new("USER#alice", "#METADATA"));
        assert_eq!(item.attributes.len(), 1);

        let user = &item.attributes["user"];
        assert_eq!(user["email"], "alice@example.com");
        assert_eq!(user["profile_picture"], "");
        assert_eq!(user["bio"], "");
        assert_eq!(
            user["location"],
            json!({"city": "Palo Alto", "state": "CA", "country": "USA"})
        );
        assert_eq!(user["ips"], json!([{"iat": 12345678, "ip": "192.168.1.1"}]));
    }

    #[test]
    fn test_metadata_round_trip_takes_username_from_pk() {
        let metadata = sample_metadata();
        let item = user_metadata_to_item(&metadata).unwrap();

        assert_eq!(item_to_user_metadata(&item).unwrap(), metadata);
    }

    #[test]
    fn test_email_reservation_has_no_attributes() {
        let item = email_reservation_item("alice@example.com", "alice");

        assert_eq!(
            item.key,
            ItemKey::new("USER#alice@example.com", "#USER#alice")
        );
        assert!(item.attributes.is_empty());
    }

    #[test]
    fn test_email_claim_is_independent_of_username() {
        let alice = email_claim_item("shared@example.com", "alice");
        let bob = email_claim_item("shared@example.com", "bob");

        assert_eq!(alice.key, bob.key);
        assert_eq!(alice.key, ItemKey::new("USER#shared@example.com", "#EMAIL"));
        assert_eq!(alice.attributes["username"], "alice");
    }

    #[test]
    fn test_workout_item_layout() {
        let item = workout_to_item("alice", "leg day", &sample_payload()).unwrap();

        assert_eq!(item.key, ItemKey::new("USER#alice", "WORKOUT#alice#leg day"));
        assert_eq!(item.attributes.len(), 1);
        assert_eq!(item.attributes["workout"]["description"], "heavy");
        assert_eq!(item.attributes["workout"]["iat"], 123456789);
    }

    #[test]
    fn test_workout_decodes_name_from_sort_key() {
        let item = workout_to_item("alice", "a#b", &sample_payload()).unwrap();
        let workout = item_to_workout(&item, "alice").unwrap();

        assert_eq!(workout.name, "a#b");
        assert_eq!(workout.exercises, sample_payload().exercises);
    }

    #[test]
    fn test_missing_attribute_is_malformed_item() {
        let item = Item::new(metadata_key("alice"));
        assert!(matches!(
            item_to_user_metadata(&item),
            Err(DataError::MalformedItem(_))
        ));

        let item = Item::new(workout_key("alice", "a")).with_attribute("workout", json!(42));
        assert!(matches!(
            item_to_workout(&item, "alice"),
            Err(DataError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_classification() {
        let metadata = user_metadata_to_item(&sample_metadata()).unwrap();
        let workout = workout_to_item("alice", "a", &sample_payload()).unwrap();
        let meal = Item::new(ItemKey::new("USER#alice", "MEAL#alice#lunch"));

        assert!(is_metadata(&metadata));
        assert!(!is_metadata(&workout));
        assert!(is_workout_of(&workout, "alice"));
        assert!(!is_workout_of(&workout, "bob"));
        assert!(!is_workout_of(&meal, "alice"));
    }

    #[test]
    fn test_non_metadata_row_is_malformed_key() {
        let item = Item::new(workout_key("alice", "a"));
        assert!(matches!(
            item_to_user_metadata(&item),
            Err(DataError::MalformedKey { .. })
        ));
    }
}
