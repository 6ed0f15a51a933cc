//! Workout persistence.

use std::sync::Arc;

use gymdb_core::codec;
use gymdb_core::keys;
use gymdb_core::models::{WorkoutPayload, WorkoutSummary};
use gymdb_core::plan::{EditPlan, RenameMode};
use gymdb_core::storage::{
    BatchWrite, Condition, Consistency, RangeQuery, Store, StoreError, TransactWrite,
};
use gymdb_core::{DataError, Result};

use super::error::store_failure;

const ENTITY: &str = "Workout";

fn not_found(name: &str) -> DataError {
    DataError::NotFound {
        entity_type: ENTITY,
        id: name.to_string(),
    }
}

fn already_exists(name: &str) -> DataError {
    DataError::AlreadyExists {
        entity_type: ENTITY,
        id: name.to_string(),
    }
}

/// Creates, edits, deletes and lists a user's workouts.
///
/// A workout's name is part of its sort key. Renaming therefore replaces
/// the row, using the strategy chosen by [`RenameMode`].
pub struct WorkoutRepository<S: Store> {
    store: Arc<S>,
    rename_mode: RenameMode,
    consistency: Consistency,
}

impl<S: Store> Clone for WorkoutRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            rename_mode: self.rename_mode,
            consistency: self.consistency,
        }
    }
}

impl<S: Store> WorkoutRepository<S> {
    /// Batched renames and eventually consistent listing.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            rename_mode: RenameMode::default(),
            consistency: Consistency::default(),
        }
    }

    pub fn with_rename_mode(mut self, rename_mode: RenameMode) -> Self {
        self.rename_mode = rename_mode;
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Stores a new workout. Fails with `AlreadyExists` if the name is taken.
    #[tracing::instrument(skip(self, payload))]
    pub async fn create(&self, username: &str, name: &str, payload: &WorkoutPayload) -> Result<()> {
        let item = codec::workout_to_item(username, name, payload)?;

        match self.store.put_item(item, Condition::NotExists).await {
            Ok(()) => {
                tracing::debug!("Created workout");
                Ok(())
            }
            Err(err) if err.is_condition_failure() => Err(already_exists(name)),
            Err(err) => Err(store_failure("create_workout", err)),
        }
    }

    /// Replaces a workout's contents, renaming it when `new_name` differs.
    ///
    /// An unchanged name is a conditional in-place update and fails with
    /// `NotFound` if the workout is gone.
    ///
    /// In [`RenameMode::Batched`] a rename deletes the old row and puts the
    /// new one in one batch. Neither write guards the other: an existing
    /// workout named `new_name` is silently overwritten, a missing source is
    /// not reported, and an interrupted batch may apply only one of the two.
    /// [`RenameMode::Transactional`] makes the rename atomic and reports a
    /// missing source as `NotFound` and a taken destination as `AlreadyExists`.
    #[tracing::instrument(skip(self, payload))]
    pub async fn edit(
        &self,
        username: &str,
        old_name: &str,
        new_name: &str,
        payload: &WorkoutPayload,
    ) -> Result<()> {
        let plan = EditPlan::new(username, old_name, new_name, payload, self.rename_mode)?;

        match plan {
            EditPlan::InPlaceUpdate { key, update } => {
                match self.store.update_item(&key, update, Condition::Exists).await {
                    Ok(()) => Ok(()),
                    Err(err) if err.is_condition_failure() => Err(not_found(old_name)),
                    Err(err) => Err(store_failure("update_workout", err)),
                }
            }
            EditPlan::DeleteThenPut { old_key, item } => {
                tracing::debug!(from = %old_key, to = %item.key, "Renaming workout (batched)");
                self.store
                    .batch_write(vec![BatchWrite::Delete(old_key), BatchWrite::Put(item)])
                    .await
                    .map_err(|err| store_failure("rename_workout", err))
            }
            EditPlan::TransactionalRename { old_key, item } => {
                tracing::debug!(from = %old_key, to = %item.key, "Renaming workout (transactional)");
                let writes = vec![
                    TransactWrite::Delete {
                        key: old_key,
                        condition: Condition::Exists,
                    },
                    TransactWrite::Put {
                        item,
                        condition: Condition::NotExists,
                    },
                ];
                match self.store.transact_write(writes).await {
                    Ok(()) => Ok(()),
                    Err(err) => Err(rename_failure(err, old_name, new_name)),
                }
            }
        }
    }

    /// Removes a workout. Deleting a missing workout succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, username: &str, name: &str) -> Result<()> {
        self.store
            .delete_item(&codec::workout_key(username, name), Condition::None)
            .await
            .map_err(|err| store_failure("delete_workout", err))
    }

    /// All of the user's workouts, ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, username: &str) -> Result<Vec<WorkoutSummary>> {
        let query = RangeQuery::begins_with(keys::user_pk(username), keys::workout_sk_prefix(username))
            .with_consistency(self.consistency);

        let items = self
            .store
            .query(&query)
            .await
            .map_err(|err| store_failure("list_workouts", err))?;

        items
            .iter()
            .map(|item| codec::item_to_workout(item, username))
            .collect()
    }
}

/// Translates a canceled transactional rename: the delete is write 0, the put write 1.
fn rename_failure(err: StoreError, old_name: &str, new_name: &str) -> DataError {
    if !err.is_condition_failure() {
        return store_failure("rename_workout", err);
    }
    if err.condition_failed_at(0) {
        not_found(old_name)
    } else {
        already_exists(new_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use gymdb_core::models::{
        Exercise, ExercisePart, RepUnit, Reps, Weight, WeightUnit,
    };

    fn squat_payload(description: &str) -> WorkoutPayload {
        WorkoutPayload::new(
            description,
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
            1_700_000_000,
        )
    }

    fn setup() -> (Arc<MemoryStore>, WorkoutRepository<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), WorkoutRepository::new(store))
    }

    fn names(workouts: &[WorkoutSummary]) -> Vec<&str> {
        workouts.iter().map(|w| w.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip() {
        let (_store, repo) = setup();
        let payload = squat_payload("");

        repo.create("alice", "leg day", &payload).await.unwrap();
        let workouts = repo.list("alice").await.unwrap();

        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0], payload.into_summary("leg day"));
    }

    #[tokio::test]
    async fn test_create_collision_is_already_exists() {
        let (_store, repo) = setup();
        repo.create("alice", "leg day", &squat_payload("first"))
            .await
            .unwrap();

        let result = repo.create("alice", "leg day", &squat_payload("second")).await;

        assert_eq!(
            result,
            Err(DataError::AlreadyExists {
                entity_type: "Workout",
                id: "leg day".to_string()
            })
        );
        assert_eq!(repo.list("alice").await.unwrap()[0].description, "first");
    }

    #[tokio::test]
    async fn test_same_name_in_other_accounts_is_independent() {
        let (_store, repo) = setup();
        repo.create("alice", "leg day", &squat_payload("a"))
            .await
            .unwrap();
        repo.create("bob", "leg day", &squat_payload("b"))
            .await
            .unwrap();

        assert_eq!(repo.list("alice").await.unwrap()[0].description, "a");
        assert_eq!(repo.list("bob").await.unwrap()[0].description, "b");
    }

    #[tokio::test]
    async fn test_edit_in_place() {
        let (_store, repo) = setup();
        repo.create("alice", "leg day", &squat_payload("old"))
            .await
            .unwrap();

        repo.edit("alice", "leg day", "leg day", &squat_payload("new"))
            .await
            .unwrap();

        let workouts = repo.list("alice").await.unwrap();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].description, "new");
    }

    #[tokio::test]
    async fn test_edit_in_place_missing_is_not_found() {
        let (store, repo) = setup();

        let result = repo
            .edit("alice", "ghost", "ghost", &squat_payload(""))
            .await;

        assert_eq!(
            result,
            Err(DataError::NotFound {
                entity_type: "Workout",
                id: "ghost".to_string()
            })
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_rename_changes_identity() {
        let (_store, repo) = setup();
        repo.create("alice", "leg day", &squat_payload(""))
            .await
            .unwrap();

        repo.edit("alice", "leg day", "leg day v2", &squat_payload("renamed"))
            .await
            .unwrap();

        let workouts = repo.list("alice").await.unwrap();
        assert_eq!(names(&workouts), vec!["leg day v2"]);
        assert_eq!(workouts[0].description, "renamed");
    }

    #[tokio::test]
    async fn test_batched_rename_overwrites_existing_destination() {
        let (_store, repo) = setup();
        repo.create("alice", "a", &squat_payload("original a"))
            .await
            .unwrap();
        repo.create("alice", "b", &squat_payload("original b"))
            .await
            .unwrap();

        repo.edit("alice", "a", "b", &squat_payload("new payload"))
            .await
            .unwrap();

        let workouts = repo.list("alice").await.unwrap();
        assert_eq!(names(&workouts), vec!["b"]);
        assert_eq!(workouts[0].description, "new payload");
    }

    #[tokio::test]
    async fn test_batched_rename_of_missing_source_creates_destination() {
        let (_store, repo) = setup();

        repo.edit("alice", "ghost", "real", &squat_payload(""))
            .await
            .unwrap();

        assert_eq!(names(&repo.list("alice").await.unwrap()), vec!["real"]);
    }

    #[tokio::test]
    async fn test_transactional_rename_rejects_taken_destination() {
        let (_store, repo) = setup();
        let repo = repo.with_rename_mode(RenameMode::Transactional);
        repo.create("alice", "a", &squat_payload("original a"))
            .await
            .unwrap();
        repo.create("alice", "b", &squat_payload("original b"))
            .await
            .unwrap();

        let result = repo.edit("alice", "a", "b", &squat_payload("new")).await;

        assert_eq!(
            result,
            Err(DataError::AlreadyExists {
                entity_type: "Workout",
                id: "b".to_string()
            })
        );
        let workouts = repo.list("alice").await.unwrap();
        assert_eq!(names(&workouts), vec!["a", "b"]);
        assert_eq!(workouts[1].description, "original b");
    }

    #[tokio::test]
    async fn test_transactional_rename_missing_source() {
        let (store, repo) = setup();
        let repo = repo.with_rename_mode(RenameMode::Transactional);

        let result = repo.edit("alice", "ghost", "real", &squat_payload("")).await;

        assert!(matches!(result, Err(DataError::NotFound { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_transactional_rename_taken_destination_beside_conflict() {
        let (store, repo) = setup();
        let repo = repo.with_rename_mode(RenameMode::Transactional);
        store.fail_next(gymdb_core::storage::StoreError::TransactionCanceled {
            reasons: vec![
                gymdb_core::storage::CancellationReason::Other("TransactionConflict".to_string()),
                gymdb_core::storage::CancellationReason::ConditionalCheckFailed,
            ],
        });

        let result = repo.edit("alice", "a", "b", &squat_payload("")).await;

        assert_eq!(
            result,
            Err(DataError::AlreadyExists {
                entity_type: "Workout",
                id: "b".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_transactional_rename_moves_row() {
        let (_store, repo) = setup();
        let repo = repo.with_rename_mode(RenameMode::Transactional);
        repo.create("alice", "leg day", &squat_payload(""))
            .await
            .unwrap();

        repo.edit("alice", "leg day", "leg day v2", &squat_payload(""))
            .await
            .unwrap();

        assert_eq!(names(&repo.list("alice").await.unwrap()), vec!["leg day v2"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_store, repo) = setup();

        assert!(repo.delete("alice", "nonexistent").await.is_ok());

        repo.create("alice", "leg day", &squat_payload(""))
            .await
            .unwrap();
        repo.delete("alice", "leg day").await.unwrap();
        repo.delete("alice", "leg day").await.unwrap();
        assert!(repo.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_name_with_embedded_delimiter_round_trips() {
        let (_store, repo) = setup();

        repo.create("alice", "a#b", &squat_payload("")).await.unwrap();
        repo.create("alice", "#", &squat_payload("")).await.unwrap();

        let workouts = repo.list("alice").await.unwrap();
        assert_eq!(names(&workouts), vec!["#", "a#b"]);
    }

    #[tokio::test]
    async fn test_list_ignores_metadata_and_other_users() {
        let (store, repo) = setup();
        store
            .put_item(
                gymdb_core::storage::Item::new(codec::metadata_key("alice")),
                Condition::None,
            )
            .await
            .unwrap();
        repo.create("alice", "mine", &squat_payload("")).await.unwrap();
        repo.create("alice2", "theirs", &squat_payload(""))
            .await
            .unwrap();

        assert_eq!(names(&repo.list("alice").await.unwrap()), vec!["mine"]);
    }

    #[tokio::test]
    async fn test_store_faults_are_transient() {
        let (store, repo) = setup();

        store.fail_next(StoreError::Unavailable("down".to_string()));
        let result = repo.create("alice", "leg day", &squat_payload("")).await;
        assert!(matches!(result, Err(DataError::Transient(_))));

        store.fail_next(StoreError::Unprocessed(1));
        let result = repo.edit("alice", "a", "b", &squat_payload("")).await;
        assert!(matches!(result, Err(DataError::Transient(_))));

        store.fail_next(StoreError::Throttled("slow".to_string()));
        assert!(matches!(
            repo.list("alice").await,
            Err(DataError::Transient(_))
        ));

        store.fail_next(StoreError::Throttled("slow".to_string()));
        assert!(matches!(
            repo.delete("alice", "a").await,
            Err(DataError::Transient(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reads_fractional_timed_reps() {
        let (store, repo) = setup();
        repo.create("alice", "legs", &squat_payload("")).await.unwrap();
        store
            .put_item(
                gymdb_core::storage::Item::new(codec::workout_key("alice", "plank")).with_attribute(
                    codec::WORKOUT_ATTRIBUTE,
                    serde_json::json!({
                        "description": "",
                        "exercises": [{
                            "id": "PLANK",
                            "parts": [{
                                "sets": 3,
                                "reps": {"unit": "mins", "value": 1.5},
                                "weight": {"unit": "lb", "value": 0}
                            }]
                        }],
                        "iat": 1_700_000_000
                    }),
                ),
                Condition::None,
            )
            .await
            .unwrap();

        let list = repo.list("alice").await.unwrap();

        let names: Vec<_> = list.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["legs", "plank"]);
        let plank = &list[1].exercises[0].parts[0];
        assert_eq!(plank.reps.unit, RepUnit::Mins);
        assert_eq!(plank.reps.value, 1.5);
    }

    #[tokio::test]
    async fn test_undecodable_row_is_malformed_item() {
        let (store, repo) = setup();
        store
            .put_item(
                gymdb_core::storage::Item::new(codec::workout_key("alice", "broken")),
                Condition::None,
            )
            .await
            .unwrap();

        assert!(matches!(
            repo.list("alice").await,
            Err(DataError::MalformedItem(_))
        ));
    }
}
