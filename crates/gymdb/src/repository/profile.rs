//! Profile reads.

use std::sync::Arc;

use gymdb_core::codec;
use gymdb_core::keys;
use gymdb_core::models::{UserMetadata, WorkoutSummary};
use gymdb_core::storage::{Consistency, RangeQuery, Store};
use gymdb_core::{DataError, Result};

use super::error::store_failure;

fn user_not_found(username: &str) -> DataError {
    DataError::NotFound {
        entity_type: "User",
        id: username.to_string(),
    }
}

/// Reads a user's metadata, alone or together with their workouts.
pub struct ProfileReader<S: Store> {
    store: Arc<S>,
    consistency: Consistency,
}

impl<S: Store> Clone for ProfileReader<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            consistency: self.consistency,
        }
    }
}

impl<S: Store> ProfileReader<S> {
    /// Eventually consistent reads.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            consistency: Consistency::default(),
        }
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// The user's metadata row.
    #[tracing::instrument(skip(self))]
    pub async fn get_metadata(&self, username: &str) -> Result<UserMetadata> {
        let item = self
            .store
            .get_item(&codec::metadata_key(username), self.consistency)
            .await
            .map_err(|err| store_failure("get_metadata", err))?
            .ok_or_else(|| user_not_found(username))?;

        codec::item_to_user_metadata(&item)
    }

    /// Metadata and workouts from a single range scan of the user's partition.
    ///
    /// The scan spans `[#METADATA, WORKOUT#<username>$]`, which also admits
    /// rows of any category whose prefix sorts between `#` and `W`. Only the
    /// metadata row and `WORKOUT#<username>#` rows are decoded; anything else
    /// in range is skipped.
    #[tracing::instrument(skip(self))]
    pub async fn get_profile_and_workouts(
        &self,
        username: &str,
    ) -> Result<(UserMetadata, Vec<WorkoutSummary>)> {
        let query = RangeQuery::between(
            keys::user_pk(username),
            keys::profile_scan_start(),
            keys::profile_scan_end(username),
        )
        .with_consistency(self.consistency);

        let items = self
            .store
            .query(&query)
            .await
            .map_err(|err| store_failure("get_profile_and_workouts", err))?;

        let mut rows = items.iter();
        let metadata = match rows.next() {
            Some(item) if codec::is_metadata(item) => codec::item_to_user_metadata(item)?,
            _ => return Err(user_not_found(username)),
        };

        let mut workouts = Vec::with_capacity(items.len() - 1);
        for item in rows {
            if codec::is_workout_of(item, username) {
                workouts.push(codec::item_to_workout(item, username)?);
            } else {
                tracing::warn!(sk = %item.key.sk, "Skipping non-workout row inside profile scan");
            }
        }

        Ok((metadata, workouts))
    }
}
